//! Graceful shutdown for both servers.

use tokio::signal;
use tracing::info;

/// Completes when the process receives SIGINT or SIGTERM.
///
/// `service` names the server in the shutdown log events.
pub async fn shutdown_signal(service: &'static str) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(service, signal = "SIGINT", "shutdown_signal_received"),
        _ = terminate => info!(service, signal = "SIGTERM", "shutdown_signal_received"),
    }

    info!(service, "server_shutting_down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_pending_without_signal() {
        let result =
            tokio::time::timeout(Duration::from_millis(50), shutdown_signal("test")).await;

        assert!(result.is_err());
    }
}
