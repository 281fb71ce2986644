//! Web server module for both services.
//!
//! - Uploader: receives MMS webhooks and runs the ingestion pipeline inline
//! - Updater: rebuilds the gallery site on request

pub mod handlers;
pub mod shutdown;

pub use handlers::{
    about, health, sms_webhook, twiml_reply, update_gallery, updater_router, uploader_router,
    AboutResponse, AppState, HealthResponse, UpdaterState,
};
pub use shutdown::shutdown_signal;
