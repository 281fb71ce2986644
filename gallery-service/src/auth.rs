//! Sender allow-list.

use std::collections::HashSet;

/// Checks sender identifiers against a fixed allow-list.
///
/// Comparison is exact: no normalization, wildcards or prefixes.
#[derive(Debug, Clone, Default)]
pub struct SenderAuthorizer {
    allowed: HashSet<String>,
}

impl SenderAuthorizer {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `sender` may upload media.
    pub fn is_allowed(&self, sender: &str) -> bool {
        self.allowed.contains(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        let authorizer = SenderAuthorizer::new(["+15550001", "+15550002"]);

        assert!(authorizer.is_allowed("+15550001"));
        assert!(authorizer.is_allowed("+15550002"));
        assert!(!authorizer.is_allowed("15550001"));
        assert!(!authorizer.is_allowed("+1555000"));
        assert!(!authorizer.is_allowed("+15550001 "));
        assert!(!authorizer.is_allowed(""));
    }

    #[test]
    fn test_empty_allow_list_rejects_everyone() {
        let authorizer = SenderAuthorizer::default();

        assert!(authorizer.allowed.is_empty());
        assert!(!authorizer.is_allowed("+15550001"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let authorizer = SenderAuthorizer::new(vec!["a".to_string(), "a".to_string()]);

        assert_eq!(authorizer.allowed.len(), 1);
    }
}
