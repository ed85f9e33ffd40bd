//! Storefront context token.
//!
//! The token correlates a shopper's storefront session (cart, login state)
//! across chat requests. It is a credential, so `Debug` never prints it.

use secrecy::{ExposeSecret, SecretString};

/// Opaque storefront session token.
#[derive(Clone)]
pub struct ContextToken(SecretString);

impl ContextToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Access the raw token, e.g. to place it in a request body.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for ContextToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for ContextToken {}

impl std::fmt::Debug for ContextToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContextToken").field(&"[REDACTED]").finish()
    }
}

impl From<String> for ContextToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ContextToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_value() {
        let token = ContextToken::new("sw-context-abc123");
        let debug_output = format!("{token:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("abc123"));
    }

    #[test]
    fn test_equality_compares_values() {
        assert_eq!(ContextToken::from("T1"), ContextToken::from("T1".to_string()));
        assert_ne!(ContextToken::from("T1"), ContextToken::from("T2"));
    }

    #[test]
    fn test_expose() {
        assert_eq!(ContextToken::new("T1").expose(), "T1");
    }
}
