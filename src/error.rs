//! Error types for the authorization core
//!
//! Denials are never errors: `is_granted` and guard evaluation return
//! `Ok(false)` for "access denied". The variants below are reserved for
//! programmer and configuration mistakes so a host can always tell
//! "denied" apart from "misconfigured".

use thiserror::Error;

/// Result type alias for authorization operations
pub type Result<T> = std::result::Result<T, RbacError>;

/// Errors raised by the authorization core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RbacError {
    /// An assertion argument does not satisfy the assertion capability
    #[error("invalid assertion '{assertion}': {reason}")]
    InvalidAssertion { assertion: String, reason: String },

    /// The role provider failed to load its role definitions
    #[error("role provider '{provider}' failed to load roles: {message}")]
    ProviderLoad { provider: String, message: String },

    /// Role definition validation error
    #[error("invalid role '{role}': {reason}")]
    InvalidRole { role: String, reason: String },

    /// Guard pattern validation error
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Configuration could not be parsed or is inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// CEL expression failed to compile or evaluate
    #[error("expression error in '{expression}': {error}")]
    Expression { expression: String, error: String },

    /// Generic internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl RbacError {
    /// Shorthand for an [`RbacError::InvalidAssertion`]
    pub fn invalid_assertion(assertion: impl Into<String>, reason: impl Into<String>) -> Self {
        RbacError::InvalidAssertion {
            assertion: assertion.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by bad configuration rather than runtime failures
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RbacError::InvalidRole { .. }
                | RbacError::InvalidPattern { .. }
                | RbacError::InvalidConfig(_)
        )
    }
}

impl From<anyhow::Error> for RbacError {
    fn from(err: anyhow::Error) -> Self {
        RbacError::ProviderLoad {
            provider: "external".to_string(),
            message: format!("{:#}", err),
        }
    }
}

impl From<serde_json::Error> for RbacError {
    fn from(err: serde_json::Error) -> Self {
        RbacError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RbacError::invalid_assertion("owner_check", "no assertion registered under this name");
        assert!(err.to_string().contains("invalid assertion"));
        assert!(err.to_string().contains("owner_check"));
    }

    #[test]
    fn test_anyhow_maps_to_provider_load() {
        let err: RbacError = anyhow::anyhow!("connection refused").into();
        match err {
            RbacError::ProviderLoad { message, .. } => assert!(message.contains("connection refused")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_configuration_errors() {
        assert!(RbacError::InvalidConfig("bad".to_string()).is_configuration_error());
        assert!(!RbacError::invalid_assertion("a", "b").is_configuration_error());
    }

    #[test]
    fn test_error_equality() {
        let err1 = RbacError::InvalidConfig("x".to_string());
        let err2 = RbacError::InvalidConfig("x".to_string());
        assert_eq!(err1, err2);
    }
}
