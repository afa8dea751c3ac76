//! # Client Error Types
//!
//! Error types for everything that talks to the portal backend.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │     Session     │  │     Data shape          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Http{status}   │  │  SessionExpired │  │  InvalidResponse        │ │
//! │  │  Network        │  │  MissingToken   │  │                         │ │
//! │  │  NoEndpoints    │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Domain rules   │  │     Local       │  │     Concurrency         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  Pdf, Io        │  │  Busy                   │ │
//! │  │  Core, Wizard   │  │  Config         │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use torque_core::error::{CoreError, NormalizeError, ValidationError, WizardError};

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never got an answer (DNS, refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// A fallback chain was built without any endpoint.
    #[error("No endpoints configured for {0}")]
    NoEndpoints(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// 401/403 from the backend. The caller should send the user to `redirect`.
    #[error("Session expired. Sign in again at {redirect}")]
    SessionExpired { redirect: String },

    /// No bearer token in the URL, the environment or the token file.
    #[error("No auth token found. Pass --token, set TORQUE_TOKEN or run `torque-portal login`.")]
    MissingToken,

    // =========================================================================
    // Data Shape Errors
    // =========================================================================
    /// The response body could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    // =========================================================================
    // Local Errors
    // =========================================================================
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // =========================================================================
    // Concurrency
    // =========================================================================
    /// A second trigger of an action whose first run has not finished.
    #[error("{0} is already in progress")]
    Busy(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<NormalizeError> for ClientError {
    fn from(err: NormalizeError) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid URL: {}", err))
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if re-issuing the same request may succeed.
    ///
    /// ## Retryable Errors
    /// - Network failures
    /// - 5xx responses
    ///
    /// Session, validation and data-shape errors never fix themselves.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the user has to sign in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            ClientError::SessionExpired { .. } | ClientError::MissingToken
        )
    }

    /// Returns true if the request was rejected before reaching the network.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_)
                | ClientError::Wizard(WizardError::Validation(_))
                | ClientError::Core(CoreError::Validation(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::Network("connection refused".into()).is_retryable());
        assert!(ClientError::Http { status: 503, message: "down".into() }.is_retryable());

        assert!(!ClientError::Http { status: 404, message: "missing".into() }.is_retryable());
        assert!(!ClientError::SessionExpired { redirect: "/login".into() }.is_retryable());
        assert!(!ClientError::InvalidResponse("not json".into()).is_retryable());
    }

    #[test]
    fn test_session_and_validation_categories() {
        assert!(ClientError::MissingToken.is_session_expired());
        assert!(ClientError::from(ValidationError::required("Email")).is_validation_error());
        assert!(!ClientError::Busy("Payment".into()).is_validation_error());
    }

    #[test]
    fn test_normalize_error_is_data_shape() {
        let err = ClientError::from(NormalizeError::MissingField {
            context: "service request".into(),
            field: "requestId".into(),
        });
        assert!(matches!(err, ClientError::InvalidResponse(_)));
        assert!(err.to_string().contains("requestId"));
    }
}
