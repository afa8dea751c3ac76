//! # Portal Error Type
//!
//! Unified error type for portal commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Error Flow in the Portal                           │
//! │                                                                         │
//! │  Command Function  ── Result<T, PortalError> ──► run() ──► stderr       │
//! │         │                                            + exit code        │
//! │         ▼                                                               │
//! │  ClientError::SessionExpired ─────► SESSION_EXPIRED (login URL shown)   │
//! │  ClientError::Validation ─────────► VALIDATION_ERROR (no request sent)  │
//! │  ClientError::Http / Network ─────► NETWORK_ERROR                       │
//! │  ClientError::InvalidResponse ────► INVALID_RESPONSE                    │
//! │  CoreError::ServiceNotCompleted ──► BUSINESS_LOGIC                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use torque_api::ClientError;
use torque_core::{CoreError, ValidationError, WizardError};

/// Error printed when a command fails.
///
/// With `--json` this is what the caller receives:
/// ```json
/// {
///   "code": "SESSION_EXPIRED",
///   "message": "Session expired, sign in again at http://host/login?error=session_expired"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed; nothing was sent
    ValidationError,

    /// Token missing or rejected
    SessionExpired,

    /// Backend unreachable or answered with an error status
    NetworkError,

    /// Backend answered with an unusable payload
    InvalidResponse,

    /// Operation not allowed in the record's current state
    BusinessLogic,

    /// A previous run of the same action is still in flight
    Busy,

    /// Configuration could not be loaded or saved
    ConfigError,

    /// Local file or PDF failure
    Internal,
}

impl ErrorCode {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ValidationError => 2,
            ErrorCode::SessionExpired => 3,
            ErrorCode::NotFound | ErrorCode::BusinessLogic => 4,
            ErrorCode::NetworkError | ErrorCode::InvalidResponse | ErrorCode::Busy => 5,
            ErrorCode::ConfigError | ErrorCode::Internal => 1,
        }
    }
}

impl PortalError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        PortalError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        PortalError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortalError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts client errors to portal errors.
impl From<ClientError> for PortalError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::SessionExpired { redirect } => PortalError::new(
                ErrorCode::SessionExpired,
                format!("Session expired, sign in again at {}", redirect),
            ),
            ClientError::MissingToken => PortalError::new(
                ErrorCode::SessionExpired,
                "No access token. Run `torque-portal login <token>` or pass --token",
            ),
            ClientError::Http { status: 404, message } => PortalError::new(ErrorCode::NotFound, message),
            ClientError::Http { status, message } => {
                PortalError::new(ErrorCode::NetworkError, format!("Server error ({}): {}", status, message))
            }
            ClientError::Network(e) => PortalError::new(ErrorCode::NetworkError, e),
            ClientError::NoEndpoints(action) => {
                tracing::error!(%action, "Action has no endpoints configured");
                PortalError::new(ErrorCode::Internal, format!("{} is not available", action))
            }
            ClientError::InvalidResponse(e) => {
                PortalError::new(ErrorCode::InvalidResponse, format!("Unexpected server response: {}", e))
            }
            ClientError::Validation(e) => e.into(),
            ClientError::Core(e) => e.into(),
            ClientError::Wizard(e) => e.into(),
            ClientError::Busy(action) => {
                PortalError::new(ErrorCode::Busy, format!("{} is already in progress", action))
            }
            ClientError::Config(e) => PortalError::new(ErrorCode::ConfigError, e),
            ClientError::Pdf(e) => {
                tracing::error!("PDF rendering failed: {}", e);
                PortalError::new(ErrorCode::Internal, "Could not create the invoice PDF")
            }
            ClientError::Io(e) => PortalError::new(ErrorCode::Internal, e.to_string()),
        }
    }
}

impl From<CoreError> for PortalError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            other => PortalError::new(ErrorCode::BusinessLogic, other.to_string()),
        }
    }
}

impl From<ValidationError> for PortalError {
    fn from(err: ValidationError) -> Self {
        PortalError::validation(err.to_string())
    }
}

impl From<WizardError> for PortalError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Validation(e) => e.into(),
            other => PortalError::new(ErrorCode::BusinessLogic, other.to_string()),
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::new(ErrorCode::Internal, err.to_string())
    }
}

impl std::fmt::Display for PortalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for PortalError {}

pub type PortalResult<T> = Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry_keeps_redirect() {
        let err: PortalError = ClientError::SessionExpired {
            redirect: "http://localhost:8080/login?error=session_expired".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::SessionExpired);
        assert!(err.message.ends_with("/login?error=session_expired"));
        assert_eq!(err.code.exit_code(), 3);
    }

    #[test]
    fn test_nested_validation_maps_to_validation() {
        let inner = ValidationError::Required { field: "Email".into() };
        let err: PortalError = ClientError::Wizard(WizardError::Validation(inner)).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Email is required");
    }

    #[test]
    fn test_not_completed_is_business_logic() {
        let err: PortalError = ClientError::Core(CoreError::ServiceNotCompleted("12".into())).into();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(PortalError::not_found("Customer", "7")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Customer not found: 7");
    }
}
