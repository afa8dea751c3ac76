//! # Error Types
//!
//! Domain-specific error types for torque-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  torque-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Form field failures (no network call made)     │
//! │  ├── NormalizeError   - Payload had an unusable shape                  │
//! │  └── WizardError      - Booking wizard transition refused              │
//! │                                                                         │
//! │  torque-api errors (separate crate)                                    │
//! │  └── ClientError      - HTTP, session and rendering failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → PortalError → User  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A service status change would move backwards or leave Completed.
    ///
    /// ## When This Occurs
    /// - Advisor tries to set Diagnosis on a request already in Repair
    /// - Anyone tries to reopen a Completed request
    #[error("Service {request_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        request_id: String,
        from: String,
        to: String,
    },

    /// Invoice requested for a service that is not completed yet.
    #[error("Service {0} is not completed, invoice cannot be generated")]
    ServiceNotCompleted(String),

    /// Payment or dispatch requested before an invoice exists.
    #[error("Service {0} has no invoice yet")]
    InvoiceMissing(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These block submission before any request is issued.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., bad email, bad registration number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Date lies in the past.
    #[error("{field} cannot be in the past")]
    DateInPast { field: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Name of the offending form field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::DateInPast { field } => field,
        }
    }
}

// =============================================================================
// Normalize Error
// =============================================================================

/// Data-shape failures raised while normalizing a backend payload.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizeError {
    /// Expected a JSON object, got something else.
    #[error("Expected an object for {context}, got {actual}")]
    NotAnObject { context: String, actual: String },

    /// Expected a list (or an object wrapping one), got something else.
    #[error("Expected a list of {context}, got {actual}")]
    ExpectedArray { context: String, actual: String },

    /// An identifying field is absent under every known name.
    #[error("{context} is missing {field}")]
    MissingField { context: String, field: String },
}

// =============================================================================
// Wizard Error
// =============================================================================

/// Reasons the booking wizard refuses a transition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WizardError {
    /// The current step's predicate failed; the step is unchanged.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// An operation was attempted on the wrong step.
    #[error("Operation requires step {expected}, wizard is on step {actual}")]
    WrongStep { expected: u8, actual: u8 },

    /// `next` on the confirmation step; submission is a separate action.
    #[error("Already on the final step, submit the booking instead")]
    AlreadyAtEnd,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
