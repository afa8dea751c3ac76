//! # Validation Module
//!
//! Field-level validators for every portal form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form payload (forms.rs)                                      │
//! │  └── calls the validators below, field by field                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Presence and length                                               │
//! │  ├── Formats (email, phone, registration, PIN code)                    │
//! │  └── Ranges (prices, quantities, year, delivery date)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: REST backend                                                 │
//! │  └── Uniqueness and referential rules (not checked here)               │
//! │                                                                         │
//! │  A failure in layers 1-2 means no request is issued.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use torque_core::validation::{validate_email, validate_registration_number};
//!
//! validate_email("Email", "asha@example.com").unwrap();
//! assert!(validate_registration_number("MH 12 AB 1234").is_ok());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_SEARCH_QUERY_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest free-text name accepted by any form.
pub const MAX_NAME_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Requires a non-blank value and returns it trimmed.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value.to_string())
}

/// Validates a person, item or vehicle name.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = validate_required(field, value)?;
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(value)
}

/// Validates an email address.
///
/// Only the shape is checked: one `@`, a non-empty local part, and a domain
/// with a dot that neither starts nor ends the domain.
///
/// ## Example
/// ```rust
/// use torque_core::validation::validate_email;
///
/// assert!(validate_email("Email", "kiran@garage.in").is_ok());
/// assert!(validate_email("Email", "kiran@garage").is_err());
/// assert!(validate_email("Email", "").is_err());
/// ```
pub fn validate_email(field: &str, value: &str) -> ValidationResult<String> {
    let value = validate_required(field, value)?;
    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid email address".to_string(),
    };

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || value.contains(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(value)
}

/// Validates a mobile number and returns its 10 digits.
///
/// Spaces, hyphens and a leading `+91` or `0` are accepted and stripped.
///
/// ## Example
/// ```rust
/// use torque_core::validation::validate_phone;
///
/// assert_eq!(validate_phone("Phone", "+91 98765-43210").unwrap(), "9876543210");
/// assert!(validate_phone("Phone", "12345").is_err());
/// ```
pub fn validate_phone(field: &str, value: &str) -> ValidationResult<String> {
    let value = validate_required(field, value)?;
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = compact
        .strip_prefix("+91")
        .or_else(|| compact.strip_prefix('0').filter(|rest| rest.len() == 10))
        .unwrap_or(&compact);

    if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a 10 digit mobile number".to_string(),
        });
    }
    Ok(digits.to_string())
}

/// Validates a vehicle registration number and returns it uppercased without
/// separators (`MH 12 AB 1234` becomes `MH12AB1234`).
///
/// ## Rules
/// - Letters and digits only once spaces and hyphens are removed
/// - Between 4 and 15 characters
pub fn validate_registration_number(value: &str) -> ValidationResult<String> {
    const FIELD: &str = "Registration number";
    let value = validate_required(FIELD, value)?;
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();

    if !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: FIELD.to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }
    if compact.len() < 4 {
        return Err(ValidationError::TooShort {
            field: FIELD.to_string(),
            min: 4,
        });
    }
    if compact.len() > 15 {
        return Err(ValidationError::TooLong {
            field: FIELD.to_string(),
            max: 15,
        });
    }
    Ok(compact)
}

/// Validates a six digit PIN code.
pub fn validate_postal_code(value: &str) -> ValidationResult<String> {
    const FIELD: &str = "Postal code";
    let value = validate_required(FIELD, value)?;
    if value.len() != 6 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: FIELD.to_string(),
            reason: "must be 6 digits".to_string(),
        });
    }
    Ok(value)
}

/// Validates a table search query.
///
/// ## Rules
/// - Can be empty (shows the full list)
/// - At most [`MAX_SEARCH_QUERY_LEN`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price or rate entered as a decimal amount.
///
/// ## Rules
/// - Must be a finite number
/// - Zero is allowed, negatives are not
///
/// ## Example
/// ```rust
/// use torque_core::validation::validate_price;
///
/// assert!(validate_price("Unit price", 499.99).is_ok());
/// assert!(validate_price("Unit price", 0.0).is_ok());
/// assert!(validate_price("Unit price", -1.0).is_err());
/// ```
pub fn validate_price(field: &str, amount: f64) -> ValidationResult<Money> {
    if !amount.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a number".to_string(),
        });
    }
    if amount < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(Money::from_decimal(amount))
}

/// Validates a material quantity or labor hours figure; must be greater than zero.
pub fn validate_quantity(field: &str, quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a stock count.
pub fn validate_stock(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a payment amount; cannot pay zero or negative amounts.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "Amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a model year: 1900 up to next year (new models ship early).
pub fn validate_vehicle_year(year: i32, current_year: i32) -> ValidationResult<()> {
    let max = current_year + 1;
    if !(1900..=max).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "Year".to_string(),
            min: 1900,
            max: max as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates a requested delivery date against `today`.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Booking wizard: Step 3                                                 │
/// │                                                                         │
/// │  Customer picks 2026-03-14                                             │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_delivery_date(Some(date), today) ← THIS FUNCTION             │
/// │       │                                                                 │
/// │       ├── None?         → "Delivery date is required"                  │
/// │       ├── date < today? → "Delivery date cannot be in the past"        │
/// │       └── OK            → wizard may advance to Step 4                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_delivery_date(
    date: Option<NaiveDate>,
    today: NaiveDate,
) -> ValidationResult<NaiveDate> {
    const FIELD: &str = "Delivery date";
    let date = date.ok_or_else(|| ValidationError::required(FIELD))?;
    if date < today {
        return Err(ValidationError::DateInPast {
            field: FIELD.to_string(),
        });
    }
    Ok(date)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("Email", "asha@example.com").is_ok());
        assert!(validate_email("Email", "  asha.k@mail.co.in ").is_ok());

        assert!(validate_email("Email", "").is_err());
        assert!(validate_email("Email", "asha").is_err());
        assert!(validate_email("Email", "@example.com").is_err());
        assert!(validate_email("Email", "asha@.com").is_err());
        assert!(validate_email("Email", "asha@example.").is_err());
        assert!(validate_email("Email", "as ha@example.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("Phone", "9876543210").unwrap(), "9876543210");
        assert_eq!(validate_phone("Phone", "09876543210").unwrap(), "9876543210");
        assert_eq!(validate_phone("Phone", "+91-98765 43210").unwrap(), "9876543210");

        assert!(validate_phone("Phone", "98765").is_err());
        assert!(validate_phone("Phone", "98765abcde").is_err());
        let err = validate_phone("Phone", " ").unwrap_err();
        assert_eq!(err, ValidationError::required("Phone"));
    }

    #[test]
    fn test_validate_registration_number() {
        assert_eq!(
            validate_registration_number("mh-12 ab 1234").unwrap(),
            "MH12AB1234"
        );
        assert!(validate_registration_number("").is_err());
        assert!(validate_registration_number("AB1").is_err());
        assert!(validate_registration_number("MH12#1234").is_err());
        assert!(validate_registration_number(&"A".repeat(20)).is_err());
    }

    #[test]
    fn test_validate_postal_code() {
        assert!(validate_postal_code("411001").is_ok());
        assert!(validate_postal_code("41100").is_err());
        assert!(validate_postal_code("4110O1").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  honda ").unwrap(), "honda");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert_eq!(validate_price("Rate", 300.0).unwrap().paise(), 30_000);
        assert!(validate_price("Rate", f64::NAN).is_err());
        assert!(validate_quantity("Quantity", 0.5).is_ok());
        assert!(validate_quantity("Quantity", 0.0).is_err());
        assert!(validate_stock("Stock", 0).is_ok());
        assert!(validate_stock("Stock", -1).is_err());
        assert!(validate_payment_amount(Money::from_paise(1)).is_ok());
        assert!(validate_payment_amount(Money::zero()).is_err());
    }

    #[test]
    fn test_validate_vehicle_year() {
        assert!(validate_vehicle_year(2020, 2026).is_ok());
        assert!(validate_vehicle_year(2027, 2026).is_ok());
        assert!(validate_vehicle_year(2028, 2026).is_err());
        assert!(validate_vehicle_year(1899, 2026).is_err());
    }

    #[test]
    fn test_validate_delivery_date() {
        let today = date(2026, 3, 10);
        assert_eq!(validate_delivery_date(Some(today), today).unwrap(), today);
        assert!(validate_delivery_date(Some(date(2026, 3, 11)), today).is_ok());

        let err = validate_delivery_date(Some(date(2026, 3, 9)), today).unwrap_err();
        assert!(matches!(err, ValidationError::DateInPast { .. }));
        assert!(validate_delivery_date(None, today).is_err());
    }
}
