//! Field-level validation applied before any row reaches SQLite.
//!
//! Mirrors the checks a form layer would run: Kenyan phone format,
//! email shape, lower bounds on counts and quantities, month range.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static KENYAN_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?254\d{9}$").unwrap());

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid Kenyan phone number")]
    Phone { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid email address")]
    Email { field: &'static str, value: String },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: i64,
        value: i64,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must not be blank")]
    Blank { field: &'static str },
}

/// Implemented by every entity that carries field-level rules.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub fn validate_phone(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if KENYAN_PHONE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Phone {
            field,
            value: value.to_string(),
        })
    }
}

pub fn validate_optional_phone(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => validate_phone(field, v),
        None => Ok(()),
    }
}

pub fn validate_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Email {
            field,
            value: value.to_string(),
        })
    }
}

pub fn validate_optional_email(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => validate_email(field, v),
        None => Ok(()),
    }
}

pub fn validate_min(field: &'static str, value: i64, min: i64) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::BelowMinimum { field, min, value });
    }
    Ok(())
}

pub fn validate_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

pub fn validate_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_kenyan_numbers_with_and_without_plus() {
        assert!(validate_phone("phone", "+254720123456").is_ok());
        assert!(validate_phone("phone", "254720123456").is_ok());
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(validate_phone("phone", "0720123456").is_err());
        assert!(validate_phone("phone", "+25472012345").is_err());
        assert!(validate_phone("phone", "+2547201234567").is_err());
        assert!(validate_phone("phone", "+255720123456").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("email", "health@wajir.go.ke").is_ok());
        assert!(validate_email("email", "not-an-email").is_err());
        assert!(validate_email("email", "a b@c.d").is_err());
    }

    #[test]
    fn minimum_reports_field_and_value() {
        let err = validate_min("quantity", -1, 0).unwrap_err();
        assert_eq!(
            err,
            ValidationError::BelowMinimum {
                field: "quantity",
                min: 0,
                value: -1
            }
        );
        assert!(validate_min("quantity", 0, 0).is_ok());
    }

    #[test]
    fn range_is_inclusive() {
        assert!(validate_range("month", 1.0, 1.0, 12.0).is_ok());
        assert!(validate_range("month", 12.0, 1.0, 12.0).is_ok());
        assert!(validate_range("month", 13.0, 1.0, 12.0).is_err());
    }

    #[test]
    fn blank_strings_rejected() {
        assert!(validate_not_blank("name", "  ").is_err());
        assert!(validate_not_blank("name", "Wajir").is_ok());
    }
}
