//! Client-side input validation.
//!
//! These checks run before any store write; a failing value is surfaced
//! inline to the user and never reaches the document store.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid phone number (expected 0XXXXXXXXX or +94XXXXXXXXX)")]
    InvalidPhone,
    #[error("invalid NIC (expected 9 digits followed by V/X, or 12 digits)")]
    InvalidNic,
    #[error("invalid birthday (expected YYYY-MM-DD, not in the future)")]
    InvalidBirthday,
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

// Sri Lankan mobile/landline numbers: local 0XXXXXXXXX or international +94.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:0\d{9}|\+94\d{9})$").unwrap());

// Old NIC format (9 digits + V/X) or the new 12-digit format.
static NIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{9}[VvXx]|\d{12})$").unwrap());

/// # Errors
///
/// Returns [`ValidationError::Required`] when `value` is empty or
/// whitespace-only.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] for anything that is not a
/// plausible address.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// # Errors
///
/// Returns [`ValidationError::InvalidPhone`] unless `phone` is a Sri Lankan
/// number in local or `+94` form.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// # Errors
///
/// Returns [`ValidationError::InvalidNic`] unless `nic` matches the old or
/// new national identity card format.
pub fn validate_nic(nic: &str) -> Result<(), ValidationError> {
    if NIC_RE.is_match(nic) {
        Ok(())
    } else {
        Err(ValidationError::InvalidNic)
    }
}

/// # Errors
///
/// Returns [`ValidationError::InvalidBirthday`] unless `birthday` is a valid
/// `YYYY-MM-DD` date on or before `today`.
pub fn validate_birthday(birthday: &str, today: NaiveDate) -> Result<(), ValidationError> {
    let date = NaiveDate::parse_from_str(birthday, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidBirthday)?;
    if date > today {
        return Err(ValidationError::InvalidBirthday);
    }
    Ok(())
}
