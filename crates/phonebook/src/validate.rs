//! Input format checks for phone numbers and email addresses.
//!
//! The store itself accepts any non-empty strings; these checks run at the
//! edges (interactive input and bulk import) before a contact is built.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Canonical phone layout: `(###) ###-####`.
const PHONE_PATTERN: &str = r"^\(\d{3}\) \d{3}-\d{4}$";

/// Permissive `local@domain.tld` shape. No DNS or MX checks.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$";

/// Characters allowed between the digits of a raw phone entry.
const PHONE_SEPARATORS: &[char] = &[' ', '-', '.', '(', ')'];

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern is valid"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"));

/// Check if a phone number is in canonical `(###) ###-####` form.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Check if an email address has a `local@domain.tld` shape.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate a phone number in canonical form.
///
/// # Errors
///
/// Returns [`Error::InvalidPhone`] if the number is not `(###) ###-####`.
pub fn validate_phone(phone: &str) -> Result<()> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(Error::InvalidPhone(phone.to_string()))
    }
}

/// Validate an optional email address. Empty input is accepted as "none".
///
/// # Errors
///
/// Returns [`Error::InvalidEmail`] if a non-empty address does not match.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() || is_valid_email(email) {
        Ok(())
    } else {
        Err(Error::InvalidEmail(email.to_string()))
    }
}

/// Turn user input into a canonical phone number.
///
/// Accepts the canonical form as-is, or exactly ten digits optionally broken
/// up by spaces, dashes, dots or parentheses (`1234567890`, `123-456-7890`).
///
/// # Errors
///
/// Returns [`Error::InvalidPhone`] for anything else.
pub fn canonicalize_phone(input: &str) -> Result<String> {
    let input = input.trim();
    if is_valid_phone(input) {
        return Ok(input.to_string());
    }

    let only_digits_and_separators = input
        .chars()
        .all(|c| c.is_ascii_digit() || PHONE_SEPARATORS.contains(&c));
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    if !only_digits_and_separators || digits.len() != 10 {
        return Err(Error::InvalidPhone(input.to_string()));
    }

    Ok(format!(
        "({}) {}-{}",
        &digits[..3],
        &digits[3..6],
        &digits[6..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_phone() {
        assert!(is_valid_phone("(123) 456-7890"));
        assert!(!is_valid_phone("123-456-7890"));
        assert!(!is_valid_phone("(123)456-7890"));
        assert!(!is_valid_phone("(123) 456-78901"));
        assert!(!is_valid_phone(" (123) 456-7890"));
    }

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@mail-host.co.uk"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("ada @example.com"));
    }

    #[test]
    fn test_validate_phone_error() {
        let err = validate_phone("555-1234").unwrap_err();
        assert!(matches!(err, Error::InvalidPhone(ref p) if p == "555-1234"));
    }

    #[test]
    fn test_validate_email_allows_empty() {
        assert!(validate_email("").is_ok());
        assert!(validate_email("   ").is_ok());
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_canonicalize_phone() {
        assert_eq!(canonicalize_phone("1234567890").unwrap(), "(123) 456-7890");
        assert_eq!(canonicalize_phone("123-456-7890").unwrap(), "(123) 456-7890");
        assert_eq!(canonicalize_phone("123.456.7890").unwrap(), "(123) 456-7890");
        assert_eq!(
            canonicalize_phone(" (123) 456-7890 ").unwrap(),
            "(123) 456-7890"
        );
    }

    #[test]
    fn test_canonicalize_phone_rejects_bad_input() {
        assert!(canonicalize_phone("12345").is_err());
        assert!(canonicalize_phone("12345678901").is_err());
        assert!(canonicalize_phone("123456789x").is_err());
        assert!(canonicalize_phone("").is_err());
    }
}
