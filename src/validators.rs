/// Input validators for account payloads
/// Features:
/// 1. Length limits on every free-text field
/// 2. Email normalization (trim + lowercase) and format check
/// 3. Role and id parsing
///
/// Each validator returns the normalized value so handlers never work with
/// raw input after validation.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;
use crate::models::Role;

const MAX_EMAIL_LENGTH: usize = 255;
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// bcrypt ignores everything past its first 72 input bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).unwrap();
}

/// Validates an email address, returning it trimmed and lowercased
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let normalized = email.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if normalized.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(&normalized) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(normalized)
}

/// Validates a display name, returning it trimmed
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()));
    }

    let length = trimmed.chars().count();
    if length < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort("name".to_string(), MIN_NAME_LENGTH));
    }

    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name".to_string(), MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::invalid("name", "must not contain control characters"));
    }

    Ok(trimmed.to_string())
}

/// Validates a plaintext password before hashing.
///
/// Passwords are taken verbatim; surrounding whitespace is significant. The
/// upper bound is in bytes so two accepted passwords never share a hash.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password".to_string(), MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::invalid(
            "password",
            format!("must be at most {} bytes", MAX_PASSWORD_BYTES),
        ));
    }

    Ok(())
}

/// Parses a role name (`user` or `admin`)
pub fn is_valid_role(role: &str) -> Result<Role, ValidationError> {
    role.trim()
        .parse::<Role>()
        .map_err(|_| ValidationError::invalid("role", "must be one of 'user' or 'admin'"))
}

/// Parses the `:id` path segment into a positive integer id
pub fn is_valid_user_id(raw: &str) -> Result<i32, ValidationError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::invalid("id", "must be a positive integer")),
    }
}

/// Runs a validator and files its error, if any, into `errors`
pub fn collect<T>(
    result: Result<T, ValidationError>,
    errors: &mut Vec<ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(
            is_valid_email("  John.Doe@Example.COM ").unwrap(),
            "john.doe@example.com"
        );
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
        assert!(is_valid_email("user@localhost").is_err());
        assert_eq!(
            is_valid_email("   ").unwrap_err(),
            ValidationError::EmptyField("email".to_string())
        );
    }

    #[test]
    fn test_email_length_limit() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            is_valid_email(&too_long).unwrap_err(),
            ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH)
        );
    }

    #[test]
    fn test_valid_name() {
        assert_eq!(is_valid_name("  John Doe ").unwrap(), "John Doe");
        assert!(is_valid_name("Jean-Pierre").is_ok());
        assert!(is_valid_name("O'Brien").is_ok());
    }

    #[test]
    fn test_name_length_limits() {
        assert!(is_valid_name(&"a".repeat(256)).is_err());
        assert!(is_valid_name("").is_err());
        assert!(is_valid_name("J").is_err());
    }

    #[test]
    fn test_control_characters() {
        assert!(is_valid_name("Name\0with\0null").is_err());
    }

    #[test]
    fn test_password_bounds() {
        assert!(is_valid_password("secret").is_ok());
        assert!(is_valid_password("short").is_err());
        assert!(is_valid_password("").is_err());
        assert!(is_valid_password(&"p".repeat(MAX_PASSWORD_BYTES)).is_ok());
        assert!(is_valid_password(&"p".repeat(MAX_PASSWORD_BYTES + 1)).is_err());
    }

    #[test]
    fn test_passwords_past_bcrypt_input_limit_are_rejected() {
        // bcrypt would hash both of these identically
        let first = format!("{}X", "a".repeat(MAX_PASSWORD_BYTES));
        let second = format!("{}Y", "a".repeat(MAX_PASSWORD_BYTES));

        assert_eq!(is_valid_password(&first).unwrap_err().field(), "password");
        assert!(is_valid_password(&second).is_err());
    }

    #[test]
    fn test_password_limit_counts_bytes() {
        // 37 chars, 74 bytes
        let multibyte = "\u{e9}".repeat(37);
        assert!(is_valid_password(&multibyte).is_err());
        assert!(is_valid_password(&"\u{e9}".repeat(36)).is_ok());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(is_valid_role("admin").unwrap(), Role::Admin);
        assert_eq!(is_valid_role("user").unwrap(), Role::User);
        assert_eq!(is_valid_role("root").unwrap_err().field(), "role");
    }

    #[test]
    fn test_user_id_parsing() {
        assert_eq!(is_valid_user_id("42").unwrap(), 42);
        assert!(is_valid_user_id("0").is_err());
        assert!(is_valid_user_id("-3").is_err());
        assert!(is_valid_user_id("abc").is_err());
    }

    #[test]
    fn test_collect_accumulates_errors() {
        let mut errors = Vec::new();
        let name = collect(is_valid_name("Ada Lovelace"), &mut errors);
        let email = collect(is_valid_email("nope"), &mut errors);

        assert_eq!(name.as_deref(), Some("Ada Lovelace"));
        assert!(email.is_none());
        assert_eq!(errors.len(), 1);
    }
}
