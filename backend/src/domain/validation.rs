//! Input validation helpers shared by the domain services.
//!
//! Blank or whitespace-only input is treated the same as missing input
//! everywhere, so a request cannot smuggle an empty field past a
//! presence check.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use super::error::Error;

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this constrains allowed characters.
        Regex::new("^[a-z0-9_]+$").unwrap_or_else(|error| {
            panic!("username regex failed to compile: {error}");
        })
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|error| {
            panic!("email regex failed to compile: {error}");
        })
    })
}

/// Error for a field that is absent or blank.
pub fn missing_field_error(field: &str) -> Error {
    Error::invalid_request(format!("{field} is required"))
        .with_details(json!({ "field": field, "code": "missing_field" }))
}

/// Require a non-blank value, returning the trimmed form.
pub fn require_non_blank(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing_field_error(field));
    }
    Ok(trimmed.to_owned())
}

/// Validate and normalise a username to its lowercase canonical form.
pub fn normalise_username(value: &str) -> Result<String, Error> {
    let username = require_non_blank("username", value)?.to_lowercase();
    let length = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        return Err(Error::invalid_request(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        ))
        .with_details(json!({ "field": "username", "code": "invalid_length" })));
    }
    if !username_regex().is_match(&username) {
        return Err(Error::invalid_request(
            "username may only contain lowercase letters, numbers, or underscores",
        )
        .with_details(json!({ "field": "username", "code": "invalid_characters" })));
    }
    Ok(username)
}

/// Validate and normalise an email address to lowercase.
pub fn normalise_email(value: &str) -> Result<String, Error> {
    let email = require_non_blank("email", value)?.to_lowercase();
    if !email_regex().is_match(&email) {
        return Err(Error::invalid_request("email address is not valid")
            .with_details(json!({ "field": "email", "code": "invalid_email" })));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::error::ErrorCode;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_values_count_as_missing(#[case] value: &str) {
        let err = require_non_blank("title", value).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "title is required");
    }

    #[test]
    fn non_blank_values_are_trimmed() {
        assert_eq!(
            require_non_blank("title", "  hello  ").expect("valid"),
            "hello"
        );
    }

    #[rstest]
    #[case("Ada_01", "ada_01")]
    #[case("  CHAI ", "chai")]
    fn usernames_are_lowercased(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise_username(input).expect("valid"), expected);
    }

    #[rstest]
    #[case("ab")]
    #[case("has spaces")]
    #[case("bad!chars")]
    fn invalid_usernames_are_rejected(#[case] input: &str) {
        assert!(normalise_username(input).is_err());
    }

    #[rstest]
    #[case("Ada@Example.COM", "ada@example.com")]
    fn emails_are_lowercased(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise_email(input).expect("valid"), expected);
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("a@b")]
    #[case("two@@example.com")]
    fn invalid_emails_are_rejected(#[case] input: &str) {
        assert!(normalise_email(input).is_err());
    }
}
