//! Short code generation and validation utilities.
//!
//! Generated codes are content-addressed: the first attempt for a URL always
//! yields the same code. Later attempts perturb the input with a random suffix
//! so that a collision with a different URL can be stepped around.

use crate::error::AppError;
use rand::{Rng, distr::Alphanumeric};
use serde_json::json;
use sha2::{Digest, Sha256};

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default number of candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Length of the random suffix appended on perturbed attempts.
const PERTURBATION_LENGTH: usize = 8;

/// Bounds for user-supplied codes.
pub const MIN_CUSTOM_CODE_LENGTH: usize = 4;
pub const MAX_CUSTOM_CODE_LENGTH: usize = 32;

/// Codes that would shadow routes served next to the redirect endpoint.
const RESERVED_CODES: &[&str] = &["api", "health"];

/// Returns the content-addressed code for `long_url`.
///
/// Lowercase hex of the SHA-256 digest, truncated to `length` characters
/// (capped at the digest's 64 hex characters).
pub fn fingerprint_code(long_url: &str, length: usize) -> String {
    let digest = Sha256::digest(long_url.as_bytes());
    let mut code = hex::encode(digest);
    code.truncate(length);
    code
}

/// Returns the candidate code for the given attempt.
///
/// Attempt `0` is the plain fingerprint; every later attempt fingerprints the
/// URL with a fresh random suffix.
pub fn candidate_code(long_url: &str, attempt: usize, length: usize) -> String {
    if attempt == 0 {
        return fingerprint_code(long_url, length);
    }

    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(PERTURBATION_LENGTH)
        .map(char::from)
        .collect();

    fingerprint_code(&format!("{long_url}{suffix}"), length)
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot start or end with `-` or `_`
/// - Cannot be a reserved route segment
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < MIN_CUSTOM_CODE_LENGTH || code.len() > MAX_CUSTOM_CODE_LENGTH {
        return Err(AppError::bad_request(
            "Custom code must be 4-32 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, hyphens and underscores",
            json!({ "code": code }),
        ));
    }

    let edge = |c: char| c == '-' || c == '_';
    if code.starts_with(edge) || code.ends_with(edge) {
        return Err(AppError::bad_request(
            "Custom code cannot start or end with a hyphen or underscore",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint_code("https://example.com/a", DEFAULT_CODE_LENGTH);
        let b = fingerprint_code("https://example.com/a", DEFAULT_CODE_LENGTH);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_length_and_charset() {
        let code = fingerprint_code("https://example.com/a", DEFAULT_CODE_LENGTH);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_fingerprint_differs_per_url() {
        let a = fingerprint_code("https://example.com/a", DEFAULT_CODE_LENGTH);
        let b = fingerprint_code("https://example.com/b", DEFAULT_CODE_LENGTH);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_known_prefix() {
        // sha256("abc") = ba7816bf...
        assert_eq!(fingerprint_code("abc", 8), "ba7816bf");
    }

    #[test]
    fn test_candidate_zero_is_fingerprint() {
        let url = "https://example.com/a";
        assert_eq!(candidate_code(url, 0, 6), fingerprint_code(url, 6));
    }

    #[test]
    fn test_perturbed_candidates_vary() {
        let url = "https://example.com/a";
        let codes: HashSet<String> = (1..=50).map(|n| candidate_code(url, n, 10)).collect();

        assert!(codes.len() > 45);
        assert!(!codes.contains(&fingerprint_code(url, 10)));
    }

    #[test]
    fn test_validate_accepts_valid_codes() {
        assert!(validate_custom_code("promo").is_ok());
        assert!(validate_custom_code("My_Link-2024").is_ok());
        assert!(validate_custom_code("abcd").is_ok());
        assert!(validate_custom_code(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_validate_length_bounds() {
        assert!(validate_custom_code("abc").is_err());
        assert!(validate_custom_code(&"a".repeat(33)).is_err());
        assert!(validate_custom_code("").is_err());
    }

    #[test]
    fn test_validate_charset() {
        let err = validate_custom_code("my code").unwrap_err();
        assert!(err.to_string().contains("letters, digits"));
        assert!(validate_custom_code("promo@2024").is_err());
        assert!(validate_custom_code("prömo").is_err());
    }

    #[test]
    fn test_validate_edges() {
        assert!(validate_custom_code("-promo").is_err());
        assert!(validate_custom_code("promo_").is_err());
    }

    #[test]
    fn test_validate_reserved() {
        // "api" is below the minimum length anyway; "health" is not.
        let err = validate_custom_code("HEALTH").unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
