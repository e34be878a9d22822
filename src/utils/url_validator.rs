//! Long URL validation.
//!
//! URLs are stored exactly as submitted; validation only decides whether a
//! URL may be shortened at all.

use url::Url;

/// Upper bound on accepted URL length.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a long URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL scheme '{0}' is not allowed")]
    UnsupportedScheme(String),

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL exceeds 2048 characters")]
    TooLong,
}

/// Checks that `input` is an absolute URL with a host and an allowed scheme.
///
/// Scheme comparison is case-insensitive; `allowed_schemes` is expected in
/// lowercase.
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for relative or malformed URLs,
/// [`UrlValidationError::UnsupportedScheme`] for schemes outside `allowed_schemes`
/// (which also rejects `javascript:`, `data:`, `file:` and the like),
/// [`UrlValidationError::MissingHost`] when there is no host and
/// [`UrlValidationError::TooLong`] past [`MAX_URL_LENGTH`].
pub fn validate_long_url(input: &str, allowed_schemes: &[String]) -> Result<(), UrlValidationError> {
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if !allowed_schemes.iter().any(|s| s == url.scheme()) {
        return Err(UrlValidationError::UnsupportedScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
