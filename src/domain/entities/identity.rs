//! Caller identity consumed by quota and ownership checks.

use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

use crate::error::AppError;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("email regex is valid"));

/// Who is asking.
///
/// Authenticated callers are identified by their account email; guests by a
/// transient token such as their source IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(String),
    Guest(String),
}

impl Identity {
    /// Builds an authenticated identity, rejecting malformed emails.
    pub fn authenticated(email: impl Into<String>) -> Result<Self, AppError> {
        let identity = Self::Authenticated(email.into());
        identity.validate()?;
        Ok(identity)
    }

    /// Builds a guest identity, rejecting empty tokens.
    pub fn guest(token: impl Into<String>) -> Result<Self, AppError> {
        let identity = Self::Guest(token.into());
        identity.validate()?;
        Ok(identity)
    }

    /// Checks that the identity is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] for malformed emails or empty guest tokens.
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            Identity::Authenticated(email) if !EMAIL_REGEX.is_match(email) => Err(
                AppError::bad_request("Malformed account identity", json!({ "identity": email })),
            ),
            Identity::Guest(token) if token.trim().is_empty() => {
                Err(AppError::bad_request("Missing guest identity", json!({})))
            }
            _ => Ok(()),
        }
    }

    /// The owner id stored on records created by this identity.
    pub fn owner_id(&self) -> &str {
        match self {
            Identity::Authenticated(email) => email,
            Identity::Guest(token) => token,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest(_))
    }
}
