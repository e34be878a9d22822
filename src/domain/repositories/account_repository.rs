//! Account collaborator used to verify authenticated identities.

use async_trait::async_trait;

use super::StoreResult;

/// Read-only view of the account store.
///
/// Account creation, password storage and token issuance live outside this
/// service; the core only needs to know whether an identity exists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Returns true if an account with this email exists.
    ///
    /// # Errors
    ///
    /// Returns [`super::StoreError::Unavailable`] on transport failures.
    async fn identity_exists(&self, email: &str) -> StoreResult<bool>;
}
