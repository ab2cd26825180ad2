//! Trait-based credential provider definition.
//!
//! The identity-provider SDK is consumed as a black box through this trait.
//! Implement it on your own type, or share one instance across coordinators
//! via the `Arc` blanket implementation.
//!
//! # Example
//!
//! ```no_run
//! use authfetch::auth::{AccessToken, CredentialProvider};
//! use authfetch::{FetchError, Result};
//! use async_trait::async_trait;
//!
//! struct IdpSession;
//!
//! #[async_trait]
//! impl CredentialProvider for IdpSession {
//!     async fn access_token(&self) -> Result<AccessToken> {
//!         // Consult the identity-provider SDK's token cache here.
//!         Err(FetchError::not_authenticated("no active session"))
//!     }
//!
//!     async fn sign_out(&self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::AccessToken;
use crate::error::Result;

/// Interface to the external identity provider.
///
/// Error classification happens here, once, at this boundary: an
/// implementation must return [`FetchError::NotAuthenticated`] when no
/// session exists, and any other error kind for transient failures during
/// token retrieval. The coordinator decides whether silent recovery applies
/// purely from that classification.
///
/// [`FetchError::NotAuthenticated`]: crate::FetchError::NotAuthenticated
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolve the current bearer token.
    ///
    /// The provider is expected to serve a cached value until expiry and to
    /// force a renewed token when called again after a 401 (or fail if
    /// renewal is impossible).
    ///
    /// # Errors
    ///
    /// [`FetchError::NotAuthenticated`] when no session exists; any other
    /// error for transient failure, which the coordinator propagates
    /// untouched.
    ///
    /// [`FetchError::NotAuthenticated`]: crate::FetchError::NotAuthenticated
    async fn access_token(&self) -> Result<AccessToken>;

    /// Terminate the session.
    ///
    /// Best-effort: the coordinator always awaits it to completion before
    /// surfacing its own failure, but a sign-out failure never suppresses
    /// the primary error.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity provider could not complete the
    /// sign-out; the coordinator logs and otherwise ignores it.
    async fn sign_out(&self) -> Result<()>;

    /// Attempt to re-establish a session without user interaction
    /// (e.g. hidden-iframe re-authentication or a long-lived renewal
    /// cookie).
    ///
    /// Returns `Ok(false)` when recovery did not succeed; that is not
    /// itself an error. The default implementation reports the capability
    /// as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the recovery attempt itself failed; the
    /// coordinator treats that the same as `Ok(false)`.
    async fn sign_in_silently(&self) -> Result<bool> {
        Ok(false)
    }
}

#[async_trait]
impl<T: CredentialProvider + ?Sized> CredentialProvider for Arc<T> {
    async fn access_token(&self) -> Result<AccessToken> {
        (**self).access_token().await
    }

    async fn sign_out(&self) -> Result<()> {
        (**self).sign_out().await
    }

    async fn sign_in_silently(&self) -> Result<bool> {
        (**self).sign_in_silently().await
    }
}

#[async_trait]
impl CredentialProvider for Box<dyn CredentialProvider> {
    async fn access_token(&self) -> Result<AccessToken> {
        (**self).access_token().await
    }

    async fn sign_out(&self) -> Result<()> {
        (**self).sign_out().await
    }

    async fn sign_in_silently(&self) -> Result<bool> {
        (**self).sign_in_silently().await
    }
}

/// Type alias for a shared credential provider.
pub type SharedCredentialProvider = Arc<dyn CredentialProvider>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    struct FixedProvider;

    #[async_trait]
    impl CredentialProvider for FixedProvider {
        async fn access_token(&self) -> Result<AccessToken> {
            Ok(AccessToken::new("fixed"))
        }

        async fn sign_out(&self) -> Result<()> {
            Ok(())
        }
    }

    struct LoggedOutProvider;

    #[async_trait]
    impl CredentialProvider for LoggedOutProvider {
        async fn access_token(&self) -> Result<AccessToken> {
            Err(FetchError::not_authenticated("no session"))
        }

        async fn sign_out(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_provider_trait() {
        let provider = FixedProvider;
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.as_str(), "fixed");
    }

    #[tokio::test]
    async fn test_silent_sign_in_defaults_to_unavailable() {
        let provider = FixedProvider;
        assert!(!provider.sign_in_silently().await.unwrap());
    }

    #[tokio::test]
    async fn test_arc_wrapped_provider() {
        let provider: SharedCredentialProvider = Arc::new(LoggedOutProvider);
        let err = provider.access_token().await.unwrap_err();
        assert!(err.is_not_authenticated());
    }
}
