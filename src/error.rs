//! Error types for the authenticated-fetch coordinator
//!
//! Every failure the coordinator can surface is one of the closed set of
//! variants below. Classification happens once at the credential-provider
//! boundary (a provider returns [`FetchError::NotAuthenticated`] when no
//! session exists), never by sniffing message strings downstream.

use thiserror::Error;

/// Main error type for authenticated-fetch operations
///
/// The enum is `Clone` so that all callers joined to one in-flight recovery
/// or refresh operation can observe the identical failure.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// No valid session exists; silent recovery may apply
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// Credential provider failure unrelated to authentication
    /// (propagated as-is, never triggers recovery or sign-out)
    #[error("credential provider error: {0}")]
    Provider(String),

    /// Silent session recovery was unavailable or did not succeed.
    /// The source is the `NotAuthenticated` error that initiated recovery,
    /// so the caller-visible cause stays meaningful. Sign-out has already
    /// been performed when this error surfaces.
    #[error("session recovery failed")]
    RecoveryFailed {
        /// The initiating authentication error
        #[source]
        source: Box<FetchError>,
    },

    /// Token re-acquisition after a 401 response failed.
    /// Sign-out has already been performed when this error surfaces.
    #[error("token refresh failed")]
    RefreshFailed {
        /// The underlying token-acquisition error
        #[source]
        source: Box<FetchError>,
    },

    /// A second 401 was received even after a successful refresh and retry;
    /// the session cannot be trusted. Sign-out has already been performed.
    #[error("still unauthorized after token refresh: {url}")]
    UnauthorizedAfterRefresh {
        /// URL of the request that was rejected twice
        url: String,
    },

    /// Network-level failure (DNS, connection reset, etc.); does not
    /// indicate an authentication problem and never triggers sign-out
    #[error("transport error: {0}")]
    Transport(String),

    /// Request could not be constructed (malformed URL or header value)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Response body could not be decoded
    #[error("response decode error: {0}")]
    Decode(String),
}

/// Result type alias for authenticated-fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

impl FetchError {
    /// Create a not-authenticated error
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::NotAuthenticated(msg.into())
    }

    /// Create a provider error (non-authentication credential failure)
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a recovery-failed error wrapping the initiating error
    #[must_use]
    pub fn recovery_failed(source: FetchError) -> Self {
        Self::RecoveryFailed {
            source: Box::new(source),
        }
    }

    /// Create a refresh-failed error wrapping the underlying error
    #[must_use]
    pub fn refresh_failed(source: FetchError) -> Self {
        Self::RefreshFailed {
            source: Box::new(source),
        }
    }

    /// Create an unauthorized-after-refresh error
    pub fn unauthorized_after_refresh(url: impl Into<String>) -> Self {
        Self::UnauthorizedAfterRefresh { url: url.into() }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a response decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Whether this is the not-authenticated classification
    #[must_use]
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated(_))
    }

    /// Whether this error ended the call with the session signed out
    ///
    /// UI layers typically react to these by redirecting to login.
    #[must_use]
    pub fn is_terminal_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::RecoveryFailed { .. }
                | Self::RefreshFailed { .. }
                | Self::UnauthorizedAfterRefresh { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_authenticated_classification() {
        let err = FetchError::not_authenticated("session expired");
        assert!(err.is_not_authenticated());
        assert!(!err.is_terminal_auth_failure());
        assert_eq!(err.to_string(), "not authenticated: session expired");
    }

    #[test]
    fn test_recovery_failed_carries_original_source() {
        let original = FetchError::not_authenticated("no session");
        let err = FetchError::recovery_failed(original);

        assert!(err.is_terminal_auth_failure());
        match err {
            FetchError::RecoveryFailed { source } => {
                assert!(source.is_not_authenticated());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_terminal_auth_failure_set() {
        let refresh = FetchError::refresh_failed(FetchError::provider("idp down"));
        let second_401 = FetchError::unauthorized_after_refresh("https://api.example.com/cases");
        let transport = FetchError::transport("connection reset");

        assert!(refresh.is_terminal_auth_failure());
        assert!(second_401.is_terminal_auth_failure());
        assert!(!transport.is_terminal_auth_failure());
    }

    #[test]
    fn test_errors_are_cloneable_for_shared_outcomes() {
        let err = FetchError::refresh_failed(FetchError::not_authenticated("gone"));
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
    }
}
