//! Authenticated request orchestration
//!
//! [`AuthenticatedFetch`] drives the full lifecycle of one logical call:
//!
//! ```text
//! Acquire ──ok──────────────► Dispatch ──status != 401──► response
//!    │                           │
//!    │ not authenticated         │ 401
//!    ▼                           ▼
//! Recover (single-flight)     Refresh (single-flight)
//!    │ ok                        │ ok
//!    └──────► Dispatch           ▼
//!    │ fail                   Retry ──status != 401──► response
//!    ▼                           │ 401
//! sign out + RecoveryFailed      ▼
//!                             sign out + UnauthorizedAfterRefresh
//! ```
//!
//! At most two request attempts occur per logical call. Sign-out runs on
//! every terminal failure that stems from an authentication problem, never
//! on transport failures or non-401 error statuses.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::auth::{AccessToken, CredentialProvider};
use crate::error::{FetchError, Result};
use crate::headers::compose_headers;
use crate::singleflight::SingleFlight;
use crate::transport::{HttpTransport, ReqwestTransport, Request, RequestOptions, Response};

/// The recovery operations the coordinator deduplicates.
///
/// The two kinds are independent single-flight keys; a refresh failure is
/// never conflated with a silent-sign-in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryKind {
    /// Non-interactive session recovery before the first attempt
    SilentSignIn,
    /// Token re-acquisition after a 401 response
    Refresh,
}

/// Coordinator for authenticated requests.
///
/// Cheap to clone is not a goal; instead share one instance (it is `Send +
/// Sync`) across all data-fetching call sites so their recovery attempts
/// collapse into single flights. Independent instances never interfere.
///
/// # Example
///
/// ```no_run
/// use authfetch::auth::{AccessToken, CredentialProvider};
/// use authfetch::{AuthenticatedFetch, RequestOptions, Result};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct IdpSession;
///
/// #[async_trait]
/// impl CredentialProvider for IdpSession {
///     async fn access_token(&self) -> Result<AccessToken> {
///         Ok(AccessToken::new("token-from-idp"))
///     }
///     async fn sign_out(&self) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// # async fn example() -> Result<()> {
/// let fetch = AuthenticatedFetch::builder(Arc::new(IdpSession)).build();
/// let response = fetch
///     .fetch("https://api.example.com/cases", RequestOptions::get())
///     .await?;
/// println!("status: {}", response.status());
/// # Ok(())
/// # }
/// ```
pub struct AuthenticatedFetch {
    provider: Arc<dyn CredentialProvider>,
    transport: Arc<dyn HttpTransport>,
    identity_headers: HeaderMap,
    recovery: SingleFlight<RecoveryKind, AccessToken>,
}

impl AuthenticatedFetch {
    /// Create a coordinator with the production reqwest transport
    #[must_use]
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self::builder(provider).build()
    }

    /// Create a builder for custom transport or identity headers
    #[must_use]
    pub fn builder(provider: Arc<dyn CredentialProvider>) -> AuthenticatedFetchBuilder {
        AuthenticatedFetchBuilder::new(provider)
    }

    /// Execute one logical authenticated call.
    ///
    /// Acquires a token, dispatches the request, and on a 401 performs one
    /// shared token refresh followed by exactly one retry. Non-401 statuses
    /// (including 4xx/5xx) are returned as-is for the caller to interpret.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RecoveryFailed`] when no session existed and silent
    ///   recovery did not produce one (sign-out performed)
    /// - [`FetchError::RefreshFailed`] when the post-401 token
    ///   re-acquisition failed (sign-out performed)
    /// - [`FetchError::UnauthorizedAfterRefresh`] on a second consecutive
    ///   401 (sign-out performed)
    /// - [`FetchError::Transport`] on network-level failure (no sign-out)
    /// - any non-authentication provider error, propagated untouched
    pub async fn fetch(&self, url: impl Into<String>, options: RequestOptions) -> Result<Response> {
        let url = url.into();

        let token = self.acquire().await?;
        let response = self.dispatch(&token, &url, &options).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(%url, "received 401, refreshing token");
        let refreshed = match self.refresh().await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(%error, "token refresh failed, signing out");
                self.sign_out_best_effort().await;
                return Err(FetchError::refresh_failed(error));
            }
        };

        let retry = self.dispatch(&refreshed, &url, &options).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            // A second consecutive 401 means the session cannot be trusted.
            tracing::warn!(%url, "still unauthorized after refresh, signing out");
            self.sign_out_best_effort().await;
            return Err(FetchError::unauthorized_after_refresh(url));
        }

        Ok(retry)
    }

    /// Resolve a token, recovering the session silently if none exists.
    async fn acquire(&self) -> Result<AccessToken> {
        match self.provider.access_token().await {
            Ok(token) => Ok(token),
            Err(original) if original.is_not_authenticated() => self.recover(original).await,
            // Token-acquisition failures unrelated to authentication are
            // not retried here.
            Err(other) => Err(other),
        }
    }

    /// Join the shared silent-sign-in attempt; on failure, sign out and
    /// surface the initiating error so messages stay meaningful to the UI.
    async fn recover(&self, original: FetchError) -> Result<AccessToken> {
        let provider = Arc::clone(&self.provider);
        let outcome = self
            .recovery
            .run(RecoveryKind::SilentSignIn, async move {
                if provider.sign_in_silently().await? {
                    provider.access_token().await
                } else {
                    Err(FetchError::provider(
                        "silent sign-in did not re-establish a session",
                    ))
                }
            })
            .await;

        match outcome {
            Ok(token) => {
                tracing::debug!("session recovered silently");
                Ok(token)
            }
            Err(error) => {
                tracing::warn!(%error, "silent session recovery failed, signing out");
                self.sign_out_best_effort().await;
                Err(FetchError::recovery_failed(original))
            }
        }
    }

    /// Join the shared post-401 refresh attempt. The provider is expected
    /// to force a renewed token on this call or surface failure.
    async fn refresh(&self) -> Result<AccessToken> {
        let provider = Arc::clone(&self.provider);
        self.recovery
            .run(RecoveryKind::Refresh, async move {
                provider.access_token().await
            })
            .await
    }

    /// Compose headers for `token` and issue the request once.
    async fn dispatch(
        &self,
        token: &AccessToken,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response> {
        let headers = compose_headers(token, &options.headers, &self.identity_headers)?;
        let request = Request {
            method: options.method.clone(),
            url: url.to_string(),
            headers,
            body: options.body.clone(),
        };
        self.transport.execute(request).await
    }

    /// Sign out, logging rather than surfacing its own failure; the
    /// primary error is what the caller must see.
    async fn sign_out_best_effort(&self) {
        if let Err(error) = self.provider.sign_out().await {
            tracing::warn!(%error, "sign-out failed");
        }
    }
}

impl std::fmt::Debug for AuthenticatedFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedFetch")
            .field("identity_headers", &self.identity_headers)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AuthenticatedFetch`]
pub struct AuthenticatedFetchBuilder {
    provider: Arc<dyn CredentialProvider>,
    transport: Option<Arc<dyn HttpTransport>>,
    identity_headers: HeaderMap,
}

impl AuthenticatedFetchBuilder {
    /// Create a builder around a credential provider
    #[must_use]
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self {
            provider,
            transport: None,
            identity_headers: HeaderMap::new(),
        }
    }

    /// Set a custom transport (defaults to [`ReqwestTransport`])
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Add an auxiliary identity header attached to every request unless
    /// the caller already set it
    #[must_use]
    pub fn identity_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.identity_headers.insert(name, value);
        self
    }

    /// Build the coordinator
    #[must_use]
    pub fn build(self) -> AuthenticatedFetch {
        AuthenticatedFetch {
            provider: self.provider,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
            identity_headers: self.identity_headers,
            recovery: SingleFlight::new(),
        }
    }
}

impl std::fmt::Debug for AuthenticatedFetchBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedFetchBuilder")
            .field("identity_headers", &self.identity_headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider;

    #[async_trait]
    impl CredentialProvider for StaticProvider {
        async fn access_token(&self) -> Result<AccessToken> {
            Ok(AccessToken::new("static"))
        }

        async fn sign_out(&self) -> Result<()> {
            Ok(())
        }
    }

    struct EchoTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for EchoTransport {
        async fn execute(&self, request: Request) -> Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Response::new(
                StatusCode::OK,
                request.headers,
                request.body.unwrap_or_default(),
            ))
        }
    }

    #[tokio::test]
    async fn test_dispatch_composes_bearer_and_identity_headers() {
        let transport = Arc::new(EchoTransport {
            calls: AtomicUsize::new(0),
        });
        let fetch = AuthenticatedFetch::builder(Arc::new(StaticProvider))
            .transport(Arc::clone(&transport) as Arc<dyn HttpTransport>)
            .identity_header(
                HeaderName::from_static("x-client-id"),
                HeaderValue::from_static("portal-web"),
            )
            .build();

        let response = fetch
            .fetch("https://api.example.com/cases", RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("authorization").unwrap(),
            "Bearer static"
        );
        assert_eq!(response.headers().get("x-client-id").unwrap(), "portal-web");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_body_passed_through() {
        let transport = Arc::new(EchoTransport {
            calls: AtomicUsize::new(0),
        });
        let fetch = AuthenticatedFetch::builder(Arc::new(StaticProvider))
            .transport(transport as Arc<dyn HttpTransport>)
            .build();

        let response = fetch
            .fetch(
                "https://api.example.com/cases",
                RequestOptions::post(b"hello".to_vec()),
            )
            .await
            .unwrap();
        assert_eq!(response.body(), b"hello");
    }
}
