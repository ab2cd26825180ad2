//! # authfetch
//!
//! Authenticated-fetch coordinator for the support portal's REST clients.
//! Async/await, strong typing, tokio-based.
//!
//! The crate does one job well: it attaches bearer credentials to outgoing
//! requests, detects expired sessions, recovers them without user-visible
//! disruption, and deduplicates concurrent refresh/recovery attempts so
//! that many simultaneous requests issued by independent callers share a
//! single token refresh instead of racing each other into sign-out.
//!
//! ## Quick Start
//!
//! Implement [`CredentialProvider`] over your identity-provider SDK, then
//! share one [`AuthenticatedFetch`] across all call sites:
//!
//! ```no_run
//! use authfetch::auth::{AccessToken, CredentialProvider};
//! use authfetch::{AuthenticatedFetch, RequestOptions, Result};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct IdpSession;
//!
//! #[async_trait]
//! impl CredentialProvider for IdpSession {
//!     async fn access_token(&self) -> Result<AccessToken> {
//!         Ok(AccessToken::new("token-from-idp"))
//!     }
//!
//!     async fn sign_out(&self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     async fn sign_in_silently(&self) -> Result<bool> {
//!         // Hidden-iframe re-authentication, renewal cookie, etc.
//!         Ok(false)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let fetch = Arc::new(AuthenticatedFetch::new(Arc::new(IdpSession)));
//!
//!     let response = fetch
//!         .fetch("https://api.example.com/cases", RequestOptions::get())
//!         .await?;
//!
//!     println!("status: {}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Request lifecycle
//!
//! Per logical call the coordinator acquires a token, dispatches the
//! request, and on a 401 performs one shared refresh followed by exactly
//! one retry. Non-401 statuses (403, 500, ...) are returned as-is; they are
//! the caller's concern. Every terminal failure that stems from an
//! authentication problem signs the session out first, so UI layers can
//! react to the sign-out itself (e.g. redirect to login).
//!
//! ## Single-flight guarantees
//!
//! Recovery operations are deduplicated per kind ([`RecoveryKind`]):
//! when N concurrent calls need the same recovery, the underlying provider
//! operation runs exactly once and all N observe its single outcome. The
//! bookkeeping slot clears the instant an operation settles, so a
//! subsequent call always starts a fresh attempt. State is instance-scoped;
//! independent coordinators never interfere.
//!
//! ## Architecture
//!
//! - [`auth`]: token type and the credential-provider boundary
//! - [`headers`]: pure header composition
//! - [`singleflight`]: keyed concurrent-operation deduplication
//! - [`transport`]: transport trait, request/response types, reqwest impl
//! - [`fetch`]: the orchestrating state machine
//! - [`error`]: closed error taxonomy
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for
//! structured logging. Events are always emitted but are zero-cost when no
//! subscriber is attached. To see logs, attach a subscriber in your
//! application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, FetchError>`](Result). The
//! five authentication-relevant kinds are distinguishable without string
//! matching:
//!
//! ```no_run
//! # use authfetch::FetchError;
//! # fn handle(err: FetchError) {
//! match err {
//!     FetchError::UnauthorizedAfterRefresh { url } => {
//!         eprintln!("session invalid, was fetching {url}");
//!     }
//!     FetchError::Transport(msg) => {
//!         eprintln!("network trouble: {msg}");
//!     }
//!     other => eprintln!("error: {other}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod error;
pub mod fetch;
pub mod headers;
pub mod singleflight;
pub mod transport;

// Re-export commonly used types
pub use auth::{AccessToken, CredentialProvider, SharedCredentialProvider};
pub use error::{FetchError, Result};
pub use fetch::{AuthenticatedFetch, AuthenticatedFetchBuilder, RecoveryKind};
pub use headers::compose_headers;
pub use singleflight::SingleFlight;
pub use transport::{
    HttpTransport, Request, RequestOptions, ReqwestTransport, Response, SharedTransport,
};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
