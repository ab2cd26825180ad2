//! Credential types and the identity-provider boundary
//!
//! # Overview
//!
//! The coordinator consumes the identity provider as a black box through
//! the [`CredentialProvider`] trait:
//!
//! 1. [`CredentialProvider::access_token`] resolves the current bearer
//!    token, failing with a classified not-authenticated condition when no
//!    session exists
//! 2. [`CredentialProvider::sign_in_silently`] optionally re-establishes a
//!    session without user interaction
//! 3. [`CredentialProvider::sign_out`] terminates the session, best-effort
//!
//! Tokens are opaque [`AccessToken`] values with externally-managed expiry;
//! this crate never caches them itself.

mod provider;
mod token;

pub use provider::{CredentialProvider, SharedCredentialProvider};
pub use token::AccessToken;
