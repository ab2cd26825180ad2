//! Opaque bearer token type

use std::fmt;

/// An opaque bearer credential with externally-managed expiry.
///
/// The coordinator never caches tokens beyond a single request attempt;
/// every logical call re-acquires the token from the credential provider,
/// which is expected to serve a cached value until expiry and refresh
/// internally when possible. Keeping a second cache here would create two
/// racing sources of truth.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `Authorization` header value for this token
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl From<String> for AccessToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for AccessToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

// Tokens are credentials; keep them out of logs and panic messages.
// The preview truncates on character boundaries so formatting can never
// panic on multibyte token content.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > 12 {
            let preview: String = self.0.chars().take(8).collect();
            write!(f, "AccessToken({preview}...)")
        } else {
            write!(f, "AccessToken(...)")
        }
    }
}
