//! Header composition for authenticated requests
//!
//! Pure functions: the same token and inputs always yield the same header
//! set, and nothing here performs I/O.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::auth::AccessToken;
use crate::error::{FetchError, Result};

/// Compose the full header set for one request attempt.
///
/// Caller-supplied headers are preserved as-is, with two exceptions:
///
/// - the `Authorization` header is always replaced with the bearer value
///   derived from `token` (the composed value wins on collision)
/// - `Content-Type` defaults to `application/json` when absent
///
/// Auxiliary identity headers mandated by the backend (`identity_headers`)
/// are filled in only where the caller has not already set them.
///
/// # Errors
///
/// Returns [`FetchError::InvalidRequest`] if the token contains bytes that
/// are not valid in an HTTP header value.
pub fn compose_headers(
    token: &AccessToken,
    request_headers: &HeaderMap,
    identity_headers: &HeaderMap,
) -> Result<HeaderMap> {
    let mut headers = request_headers.clone();

    let bearer = HeaderValue::from_str(&token.authorization_header())
        .map_err(|_| FetchError::invalid_request("token is not a valid header value"))?;
    headers.insert(AUTHORIZATION, bearer);

    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    for (name, value) in identity_headers {
        if !headers.contains_key(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    Ok(headers)
}
