//! Transport layer for executing composed requests
//!
//! This module provides the transport abstraction the coordinator dispatches
//! through, plus the request/response types shared between the coordinator
//! and its callers. The production implementation lives in
//! [`http::ReqwestTransport`]; tests substitute their own implementations of
//! [`HttpTransport`].

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{FetchError, Result};

pub use http::ReqwestTransport;

/// A single network call primitive.
///
/// Implementations take a fully-composed request and return the status code
/// plus body, or fail with [`FetchError::Transport`] on network-level
/// failure. Non-2xx statuses are *not* transport errors; they come back as
/// ordinary responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one request attempt.
    ///
    /// # Errors
    ///
    /// [`FetchError::Transport`] for network-level failure (DNS, connection
    /// reset, etc.), [`FetchError::InvalidRequest`] if the request could not
    /// be constructed.
    async fn execute(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn execute(&self, request: Request) -> Result<Response> {
        (**self).execute(request).await
    }
}

/// Type alias for a shared transport.
pub type SharedTransport = Arc<dyn HttpTransport>;

/// One fully-composed HTTP request attempt
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Absolute request URL
    pub url: String,
    /// Complete header set, authorization included
    pub headers: HeaderMap,
    /// Raw request body, if any
    pub body: Option<Vec<u8>>,
}

/// Caller-facing request options: the method/headers/body shape consumed by
/// the underlying transport. Authorization is never set here; the
/// coordinator composes it per attempt.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method (defaults to GET)
    pub method: Method,
    /// Caller-supplied headers, preserved during composition
    pub headers: HeaderMap,
    /// Raw request body, if any
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    /// Options for a GET request
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// Options for a DELETE request
    #[must_use]
    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    /// Options for a POST request with a raw body
    pub fn post(body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::POST,
            headers: HeaderMap::new(),
            body: Some(body.into()),
        }
    }

    /// Options for a PUT request with a raw body
    pub fn put(body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::PUT,
            headers: HeaderMap::new(),
            body: Some(body.into()),
        }
    }

    /// Options carrying `value` serialized as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidRequest`] if serialization fails.
    pub fn json<T: Serialize>(method: Method, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|e| FetchError::invalid_request(format!("JSON body: {e}")))?;
        Ok(Self {
            method,
            headers: HeaderMap::new(),
            body: Some(body),
        })
    }

    /// Add a header, returning the modified options
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Response from one request attempt.
///
/// Carries the status code and raw body; interpreting non-401 error
/// statuses is the caller's concern, not the coordinator's.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    /// Assemble a response from its parts
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone())
            .map_err(|e| FetchError::decode(format!("body is not valid UTF-8: {e}")))
    }

    /// Body deserialized from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] if deserialization fails.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::decode(e.to_string()))
    }
}
