//! Production transport backed by `reqwest`

use async_trait::async_trait;

use super::{HttpTransport, Request, Response};
use crate::error::{FetchError, Result};

/// [`HttpTransport`] implementation over a shared [`reqwest::Client`]
/// connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport over an existing client (shared pool, custom TLS
    /// or proxy configuration)
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify_reqwest_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(format!("reading body: {e}")))?
            .to_vec();

        Ok(Response::new(status, headers, body))
    }
}

fn classify_reqwest_error(error: reqwest::Error) -> FetchError {
    if error.is_builder() {
        FetchError::invalid_request(error.to_string())
    } else {
        FetchError::transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use reqwest::header::HeaderMap;

    #[tokio::test]
    async fn test_malformed_url_is_invalid_request() {
        let transport = ReqwestTransport::new();
        let request = Request {
            method: Method::GET,
            url: "not a url".to_string(),
            headers: HeaderMap::new(),
            body: None,
        };

        let err = transport.execute(request).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new();
        let request = Request {
            method: Method::GET,
            // Reserved TLD, guaranteed not to resolve.
            url: "http://unreachable.invalid/".to_string(),
            headers: HeaderMap::new(),
            body: None,
        };

        let err = transport.execute(request).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
