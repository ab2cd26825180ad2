//! HTTP-level tests for the reqwest transport and the full coordinator,
//! exercised against a local mock server rather than scripted mocks.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use authfetch::auth::{AccessToken, CredentialProvider};
use authfetch::transport::{HttpTransport, Request, RequestOptions, ReqwestTransport};
use authfetch::{AuthenticatedFetch, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct QueueProvider {
    tokens: Mutex<VecDeque<AccessToken>>,
    sign_outs: AtomicUsize,
}

impl QueueProvider {
    fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: Mutex::new(tokens.iter().map(|t| AccessToken::new(*t)).collect()),
            sign_outs: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CredentialProvider for QueueProvider {
    async fn access_token(&self) -> Result<AccessToken> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected access_token call"))
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_transport_sends_composed_headers_and_reads_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/updates"))
        .and(header("authorization", "Bearer tok"))
        .and(header("x-client-id", "portal-web"))
        .respond_with(ResponseTemplate::new(200).set_body_string("up to date"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new();
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("authorization"),
        HeaderValue::from_static("Bearer tok"),
    );
    headers.insert(
        HeaderName::from_static("x-client-id"),
        HeaderValue::from_static("portal-web"),
    );

    let response = transport
        .execute(Request {
            method: Method::GET,
            url: format!("{}/updates", server.uri()),
            headers,
            body: None,
        })
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().unwrap(), "up to date");
}

#[tokio::test]
async fn test_error_statuses_are_responses_not_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vulnerabilities"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new();
    let response = transport
        .execute(Request {
            method: Method::GET,
            url: format!("{}/vulnerabilities", server.uri()),
            headers: HeaderMap::new(),
            body: None,
        })
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_full_refresh_cycle_over_http() {
    #[derive(Deserialize)]
    struct Case {
        id: u32,
        subject: String,
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cases/42"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cases/42"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": 42, "subject": "login outage"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(QueueProvider::new(&["stale", "fresh"]));
    let fetch = AuthenticatedFetch::builder(provider.clone())
        .transport(Arc::new(ReqwestTransport::new()))
        .build();

    let response = fetch
        .fetch(format!("{}/cases/42", server.uri()), RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let case: Case = response.json().unwrap();
    assert_eq!(case.id, 42);
    assert_eq!(case.subject, "login outage");
    assert_eq!(provider.sign_outs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_post_json_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cases"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(QueueProvider::new(&["tok"]));
    let fetch = AuthenticatedFetch::builder(provider)
        .transport(Arc::new(ReqwestTransport::new()))
        .build();

    let options = RequestOptions::json(
        Method::POST,
        &serde_json::json!({"subject": "cannot sign in"}),
    )
    .unwrap();
    let response = fetch
        .fetch(format!("{}/cases", server.uri()), options)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}
