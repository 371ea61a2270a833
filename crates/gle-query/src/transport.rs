//! HTTP transport used by every query component.
//!
//! Components never build requests themselves; they receive a [`Transport`]
//! that already carries the account credential. The production
//! implementation is [`ReqwestTransport`].

use std::future::Future;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::trace;

use crate::config::ClientConfig;
use crate::error::{QueryError, Result};

/// Header carrying the account API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Unparsed response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response from a status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Authenticated HTTP access to the log service.
///
/// This trait allows for testing with fake implementations.
pub trait Transport: Send + Sync {
    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Transport`] if the request cannot be completed.
    /// A non-success status is not an error at this level.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse>> + Send;

    /// Issue a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Transport`] if the request cannot be completed.
    fn post_json(&self, url: &str, body: Vec<u8>)
    -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Builds a transport that sends `api_key` with every request.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] if the key is empty or not a valid
    /// header value, or [`QueryError::Transport`] if the client cannot be
    /// built.
    pub fn new(api_key: &str, config: &ClientConfig) -> Result<Self> {
        if api_key.is_empty() {
            return Err(QueryError::config("api key cannot be empty"));
        }

        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| QueryError::config("api key contains invalid header characters"))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("gle/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        trace!(status, bytes = body.len(), "Received response");
        Ok(HttpResponse { status, body })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        trace!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        Self::read(response).await
    }

    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse> {
        trace!(url = %url, bytes = body.len(), "POST");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        Self::read(response).await
    }
}

/// A request seen by [`FakeTransport`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Vec<u8>>,
    pub at: tokio::time::Instant,
}

/// Fake transport for testing: replays scripted responses in order and
/// records every request.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    responses: std::sync::Mutex<std::collections::VecDeque<HttpResponse>>,
    requests: std::sync::Mutex<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a JSON body.
    #[must_use]
    pub fn respond(self, status: u16, body: serde_json::Value) -> Self {
        self.respond_raw(status, body.to_string())
    }

    /// Queue a response with an arbitrary body.
    #[must_use]
    pub fn respond_raw(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .lock()
            .expect("lock")
            .push_back(HttpResponse::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock").clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }

    fn next(&self, method: &'static str, url: &str, body: Option<Vec<u8>>) -> Result<HttpResponse> {
        self.requests.lock().expect("lock").push(RecordedRequest {
            method,
            url: url.to_string(),
            body,
            at: tokio::time::Instant::now(),
        });
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| QueryError::transport(format!("no scripted response for {method} {url}")))
    }
}

#[cfg(test)]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.next("GET", url, None)
    }

    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse> {
        self.next("POST", url, Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_transport_rejects_empty_key() {
        let err = ReqwestTransport::new("", &ClientConfig::default()).expect_err("should reject");
        assert!(err.to_string().contains("api key cannot be empty"));
    }

    #[test]
    fn test_reqwest_transport_rejects_newline_in_key() {
        let err = ReqwestTransport::new("abc\ndef", &ClientConfig::default())
            .expect_err("should reject");
        assert!(matches!(err, QueryError::Config { .. }));
    }

    #[test]
    fn test_reqwest_transport_debug_hides_key() {
        let transport =
            ReqwestTransport::new("secret-key", &ClientConfig::default()).expect("should build");
        let debug = format!("{transport:?}");
        assert!(!debug.contains("secret-key"));
    }

    #[tokio::test]
    async fn test_fake_transport_replays_in_order() {
        let fake = FakeTransport::new()
            .respond(200, serde_json::json!({"a": 1}))
            .respond_raw(500, "boom");

        let first = fake.get("http://x/1").await.expect("scripted");
        let second = fake.post_json("http://x/2", b"{}".to_vec()).await.expect("scripted");
        assert_eq!(first.status, 200);
        assert_eq!(second, HttpResponse::new(500, "boom"));

        assert!(fake.get("http://x/3").await.is_err());
        assert_eq!(fake.count("GET"), 2);
        assert_eq!(fake.count("POST"), 1);
        assert_eq!(fake.requests()[1].body.as_deref(), Some(&b"{}"[..]));
    }
}
