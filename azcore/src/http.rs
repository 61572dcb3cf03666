//! HTTP abstractions consumed by the poller
//!
//! Nothing in azcore builds its own transport: every request goes through a
//! [`Sender`], and credentials are attached by an [`Authorizer`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Header carrying the operation-status monitor URL of an ARM async operation
pub const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Transport-level failure while sending a request
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SendError {
    /// Whether sending the same request again could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SendError::Request(e) => !e.is_builder(),
            SendError::Transport(_) | SendError::Status { .. } => true,
            SendError::Authorization(_) | SendError::Encode(_) => false,
        }
    }
}

/// An outgoing request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, SendError> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        Ok(self)
    }
}

/// A fully-read response, tagged with the request that produced it
#[derive(Debug, Clone)]
pub struct Response {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    pub fn new(method: Method, url: Url, status: StatusCode) -> Self {
        Self {
            method,
            url,
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    /// Adds a header; names or values that are not valid header text are
    /// dropped
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }

    /// Delay requested by the server through `Retry-After`
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| parse_retry_after(v, Utc::now()))
    }
}

/// Parses a `Retry-After` value given as delta-seconds or as an HTTP-date.
/// Dates in the past yield a zero delay.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    Some(
        (at.with_timezone(&Utc) - now)
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}

/// Sends a request and reads the whole response
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, SendError>;
}

#[async_trait]
impl Sender for reqwest::Client {
    async fn send(&self, request: Request) -> Result<Response, SendError> {
        let method = request.method.clone();
        let url = request.url.clone();

        let mut builder = self
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(Response {
            method,
            url,
            status,
            headers,
            body,
        })
    }
}

/// Decorates outgoing requests with credentials
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, request: Request) -> Result<Request, SendError>;
}

/// Authorizer for a pre-acquired OAuth access token
#[derive(Clone)]
pub struct BearerAuthorizer {
    token: String,
}

impl BearerAuthorizer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for BearerAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuthorizer")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Authorizer for BearerAuthorizer {
    async fn authorize(&self, request: Request) -> Result<Request, SendError> {
        if self.token.is_empty() {
            return Err(SendError::Authorization(
                "no access token configured".to_string(),
            ));
        }

        let value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| SendError::Authorization(format!("invalid access token: {}", e)))?;

        Ok(request.with_header(AUTHORIZATION, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Server;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn retry_after_accepts_delta_seconds() {
        assert_eq!(
            parse_retry_after("30", Utc::now()),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            parse_retry_after(" 5 ", Utc::now()),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn retry_after_accepts_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 27, 0).unwrap();
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", now),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn retry_after_in_the_past_is_zero() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", now),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn retry_after_rejects_garbage() {
        assert_eq!(parse_retry_after("soon", Utc::now()), None);
        assert_eq!(parse_retry_after("-3", Utc::now()), None);
    }

    #[test]
    fn response_reads_retry_after_header() {
        let response = Response::new(
            Method::GET,
            url("https://management.azure.com/op"),
            StatusCode::ACCEPTED,
        )
        .with_header("retry-after", "7");

        assert_eq!(response.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(response.header("Retry-After"), Some("7"));
    }

    #[test]
    fn response_accepts_mixed_case_header_names() {
        let response = Response::new(
            Method::PUT,
            url("https://management.azure.com/op"),
            StatusCode::ACCEPTED,
        )
        .with_header("Location", "https://management.azure.com/ops/1")
        .with_header("Azure-AsyncOperation", "https://management.azure.com/ops/2")
        .with_header("bad name", "dropped");

        assert_eq!(
            response.header("location"),
            Some("https://management.azure.com/ops/1")
        );
        assert_eq!(
            response.header(AZURE_ASYNC_OPERATION),
            Some("https://management.azure.com/ops/2")
        );
        assert_eq!(response.headers.len(), 2);
    }

    #[test]
    fn only_transport_failures_are_transient() {
        assert!(SendError::Transport("reset".to_string()).is_transient());
        assert!(SendError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!SendError::Authorization("no token".to_string()).is_transient());
    }

    #[test]
    fn response_body_whitespace_is_empty() {
        let response = Response::new(
            Method::GET,
            url("https://management.azure.com/op"),
            StatusCode::OK,
        )
        .with_body("  \n");

        assert!(!response.has_body());
    }

    #[tokio::test]
    async fn bearer_authorizer_sets_header() {
        let authorizer = BearerAuthorizer::new("token-123");
        let request = Request::get(url("https://management.azure.com/"));

        let request = authorizer.authorize(request).await.unwrap();
        assert_eq!(
            request.headers.get(AUTHORIZATION).unwrap(),
            "Bearer token-123"
        );
    }

    #[tokio::test]
    async fn bearer_authorizer_rejects_empty_token() {
        let authorizer = BearerAuthorizer::new("");
        let result = authorizer
            .authorize(Request::get(url("https://management.azure.com/")))
            .await;

        assert!(matches!(result, Err(SendError::Authorization(_))));
    }

    #[test]
    fn bearer_authorizer_debug_hides_token() {
        let rendered = format!("{:?}", BearerAuthorizer::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }

    #[tokio::test]
    async fn reqwest_sender_reads_status_headers_and_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/things/1")
            .match_header("content-type", "application/json; charset=utf-8")
            .match_body(r#"{"name":"one"}"#)
            .with_status(201)
            .with_header("azure-asyncoperation", "https://example.test/ops/1")
            .with_body(r#"{"status":"InProgress"}"#)
            .create_async()
            .await;

        let request = Request::new(Method::PUT, url(&format!("{}/things/1", server.url())))
            .with_json(&serde_json::json!({"name": "one"}))
            .unwrap();

        let response = reqwest::Client::new().send(request).await.unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.method, Method::PUT);
        assert_eq!(
            response.header(AZURE_ASYNC_OPERATION),
            Some("https://example.test/ops/1")
        );
        assert_eq!(response.body, r#"{"status":"InProgress"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reqwest_sender_reports_connection_errors() {
        let result = reqwest::Client::new()
            .send(Request::get(url("http://127.0.0.1:1/unreachable")))
            .await;

        assert!(matches!(result, Err(SendError::Request(_))));
    }
}
