use async_trait::async_trait;
use azcore::{
    wait_for_completion, AsyncOperation, Authorizer, Context, OperationError, PollingPolicy,
    Request, ResourceIdentifier, Response, SendError, Sender,
};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::common::{ApiErrorResponse, ApiListResponse, ApiQueryParams, ArmResource};
use super::error::ApiError;
use crate::config::ProviderConfig;

const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

/// Azure Resource Manager API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    subscription_id: String,
    authorizer: Arc<dyn Authorizer>,
    retry_config: RetryConfig,
    polling_policy: PollingPolicy,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl RetryConfig {
    fn backoff(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let exponential = std::cmp::min(
            self.initial_backoff_ms
                .saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1))),
            self.max_backoff_ms,
        );
        let requested = retry_after.map_or(0, |d| d.as_millis() as u64);
        Duration::from_millis(exponential.max(requested).min(self.max_backoff_ms))
    }
}

/// Outcome of submitting a mutating request
#[derive(Debug)]
pub enum Submitted<T> {
    /// The service finished the work synchronously
    Completed(T),
    /// The service accepted the work; poll the operation to completion
    Pending(AsyncOperation<T>),
}

impl<T: DeserializeOwned> Submitted<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Submitted::Pending(_))
    }

    pub fn into_operation(self) -> Option<AsyncOperation<T>> {
        match self {
            Submitted::Pending(operation) => Some(operation),
            Submitted::Completed(_) => None,
        }
    }

    /// Waits for the result using the client's polling policy
    pub async fn wait(self, client: &Client, ctx: &Context) -> Result<T, ApiError> {
        match self {
            Submitted::Completed(value) => Ok(value),
            Submitted::Pending(mut operation) => {
                Ok(wait_for_completion(&mut operation, ctx, client, client.polling_policy()).await?)
            }
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(
        endpoint: &str,
        subscription_id: &str,
        authorizer: impl Authorizer + 'static,
    ) -> Result<Self, ApiError> {
        Self::with_config(
            endpoint,
            subscription_id,
            Arc::new(authorizer),
            RetryConfig::default(),
            PollingPolicy::default(),
        )
    }

    /// Create a new API client with custom retry and polling configuration
    pub fn with_config(
        endpoint: &str,
        subscription_id: &str,
        authorizer: Arc<dyn Authorizer>,
        retry_config: RetryConfig,
        polling_policy: PollingPolicy,
    ) -> Result<Self, ApiError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|source| ApiError::InvalidUrl {
            url: endpoint.to_string(),
            source,
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(SendError::from)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                subscription_id: subscription_id.to_string(),
                authorizer,
                retry_config,
                polling_policy,
            }),
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ApiError> {
        Self::with_config(
            &config.endpoint,
            &config.subscription_id,
            Arc::new(config.authorizer()),
            config.retry_config(),
            config.polling_policy(),
        )
    }

    pub fn subscription_id(&self) -> &str {
        &self.inner.subscription_id
    }

    pub fn polling_policy(&self) -> &PollingPolicy {
        &self.inner.polling_policy
    }

    /// Domain Services API operations
    pub fn domain_services(&self) -> crate::api::domain_services::DomainServicesApi<'_> {
        crate::api::domain_services::DomainServicesApi::new(self)
    }

    /// Automation API operations
    pub fn automation(&self) -> crate::api::automation::AutomationApi<'_> {
        crate::api::automation::AutomationApi::new(self)
    }

    /// Absolute URL for a resource path
    pub fn url(&self, path: &str, params: &ApiQueryParams) -> Result<Url, ApiError> {
        let raw = format!("{}{}{}", self.inner.base_url, path, params.to_query_string());
        Url::parse(&raw).map_err(|source| ApiError::InvalidUrl { url: raw, source })
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let url = self.url(path, params)?;
        let response = self.send_checked(Request::get(url)).await?;
        self.parse_success_response(&response)
    }

    /// Like [`Client::get`], but a missing resource is `None`
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<Option<T>, ApiError> {
        match self.get(path, params).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Reads every page of a collection, following `nextLink`
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut next = Some(self.url(path, params)?);

        while let Some(url) = next.take() {
            let response = self.send_checked(Request::get(url)).await?;
            let page: ApiListResponse<T> = self.parse_success_response(&response)?;
            items.extend(page.value);

            if let Some(link) = page.next_link.filter(|l| !l.is_empty()) {
                next = Some(response.url.join(&link).map_err(|source| {
                    ApiError::InvalidUrl {
                        url: link.clone(),
                        source,
                    }
                })?);
            }
        }

        Ok(items)
    }

    /// Submit a PUT/PATCH/POST/DELETE that may complete asynchronously
    pub async fn begin<T, B>(
        &self,
        method: Method,
        path: &str,
        params: &ApiQueryParams,
        body: Option<&B>,
    ) -> Result<Submitted<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path, params)?;
        let mut request = Request::new(method.clone(), url);
        if let Some(body) = body {
            request = request.with_json(body)?;
        }

        let response = self
            .execute_with_retry(request)
            .await
            .map_err(|e| self.send_error(e))?;

        if matches!(
            response.status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(ApiError::AuthError(response.body));
        }

        match AsyncOperation::from_response(response.clone()) {
            Ok(mut operation) if operation.status().is_terminal() => {
                tracing::debug!(
                    "{} {} finished with {} on submission",
                    method,
                    path,
                    operation.status()
                );
                let value = operation.result(&Context::new(), self).await?;
                Ok(Submitted::Completed(value))
            }
            Ok(operation) => Ok(Submitted::Pending(operation)),
            Err(OperationError::NotAsync { status }) => {
                tracing::debug!("{} {} completed synchronously (HTTP {})", method, path, status);
                if method == Method::DELETE {
                    return self.decode("null").map(Submitted::Completed);
                }
                self.parse_success_response(&response)
                    .map(Submitted::Completed)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read a typed resource; `None` when it does not exist
    pub async fn read<R: ArmResource>(&self, id: &R::Id) -> Result<Option<R>, ApiError> {
        self.get_optional(&id.id(), &ApiQueryParams::api_version(R::API_VERSION))
            .await
    }

    /// Create or replace a typed resource
    pub async fn put_resource<R: ArmResource + Sync>(
        &self,
        id: &R::Id,
        resource: &R,
    ) -> Result<Submitted<R>, ApiError> {
        self.begin(
            Method::PUT,
            &id.id(),
            &ApiQueryParams::api_version(R::API_VERSION),
            Some(resource),
        )
        .await
    }

    /// Delete a typed resource
    pub async fn delete_resource<R: ArmResource>(
        &self,
        id: &R::Id,
    ) -> Result<Submitted<()>, ApiError> {
        self.begin::<(), ()>(
            Method::DELETE,
            &id.id(),
            &ApiQueryParams::api_version(R::API_VERSION),
            None,
        )
        .await
    }

    /// Send with authorization and retry, then map error statuses
    async fn send_checked(&self, request: Request) -> Result<Response, ApiError> {
        let response = self
            .execute_with_retry(request)
            .await
            .map_err(|e| self.send_error(e))?;

        if response.status.is_success() {
            return Ok(response);
        }

        self.handle_error_response(response)
    }

    /// Execute request with retry logic
    async fn execute_with_retry(&self, request: Request) -> Result<Response, SendError> {
        let mut request = self.inner.authorizer.authorize(request).await?;
        let request_id = uuid::Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            request
                .headers
                .insert(HeaderName::from_static(CLIENT_REQUEST_ID), value);
        }

        let retry = &self.inner.retry_config;
        let mut attempt = 0;

        loop {
            tracing::debug!(
                request_id = %request_id,
                "{} request to: {} (attempt {})",
                request.method,
                request.url,
                attempt
            );

            let outcome = self.inner.http_client.send(request.clone()).await;
            let retry_after = match &outcome {
                Ok(response)
                    if response.status == StatusCode::TOO_MANY_REQUESTS
                        || response.status.is_server_error() =>
                {
                    Some(response.retry_after())
                }
                Err(SendError::Request(e)) if e.is_timeout() || e.is_connect() => Some(None),
                _ => None,
            };

            match retry_after {
                Some(requested) if attempt < retry.max_retries => {
                    attempt += 1;
                    let backoff = retry.backoff(attempt, requested);
                    tracing::warn!(
                        request_id = %request_id,
                        "Retrying request to {} after {}ms (attempt {})",
                        request.url,
                        backoff.as_millis(),
                        attempt
                    );
                    tokio::time::sleep(backoff).await;
                }
                _ => return outcome,
            }
        }
    }

    fn send_error(&self, err: SendError) -> ApiError {
        match err {
            SendError::Request(e) if e.is_timeout() => {
                ApiError::Timeout(self.inner.retry_config.timeout_seconds)
            }
            other => ApiError::RequestError(other),
        }
    }

    fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: &Response,
    ) -> Result<T, ApiError> {
        tracing::debug!("API response body: {}", response.body);
        if response.status == StatusCode::NO_CONTENT || !response.has_body() {
            return self.decode("null");
        }
        self.decode(&response.body)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ApiError> {
        serde_json::from_str::<T>(text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    fn handle_error_response<T>(&self, response: Response) -> Result<T, ApiError> {
        let status = response.status;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::AuthError(response.body));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }
        if status.is_server_error() {
            return Err(ApiError::ServiceUnavailable);
        }

        let details = serde_json::from_str::<ApiErrorResponse>(&response.body)
            .ok()
            .map(|envelope| Box::new(envelope.error));

        let message = match &details {
            Some(details) if !details.message.is_empty() => details.to_string(),
            _ if response.has_body() => response.body.clone(),
            _ => status.to_string(),
        };

        Err(ApiError::ApiError {
            status: status.as_u16(),
            message,
            details,
        })
    }
}

/// Polling through the client picks up authorization, request ids and retries
#[async_trait]
impl Sender for Client {
    async fn send(&self, request: Request) -> Result<Response, SendError> {
        self.execute_with_retry(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{create_test_client, SUBSCRIPTION_ID};
    use azcore::{BearerAuthorizer, OperationStatus};
    use mockito::{Matcher, Server};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        name: String,
    }

    #[test]
    fn retry_backoff_doubles_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff(1, None), Duration::from_millis(100));
        assert_eq!(config.backoff(2, None), Duration::from_millis(200));
        assert_eq!(config.backoff(3, None), Duration::from_millis(400));
        assert_eq!(config.backoff(20, None), Duration::from_millis(10000));
        assert_eq!(
            config.backoff(1, Some(Duration::from_secs(2))),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let result = Client::new("not a url", SUBSCRIPTION_ID, BearerAuthorizer::new("t"));
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn get_sends_auth_and_request_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/things/a")
            .match_query(Matcher::UrlEncoded("api-version".into(), "2020-01-01".into()))
            .match_header("authorization", "Bearer test-token")
            .match_header(CLIENT_REQUEST_ID, Matcher::Regex("^[0-9a-f-]{36}$".into()))
            .with_body(r#"{"name":"a"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let thing: Thing = client
            .get("/things/a", &ApiQueryParams::api_version("2020-01-01"))
            .await
            .unwrap();

        assert_eq!(thing.name, "a");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn strips_trailing_slash_from_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/things/a")
            .with_body(r#"{"name":"a"}"#)
            .create_async()
            .await;

        let client = create_test_client(&format!("{}/", server.url()));
        let _: Thing = client.get("/things/a", &ApiQueryParams::new()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("GET", "/things/a")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let ok = server
            .mock("GET", "/things/a")
            .with_body(r#"{"name":"a"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let thing: Thing = client.get("/things/a", &ApiQueryParams::new()).await.unwrap();

        assert_eq!(thing.name, "a");
        failing.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/things/a")
            .with_status(500)
            .expect(4)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result = client.get::<Thing>("/things/a", &ApiQueryParams::new()).await;

        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn maps_error_envelope() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/things/a")
            .with_status(400)
            .with_body(r#"{"error":{"code":"InvalidApiVersionParameter","message":"bad version"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client
            .get::<Thing>("/things/a", &ApiQueryParams::new())
            .await
            .unwrap_err();

        match err {
            ApiError::ApiError {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "InvalidApiVersionParameter: bad version");
                assert_eq!(details.unwrap().code, "InvalidApiVersionParameter");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unauthorized_is_auth_error_without_retry() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/things/a")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result = client.get::<Thing>("/things/a", &ApiQueryParams::new()).await;

        assert!(matches!(result, Err(ApiError::AuthError(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_optional_maps_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/things/missing")
            .with_status(404)
            .with_body(r#"{"error":{"code":"ResourceNotFound","message":"gone"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let result: Option<Thing> = client
            .get_optional("/things/missing", &ApiQueryParams::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn list_follows_next_link() {
        let mut server = Server::new_async().await;
        let next = format!("{}/things?page=2", server.url());
        let first = server
            .mock("GET", "/things")
            .match_query(Matcher::Missing)
            .with_body(format!(
                r#"{{"value":[{{"name":"a"}}],"nextLink":"{}"}}"#,
                next
            ))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/things")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(r#"{"value":[{"name":"b"}]}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let things: Vec<Thing> = client.list("/things", &ApiQueryParams::new()).await.unwrap();

        assert_eq!(
            things.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn begin_returns_pending_operation() {
        let mut server = Server::new_async().await;
        let operation_url = format!("{}/operations/1", server.url());
        let _mock = server
            .mock("PUT", "/things/a")
            .match_body(Matcher::Json(serde_json::json!({"name": "a"})))
            .with_status(201)
            .with_header("azure-asyncoperation", &operation_url)
            .with_body(r#"{"name":"a"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let submitted: Submitted<Thing> = client
            .begin(
                Method::PUT,
                "/things/a",
                &ApiQueryParams::new(),
                Some(&serde_json::json!({"name": "a"})),
            )
            .await
            .unwrap();

        let operation = submitted.into_operation().unwrap();
        assert_eq!(operation.polling_url().as_str(), operation_url);
        assert_eq!(operation.status(), OperationStatus::Accepted);
    }

    #[tokio::test]
    async fn begin_synchronous_put_completes() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/things/a")
            .with_status(200)
            .with_body(r#"{"name":"a"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let submitted: Submitted<Thing> = client
            .begin(Method::PUT, "/things/a", &ApiQueryParams::new(), Some(&()))
            .await
            .unwrap();

        assert!(!submitted.is_pending());
        let thing = submitted.wait(&client, &Context::new()).await.unwrap();
        assert_eq!(thing.name, "a");
    }

    #[tokio::test]
    async fn begin_completes_when_resource_is_already_provisioned() {
        let mut server = Server::new_async().await;
        let _put = server
            .mock("PUT", "/things/a")
            .with_status(200)
            .with_body(r#"{"name":"a","properties":{"provisioningState":"Succeeded"}}"#)
            .create_async()
            .await;
        let get = server
            .mock("GET", "/things/a")
            .expect(0)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let submitted: Submitted<Thing> = client
            .begin(Method::PUT, "/things/a", &ApiQueryParams::new(), Some(&()))
            .await
            .unwrap();

        match submitted {
            Submitted::Completed(thing) => assert_eq!(thing.name, "a"),
            Submitted::Pending(_) => panic!("provisioned resource reported as pending"),
        }
        get.assert_async().await;
    }

    #[tokio::test]
    async fn begin_still_provisioning_is_pending() {
        let mut server = Server::new_async().await;
        let _put = server
            .mock("PUT", "/things/a")
            .with_status(201)
            .with_body(r#"{"name":"a","properties":{"provisioningState":"Creating"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let submitted: Submitted<Thing> = client
            .begin(Method::PUT, "/things/a", &ApiQueryParams::new(), Some(&()))
            .await
            .unwrap();

        assert!(submitted.is_pending());
    }

    #[tokio::test]
    async fn begin_reports_timeouts_like_reads() {
        let mut server = Server::new_async().await;
        let _put = server
            .mock("PUT", "/things/slow")
            .with_chunked_body(|_| {
                std::thread::sleep(Duration::from_millis(1500));
                Ok(())
            })
            .create_async()
            .await;

        let client = Client::with_config(
            &server.url(),
            SUBSCRIPTION_ID,
            Arc::new(BearerAuthorizer::new("t")),
            RetryConfig {
                max_retries: 0,
                initial_backoff_ms: 1,
                max_backoff_ms: 1,
                timeout_seconds: 1,
            },
            PollingPolicy::default(),
        )
        .unwrap();

        let err = client
            .begin::<Thing, _>(Method::PUT, "/things/slow", &ApiQueryParams::new(), Some(&()))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Timeout(1)), "got {:?}", err);
    }

    #[tokio::test]
    async fn begin_surfaces_initial_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/things/a")
            .with_status(409)
            .with_body(r#"{"error":{"code":"Conflict","message":"busy"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client
            .begin::<Thing, _>(Method::PUT, "/things/a", &ApiQueryParams::new(), Some(&()))
            .await
            .unwrap_err();

        match err {
            ApiError::Operation(OperationError::OperationFailed { error, .. }) => {
                assert_eq!(error.status, 409);
                assert_eq!(error.code.as_deref(), Some("Conflict"));
            }
            other => panic!("expected OperationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn polling_goes_through_the_client() {
        let mut server = Server::new_async().await;
        let poll = server
            .mock("GET", "/operations/1")
            .match_header("authorization", "Bearer test-token")
            .match_header(CLIENT_REQUEST_ID, Matcher::Any)
            .with_body(r#"{"status":"Succeeded"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let initial = Response::new(
            Method::DELETE,
            client.url("/things/a", &ApiQueryParams::new()).unwrap(),
            StatusCode::ACCEPTED,
        )
        .with_header("azure-asyncoperation", &format!("{}/operations/1", server.url()));

        let mut operation = AsyncOperation::<()>::from_response(initial).unwrap();
        assert!(operation.done(&Context::new(), &client).await.unwrap());
        assert_eq!(operation.status(), OperationStatus::Succeeded);
        poll.assert_async().await;
    }
}
