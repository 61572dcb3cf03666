//! Long-running operation tracking
//!
//! An ARM call that cannot finish synchronously answers with `201`/`202` and
//! a URL to poll. [`AsyncOperation`] records where to poll and what the last
//! poll said; it advances only when the caller invokes [`AsyncOperation::done`]
//! and never sleeps or loops on its own. [`wait_for_completion`] is the
//! stock driver for callers that just want the result.

mod wait;

pub use wait::{wait_for_completion, PollingPolicy};

use reqwest::header::LOCATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

use crate::context::Context;
use crate::error::{OperationError, ServiceError};
use crate::http::{Request, Response, SendError, Sender, AZURE_ASYNC_OPERATION};

/// Non-terminal `status`/`provisioningState` values used across ARM
const IN_PROGRESS_STATES: &[&str] = &[
    "Accepted",
    "InProgress",
    "Running",
    "NotStarted",
    "Creating",
    "Updating",
    "Deleting",
    "Provisioning",
    "Migrating",
];

/// Where an operation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Accepted,
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OperationStatus::Succeeded | OperationStatus::Failed | OperationStatus::Canceled
        )
    }

    /// Maps a `status`/`provisioningState` value. Anything that is not a
    /// terminal value counts as in progress.
    pub fn from_wire(value: &str) -> Self {
        Self::recognize(value).unwrap_or(OperationStatus::InProgress)
    }

    /// Like [`OperationStatus::from_wire`], but `None` for values ARM does
    /// not use to describe an operation
    pub fn recognize(value: &str) -> Option<Self> {
        let value = value.trim();
        let is = |name: &str| value.eq_ignore_ascii_case(name);

        if is("succeeded") {
            Some(OperationStatus::Succeeded)
        } else if is("failed") {
            Some(OperationStatus::Failed)
        } else if is("canceled") || is("cancelled") {
            Some(OperationStatus::Canceled)
        } else if IN_PROGRESS_STATES.iter().any(|state| is(state)) {
            Some(OperationStatus::InProgress)
        } else {
            None
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationStatus::Accepted => "Accepted",
            OperationStatus::InProgress => "InProgress",
            OperationStatus::Succeeded => "Succeeded",
            OperationStatus::Failed => "Failed",
            OperationStatus::Canceled => "Canceled",
        };
        f.write_str(name)
    }
}

/// How the polling URL was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollingMethod {
    /// `Azure-AsyncOperation` header: polls an operation-status document
    AsyncOperation,
    /// `Location` header: `202` until done, then the result itself
    Location,
    /// No header: the resource is polled for its `provisioningState`
    Resource,
}

/// The resumable part of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingState {
    pub method: String,
    pub polling_url: String,
    pub polling_method: PollingMethod,
    pub final_url: Option<String>,
    pub status: OperationStatus,
    pub error: Option<ServiceError>,
}

/// An accepted ARM operation whose outcome decodes into `T`
#[derive(Debug)]
pub struct AsyncOperation<T> {
    state: PollingState,
    polling_url: Url,
    last_response: Option<Response>,
    result_response: Option<Response>,
    _result: PhantomData<fn() -> T>,
}

#[derive(Deserialize)]
struct StatusBody {
    status: Option<String>,
    properties: Option<StatusProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusProperties {
    provisioning_state: Option<String>,
}

/// Reads `status`, falling back to `properties.provisioningState`
fn body_status(body: &str) -> Option<String> {
    let parsed: StatusBody = serde_json::from_str(body).ok()?;
    parsed
        .status
        .or_else(|| parsed.properties.and_then(|p| p.provisioning_state))
}

fn resolve(base: &Url, location: &str) -> Result<Url, OperationError> {
    base.join(location).map_err(|source| OperationError::InvalidUrl {
        url: location.to_string(),
        source,
    })
}

impl<T> AsyncOperation<T> {
    /// Starts tracking the operation announced by `initial`
    pub fn from_response(initial: Response) -> Result<Self, OperationError> {
        let status = initial.status;

        if status.is_client_error() || status.is_server_error() {
            return Err(OperationError::OperationFailed {
                status: OperationStatus::Failed,
                error: ServiceError::from_response(&initial),
            });
        }

        let async_header = initial.header(AZURE_ASYNC_OPERATION);
        let location_header = initial.header(LOCATION.as_str());

        let (polling_method, polling_url) = if let Some(url) = async_header {
            (PollingMethod::AsyncOperation, resolve(&initial.url, url)?)
        } else if let Some(url) = location_header {
            (PollingMethod::Location, resolve(&initial.url, url)?)
        } else if matches!(initial.method, Method::PUT | Method::PATCH)
            && matches!(status, StatusCode::OK | StatusCode::CREATED)
            && body_status(&initial.body).is_some()
        {
            (PollingMethod::Resource, initial.url.clone())
        } else {
            return Err(OperationError::NotAsync {
                status: status.as_u16(),
            });
        };

        let final_url = match initial.method {
            Method::PUT | Method::PATCH => Some(initial.url.to_string()),
            _ if polling_method == PollingMethod::AsyncOperation => location_header
                .map(|location| resolve(&initial.url, location))
                .transpose()?
                .map(|url| url.to_string()),
            _ => None,
        };

        // a resource that answers without async headers may already be done
        let reported = match polling_method {
            PollingMethod::Resource => body_status(&initial.body)
                .map(|s| OperationStatus::from_wire(&s))
                .filter(|s| s.is_terminal()),
            _ => None,
        };
        let error = match reported {
            Some(OperationStatus::Failed | OperationStatus::Canceled) => {
                Some(ServiceError::from_response(&initial))
            }
            _ => None,
        };

        tracing::debug!(
            method = %initial.method,
            url = %initial.url,
            polling_url = %polling_url,
            ?polling_method,
            ?reported,
            "accepted long-running operation"
        );

        Ok(Self {
            state: PollingState {
                method: initial.method.to_string(),
                polling_url: polling_url.to_string(),
                polling_method,
                final_url,
                status: reported.unwrap_or(OperationStatus::Accepted),
                error,
            },
            polling_url,
            last_response: Some(initial),
            result_response: None,
            _result: PhantomData,
        })
    }

    /// Rebuilds an operation from a previously saved [`PollingState`]
    pub fn resume(state: PollingState) -> Result<Self, OperationError> {
        let polling_url =
            Url::parse(&state.polling_url).map_err(|source| OperationError::InvalidUrl {
                url: state.polling_url.clone(),
                source,
            })?;

        Ok(Self {
            state,
            polling_url,
            last_response: None,
            result_response: None,
            _result: PhantomData,
        })
    }

    pub fn state(&self) -> &PollingState {
        &self.state
    }

    pub fn status(&self) -> OperationStatus {
        self.state.status
    }

    pub fn polling_url(&self) -> &Url {
        &self.polling_url
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// Delay the service asked for before the next poll
    pub fn polling_delay(&self) -> Option<Duration> {
        self.last_response.as_ref().and_then(Response::retry_after)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.state.method, self.polling_url)
    }

    /// Polls once. Returns `true` once the operation is terminal, including
    /// when it failed or was canceled.
    pub async fn done<S>(&mut self, ctx: &Context, sender: &S) -> Result<bool, OperationError>
    where
        S: Sender + ?Sized,
    {
        if self.state.status.is_terminal() {
            return Ok(true);
        }

        if let Some(reason) = ctx.interrupted() {
            return Err(reason.into());
        }

        tracing::debug!(url = %self.polling_url, status = %self.state.status, "polling operation");

        let response = sender.send(Request::get(self.polling_url.clone())).await?;
        let code = response.status;

        if code == StatusCode::TOO_MANY_REQUESTS || code.is_server_error() {
            tracing::warn!(url = %self.polling_url, status = %code, "transient polling failure");
            let err = SendError::Status {
                status: code.as_u16(),
                body: response.body.clone(),
            };
            self.last_response = Some(response);
            return Err(OperationError::Poll(err));
        }

        let next = self.status_of(&response);

        if !next.is_terminal() {
            self.follow_headers(&response)?;
        }

        if matches!(next, OperationStatus::Failed | OperationStatus::Canceled) {
            self.state.error = Some(ServiceError::from_response(&response));
        }

        if next != self.state.status {
            tracing::debug!(from = %self.state.status, to = %next, "operation status changed");
        }
        self.state.status = next;
        self.last_response = Some(response);

        Ok(next.is_terminal())
    }

    fn status_of(&self, response: &Response) -> OperationStatus {
        let code = response.status;

        if code == StatusCode::ACCEPTED {
            return OperationStatus::InProgress;
        }

        if code.is_client_error() {
            return OperationStatus::Failed;
        }

        let wire = body_status(&response.body);

        match self.state.polling_method {
            // a Location poll answering 200/201/204 is done unless the body
            // still describes a running operation
            PollingMethod::Location => wire
                .as_deref()
                .and_then(OperationStatus::recognize)
                .unwrap_or(OperationStatus::Succeeded),
            PollingMethod::AsyncOperation => wire
                .as_deref()
                .map(OperationStatus::from_wire)
                .unwrap_or(OperationStatus::InProgress),
            PollingMethod::Resource => wire
                .as_deref()
                .map(OperationStatus::from_wire)
                .unwrap_or(OperationStatus::Succeeded),
        }
    }

    /// Picks up a moved polling URL from an in-progress response
    fn follow_headers(&mut self, response: &Response) -> Result<(), OperationError> {
        let header = match self.state.polling_method {
            PollingMethod::AsyncOperation => response.header(AZURE_ASYNC_OPERATION),
            PollingMethod::Location => response.header(LOCATION.as_str()),
            PollingMethod::Resource => None,
        };

        if let Some(next) = header {
            let url = resolve(&response.url, next)?;
            if url != self.polling_url {
                tracing::debug!(url = %url, "polling URL moved");
                self.state.polling_url = url.to_string();
                self.polling_url = url;
            }
        }

        Ok(())
    }

    /// Retrieves the outcome of a finished operation.
    ///
    /// When the last poll did not return the resource itself, one GET is
    /// issued against the final resource URL.
    pub async fn result<S>(&mut self, ctx: &Context, sender: &S) -> Result<T, OperationError>
    where
        S: Sender + ?Sized,
        T: DeserializeOwned,
    {
        match self.state.status {
            OperationStatus::Succeeded => {}
            status @ (OperationStatus::Failed | OperationStatus::Canceled) => {
                return Err(OperationError::OperationFailed {
                    status,
                    error: self.state.error.clone().unwrap_or_default(),
                })
            }
            OperationStatus::Accepted | OperationStatus::InProgress => {
                return Err(OperationError::Incomplete {
                    operation: self.describe(),
                })
            }
        }

        if self.result_response.is_none() {
            let carries_result = match &self.last_response {
                Some(last) => {
                    self.state.polling_method != PollingMethod::AsyncOperation
                        && last.status != StatusCode::NO_CONTENT
                        && last.has_body()
                }
                None => false,
            };

            self.result_response = match (&self.state.final_url, carries_result) {
                (_, true) => self.last_response.clone(),
                (Some(final_url), false) => Some(self.fetch_final(ctx, sender, final_url).await?),
                (None, false) => None,
            };
        }

        let body = self
            .result_response
            .as_ref()
            .map(|r| r.body.as_str())
            .unwrap_or_default();

        decode(body)
    }

    async fn fetch_final<S>(
        &self,
        ctx: &Context,
        sender: &S,
        final_url: &str,
    ) -> Result<Response, OperationError>
    where
        S: Sender + ?Sized,
    {
        if let Some(reason) = ctx.interrupted() {
            return Err(reason.into());
        }

        let url = Url::parse(final_url).map_err(|source| OperationError::InvalidUrl {
            url: final_url.to_string(),
            source,
        })?;

        tracing::debug!(url = %url, "fetching operation result");

        let response = sender.send(Request::get(url)).await?;
        let code = response.status;

        if code == StatusCode::TOO_MANY_REQUESTS || code.is_server_error() {
            return Err(OperationError::Poll(SendError::Status {
                status: code.as_u16(),
                body: response.body,
            }));
        }

        if !code.is_success() {
            return Err(OperationError::OperationFailed {
                status: OperationStatus::Failed,
                error: ServiceError::from_response(&response),
            });
        }

        Ok(response)
    }
}

/// Decodes a result body; an empty body decodes as JSON `null`
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, OperationError> {
    let text = if body.trim().is_empty() { "null" } else { body };

    serde_json::from_str(text).map_err(|source| {
        tracing::error!("Failed to decode operation result: {}, body: {}", source, body);
        OperationError::Decode {
            source,
            body: body.to_string(),
        }
    })
}
