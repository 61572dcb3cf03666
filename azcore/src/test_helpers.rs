//! Test helpers: a scripted [`Sender`] double

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::collections::VecDeque;
use std::sync::Mutex;
use url::Url;

use crate::http::{Request, Response, SendError, Sender};

pub const RESOURCE_URL: &str = "https://management.azure.com/subscriptions/1234/resourceGroups/rg/providers/Microsoft.AAD/domainServices/d1?api-version=2020-01-01";
pub const OPERATION_URL: &str =
    "https://management.azure.com/subscriptions/1234/providers/Microsoft.AAD/operations/op1";

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// An initial response to hand to `AsyncOperation::from_response`
pub fn initial(method: Method, status: u16) -> Response {
    Response::new(method, url(RESOURCE_URL), StatusCode::from_u16(status).unwrap())
}

/// A canned reply; method and URL are filled in from the request
pub struct Reply {
    status: StatusCode,
    headers: Vec<(&'static str, String)>,
    body: String,
}

pub fn reply(status: u16, body: &str) -> Reply {
    Reply {
        status: StatusCode::from_u16(status).unwrap(),
        headers: Vec::new(),
        body: body.to_string(),
    }
}

impl Reply {
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

#[derive(Default)]
pub struct ScriptedSender {
    replies: Mutex<VecDeque<Result<Reply, String>>>,
    requests: Mutex<Vec<(Method, String)>>,
}

impl ScriptedSender {
    pub fn new(replies: Vec<Result<Reply, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests seen so far as `(method, url)`
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Sender for ScriptedSender {
    async fn send(&self, request: Request) -> Result<Response, SendError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.method.clone(), request.url.to_string()));

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(reply)) => {
                let response = Response::new(request.method, request.url, reply.status)
                    .with_body(reply.body);
                Ok(reply
                    .headers
                    .iter()
                    .fold(response, |response, (name, value)| {
                        response.with_header(name, value)
                    }))
            }
            Some(Err(message)) => Err(SendError::Transport(message)),
            None => Err(SendError::Transport("script exhausted".to_string())),
        }
    }
}
