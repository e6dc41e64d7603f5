//! Test doubles shared by module tests.

use crate::transport::{RequestBody, Response, Transport, TransportError};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::VecDeque;

/// A request as the scripted transport saw it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<RequestBody>,
}

/// Transport that replays scripted answers in order and records requests.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    answers: RefCell<VecDeque<Result<Response, TransportError>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a server answer.
    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.answers
            .borrow_mut()
            .push_back(Ok(Response::new(status, body)));
        self
    }

    /// Queue a failure to reach the server.
    pub fn fail(&self, cause: &str) -> &Self {
        self.answers
            .borrow_mut()
            .push_back(Err(TransportError(cause.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn next(&self, request: RecordedRequest) -> Result<Response, TransportError> {
        self.requests.borrow_mut().push(request);
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted answer".to_string())))
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<Response, TransportError> {
        self.next(RecordedRequest {
            method: "GET",
            path: path.to_string(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<Response, TransportError> {
        self.next(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            body: Some(body),
        })
    }
}
