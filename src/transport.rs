//! HTTP transport
//!
//! The workflow only ever needs two verbs against one server, so the seam is a
//! small trait. `HttpTransport` is the reqwest-backed implementation; tests
//! plug in a scripted one instead.
//!
//! A transport reports what the server said (status and body) and fails only
//! when no answer arrived. Whether a non-2xx status is an error is the
//! caller's call.

use crate::config::Settings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::time::Duration;
use url::Url;

// ─────────────────────────────────────────────────────────────────────────────
// Request / Response
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a `POST` request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` key/value pairs
    Form(Vec<(String, String)>),
    /// Raw UTF-8 text
    Text(String),
    /// JSON document
    Json(serde_json::Value),
}

/// A server answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Short description of a non-success answer for logs and messages.
    pub fn describe_failure(&self) -> String {
        let body = self.body.trim();
        if body.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            format!("HTTP {} ({})", self.status, body.lines().next().unwrap_or(body))
        }
    }
}

/// No answer was received (connection refused, timeout, bad URL...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Server access used by the workflow. Paths are absolute (`/api/content`)
/// and may carry a query string.
#[async_trait(?Send)]
pub trait Transport {
    async fn get(&self, path: &str) -> std::result::Result<Response, TransportError>;

    async fn post(
        &self,
        path: &str,
        body: RequestBody,
    ) -> std::result::Result<Response, TransportError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Transport
// ─────────────────────────────────────────────────────────────────────────────

/// reqwest-backed transport with optional Basic auth.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Application` if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Application(format!("Invalid server URL '{}': {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Application(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            credentials: None,
        })
    }

    /// Create a transport from user settings, including credentials.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transport = Self::new(
            &settings.server_url,
            Duration::from_secs(settings.request_timeout_secs),
        )?;
        Ok(match &settings.password {
            Some(password) => transport.with_credentials(&settings.username, password),
            None => transport,
        })
    }

    /// Attach Basic auth credentials to every request.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// The server this transport talks to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> std::result::Result<Url, TransportError> {
        self.base
            .join(path)
            .map_err(|e| TransportError(format!("Invalid request path '{}': {}", path, e)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, Some(password)),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<Response, TransportError> {
        let response = self.authorize(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Response { status, body })
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> std::result::Result<Response, TransportError> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }

    async fn post(
        &self,
        path: &str,
        body: RequestBody,
    ) -> std::result::Result<Response, TransportError> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let request = self.client.post(url);
        let request = match body {
            RequestBody::Form(pairs) => request.form(&pairs),
            RequestBody::Text(text) => request
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(text),
            RequestBody::Json(value) => request.json(&value),
        };
        self.send(request).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
