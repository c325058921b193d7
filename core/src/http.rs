//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `ApiClient` builds `HttpRequest`
//! values and hands them to a `Transport`, which performs the network
//! exchange and reports either a response or a `TransportError`. Keeping the
//! seam this narrow lets tests substitute a stub and lets hosts bring their
//! own HTTP stack; `UreqTransport` is the blocking default.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and carries no query string; `query` pairs are appended
/// by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase accompanying the status code, empty when unknown.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    /// Body bytes exactly as received.
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Failures reported by a `Transport`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// A response arrived with a 4xx or 5xx status.
    #[error("HTTP {} {}", .0.status, .0.reason)]
    Status(HttpResponse),

    /// Any other failure. `response` is set when the exchange got as far as
    /// receiving a response head.
    #[error("{message}")]
    Request {
        message: String,
        response: Option<HttpResponse>,
    },
}

/// Performs one HTTP exchange per call. Implementations must not retry.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent is configured with HTTP-status-as-error disabled so 4xx/5xx
/// responses are captured in full and reported as `TransportError::Status`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Transport whose requests fail once `timeout` elapses end to end.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => prepare(self.agent.get(url), request).call(),
            HttpMethod::Delete => prepare(self.agent.delete(url), request).call(),
            HttpMethod::Post => send(prepare(self.agent.post(url), request), request),
            HttpMethod::Put => send(prepare(self.agent.put(url), request), request),
        };

        let mut response = result.map_err(|e| TransportError::Request {
            message: e.to_string(),
            response: None,
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let mut received = HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: Vec::new(),
        };

        // No size cap and no UTF-8 requirement; callers decode if they need to.
        match response.body_mut().with_config().limit(u64::MAX).read_to_vec() {
            Ok(body) => received.body = body,
            Err(e) => {
                return Err(TransportError::Request {
                    message: e.to_string(),
                    response: Some(received),
                })
            }
        }

        if received.is_client_error() || received.is_server_error() {
            return Err(TransportError::Status(received));
        }
        Ok(received)
    }
}

fn prepare<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (key, value) in &request.query {
        builder = builder.query(key, value);
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match &request.body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
