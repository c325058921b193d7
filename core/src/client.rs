//! Authenticated client for the Tick v2 REST API.
//!
//! # Design
//! `ApiClient` holds only write-once configuration: the caller's identity,
//! a transport and the precomputed API URL. Each verb splits into a pure
//! `build_*` method producing an `HttpRequest` and a shared execute step that
//! runs the transport once and, on failure, classifies the error, emits one
//! structured log event and returns an `ApiError`.
//!
//! GET and POST decode the body as JSON. PUT and DELETE hand back the raw
//! `HttpResponse` untouched, even when its body is JSON.

use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::failure::{classify, Failure};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::identity::ClientIdentity;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Synchronous, stateless client for one Tick subscription.
#[derive(Debug, Clone)]
pub struct ApiClient<T = UreqTransport> {
    identity: ClientIdentity,
    transport: T,
    api_url: String,
}

impl ApiClient<UreqTransport> {
    /// Client for the public Tick endpoint over a default `ureq` transport.
    pub fn connect(
        subscription_id: impl Into<String>,
        access_token: impl Into<String>,
        company: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let identity = ClientIdentity::new(subscription_id, access_token, company, email);
        Self::new(ClientConfig::default(), identity, UreqTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: ClientConfig, identity: ClientIdentity, transport: T) -> Self {
        let api_url = config.api_url(identity.subscription_id());
        Self {
            identity,
            transport,
            api_url,
        }
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// `<base>/<subscription_id>/api/v2/`
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Absolute URL for `endpoint`. The endpoint is used verbatim.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}.json", self.api_url)
    }

    pub fn build_get(&self, endpoint: &str, query: &[(&str, &str)]) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint_url(endpoint),
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            headers: self.auth_headers(),
            body: None,
        }
    }

    pub fn build_post<B>(&self, endpoint: &str, data: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_with_body(HttpMethod::Post, endpoint, data)
    }

    pub fn build_put<B>(&self, endpoint: &str, data: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_with_body(HttpMethod::Put, endpoint, data)
    }

    pub fn build_delete(&self, endpoint: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.endpoint_url(endpoint),
            query: Vec::new(),
            headers: self.auth_headers(),
            body: None,
        }
    }

    /// GET `endpoint` and decode the body as JSON.
    pub fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let request = self.build_get(endpoint, query);
        let params = query_params(query);
        let response = self.execute(&request, endpoint, Some(&params))?;
        decode(&response)
    }

    /// POST `data` as JSON to `endpoint` and decode the body as JSON.
    pub fn post<B>(&self, endpoint: &str, data: &B) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_post(endpoint, data)?;
        let response = self.execute(&request, endpoint, request.body.as_deref())?;
        decode(&response)
    }

    /// PUT `data` as JSON to `endpoint`. The response is returned undecoded.
    pub fn put<B>(&self, endpoint: &str, data: &B) -> Result<HttpResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_put(endpoint, data)?;
        self.execute(&request, endpoint, request.body.as_deref())
    }

    /// DELETE `endpoint`. The response is returned undecoded.
    pub fn delete(&self, endpoint: &str) -> Result<HttpResponse, ApiError> {
        let request = self.build_delete(endpoint);
        self.execute(&request, endpoint, None)
    }

    fn build_with_body<B>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: &B,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_string(data).map_err(ApiError::Encode)?;
        let mut headers = self.auth_headers();
        headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        Ok(HttpRequest {
            method,
            url: self.endpoint_url(endpoint),
            query: Vec::new(),
            headers,
            body: Some(body),
        })
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), self.identity.user_agent()),
            ("Authorization".to_string(), self.identity.authorization()),
        ]
    }

    /// Run `request` once. `params` is what gets logged alongside a failure.
    fn execute(
        &self,
        request: &HttpRequest,
        endpoint: &str,
        params: Option<&str>,
    ) -> Result<HttpResponse, ApiError> {
        match self.transport.execute(request) {
            Ok(response) => Ok(response),
            Err(e) => Err(report(request.method, endpoint, params, classify(e))),
        }
    }
}

/// Log `failure` and turn it into the error handed to the caller.
fn report(method: HttpMethod, endpoint: &str, params: Option<&str>, failure: Failure) -> ApiError {
    match failure {
        Failure::ClientErrorResponse(response) => {
            error!(
                method = %method,
                endpoint,
                params,
                code = response.status,
                reason = %response.reason,
                "request rejected with client error"
            );
            ApiError::Response(response)
        }
        Failure::ServerErrorResponse(response) => {
            error!(
                method = %method,
                endpoint,
                params,
                code = response.status,
                reason = %response.reason,
                "request failed with server error"
            );
            ApiError::Response(response)
        }
        Failure::OtherWithResponse { message, response } => {
            error!(
                method = %method,
                endpoint,
                params,
                code = response.status,
                reason = %message,
                "request failed"
            );
            ApiError::Response(response)
        }
        Failure::OtherWithoutResponse { message } => {
            error!(
                method = %method,
                endpoint,
                params,
                error = %message,
                "request failed without a response"
            );
            ApiError::generic()
        }
    }
}

fn query_params(query: &[(&str, &str)]) -> String {
    let params: serde_json::Map<String, Value> = query
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect();
    Value::Object(params).to_string()
}

/// Empty bodies decode to `null`.
fn decode(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body).map_err(ApiError::Decode)
}
