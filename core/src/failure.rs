//! Ordered classification of transport failures.

use crate::http::{HttpResponse, TransportError};

/// What went wrong with a request, in the order it is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    ClientErrorResponse(HttpResponse),
    ServerErrorResponse(HttpResponse),
    OtherWithResponse {
        message: String,
        response: HttpResponse,
    },
    OtherWithoutResponse {
        message: String,
    },
}

impl Failure {
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Failure::ClientErrorResponse(response)
            | Failure::ServerErrorResponse(response)
            | Failure::OtherWithResponse { response, .. } => Some(response),
            Failure::OtherWithoutResponse { .. } => None,
        }
    }
}

/// Classify a transport failure. First match wins: 4xx, 5xx, any other
/// failure that carries a response, then failures with no response at all.
pub fn classify(error: TransportError) -> Failure {
    match error {
        TransportError::Status(response) if response.is_client_error() => {
            Failure::ClientErrorResponse(response)
        }
        TransportError::Status(response) if response.is_server_error() => {
            Failure::ServerErrorResponse(response)
        }
        TransportError::Status(response) => Failure::OtherWithResponse {
            message: format!("unexpected HTTP status {}", response.status),
            response,
        },
        TransportError::Request {
            message,
            response: Some(response),
        } => Failure::OtherWithResponse { message, response },
        TransportError::Request {
            message,
            response: None,
        } => Failure::OtherWithoutResponse { message },
    }
}
