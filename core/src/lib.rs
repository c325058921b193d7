//! Blocking client for the Tick time-tracking REST API (v2).
//!
//! # Overview
//! `ApiClient` sends one authenticated JSON request per call to
//! `https://www.tickspot.com/<subscription>/api/v2/<endpoint>.json` and maps
//! every failure into `ApiError`, logging it once through `tracing`.
//!
//! # Design
//! - The network exchange sits behind the `Transport` trait; `UreqTransport`
//!   is the default and tests substitute stubs or point at the mock server.
//! - Transport failures go through one ordered classification (`Failure`)
//!   before being logged and translated.
//! - All client state is fixed at construction, so a client can be shared
//!   freely between calls and threads.

pub mod client;
pub mod config;
pub mod error;
pub mod failure;
pub mod http;
pub mod identity;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, GENERIC_FAILURE_MESSAGE};
pub use failure::{classify, Failure};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use identity::ClientIdentity;
