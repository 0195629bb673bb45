//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and parses `HttpResponse` values without ever
//! touching the network. The embedder supplies a `Transport` that performs
//! the round-trip, so base-URL plumbing, timeouts and TLS all stay outside
//! the core.
//!
//! Every request of the room service is a JSON `POST`, so there is no method
//! field.

use crate::error::ApiError;

/// A `POST` request described as plain data.
///
/// Built by `RoomClient::build_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after executing an `HttpRequest`, then passed
/// to `RoomClient::parse_*` methods for decoding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Shorthand for a `200 OK` response with a body and no headers.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// The "submit request" capability the core depends on.
///
/// Implementations must return `Ok` for every response that was received,
/// whatever its status, and `Err(ApiError::Transport)` only when no response
/// arrived at all (timeout, connection refused, ...). Status interpretation
/// belongs to `RoomClient`. Implementations must not retry.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}
