//! Error types for the room API client.
//!
//! # Design
//! `ApiError` covers everything that can go wrong between building a request
//! and holding a decoded envelope. A response that decodes fine but reports
//! `Success: false` is not an error at this layer; it is a
//! `MutationOutcome::Rejected` value.

/// Message shown to users for any failure below the service contract.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

/// Errors returned by `RoomClient` parse methods and `Transport` implementations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (timeout, connection refused, DNS, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be decoded into the expected envelope.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// Text for the presentation layer. Transport-level detail is not
    /// service-specific, so every variant collapses to one generic message.
    pub fn user_message(&self) -> &'static str {
        NETWORK_ERROR_MESSAGE
    }
}
