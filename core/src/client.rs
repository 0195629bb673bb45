//! Stateless HTTP request builder and response parser for the room service.
//!
//! # Design
//! `RoomClient` holds only its configuration and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The round-trip in between is someone else's job
//! (`RoomService` drives it through a `Transport`).
//!
//! The service multiplexes all four mutations onto one endpoint with a
//! numeric `action_flag`; that encoding stays in `wire` and never leaks out
//! of this module's signatures.

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Mutation, MutationOutcome, Partition, Room};
use crate::wire;

/// Synchronous, stateless client for the room service.
#[derive(Debug, Clone)]
pub struct RoomClient {
    base_url: String,
    config: ClientConfig,
}

impl RoomClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn post(&self, endpoint: &str, fields: serde_json::Value) -> Result<HttpRequest, ApiError> {
        let body = wire::with_credentials(&self.config.credentials, fields);
        let body = serde_json::to_string(&body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            url: self.url(endpoint),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        })
    }

    /// List requests carry the credential fragment only.
    pub fn build_list(&self, partition: Partition) -> Result<HttpRequest, ApiError> {
        let endpoint = match partition {
            Partition::Active => &self.config.endpoints.list_active,
            Partition::Deleted => &self.config.endpoints.list_deleted,
        };
        self.post(endpoint, serde_json::Value::Object(Default::default()))
    }

    pub fn build_list_active(&self) -> Result<HttpRequest, ApiError> {
        self.build_list(Partition::Active)
    }

    pub fn build_list_deleted(&self) -> Result<HttpRequest, ApiError> {
        self.build_list(Partition::Deleted)
    }

    pub fn build_submit(&self, mutation: &Mutation) -> Result<HttpRequest, ApiError> {
        let fields = wire::mutation_fields(mutation, self.config.created_by)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        self.post(&self.config.endpoints.submit, fields)
    }

    /// Rooms in the order the service returned them.
    pub fn parse_list(&self, partition: Partition, response: HttpResponse) -> Result<Vec<Room>, ApiError> {
        check_status(&response)?;
        wire::decode_rooms(&response.body, partition).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_list_active(&self, response: HttpResponse) -> Result<Vec<Room>, ApiError> {
        self.parse_list(Partition::Active, response)
    }

    pub fn parse_list_deleted(&self, response: HttpResponse) -> Result<Vec<Room>, ApiError> {
        self.parse_list(Partition::Deleted, response)
    }

    /// A rejected mutation is a successful parse: it comes back as
    /// `MutationOutcome::Rejected`, not as an `Err`.
    pub fn parse_submit(&self, mutation: &Mutation, response: HttpResponse) -> Result<MutationOutcome, ApiError> {
        check_status(&response)?;
        let summary =
            wire::decode_summary(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(wire::outcome(mutation, summary))
    }
}

/// Map non-2xx status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
