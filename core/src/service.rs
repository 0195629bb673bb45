//! Async front of `RoomClient`: build, execute through a `Transport`, parse.

use crate::client::RoomClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{Mutation, MutationOutcome, Partition, Room};

/// Remote room service bound to a transport.
///
/// Never retries. A failed call is reported once and retry is left to
/// whoever issued it.
#[derive(Debug)]
pub struct RoomService<T> {
    client: RoomClient,
    transport: T,
}

impl<T: Transport> RoomService<T> {
    pub fn new(client: RoomClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &RoomClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn list_active(&self) -> Result<Vec<Room>, ApiError> {
        self.list(Partition::Active).await
    }

    pub async fn list_deleted(&self) -> Result<Vec<Room>, ApiError> {
        self.list(Partition::Deleted).await
    }

    pub async fn list(&self, partition: Partition) -> Result<Vec<Room>, ApiError> {
        let request = self.client.build_list(partition)?;
        tracing::debug!(%partition, url = %request.url, "fetching rooms");
        let response = self.transport.execute(request).await.inspect_err(|e| {
            tracing::warn!(%partition, error = %e, "room list request failed");
        })?;
        let rooms = self.client.parse_list(partition, response)?;
        tracing::debug!(%partition, count = rooms.len(), "rooms fetched");
        Ok(rooms)
    }

    pub async fn submit(&self, mutation: &Mutation) -> Result<MutationOutcome, ApiError> {
        let request = self.client.build_submit(mutation)?;
        let action = mutation.label();
        tracing::debug!(action, room_id = ?mutation.room_id(), "submitting mutation");
        let response = self.transport.execute(request).await.inspect_err(|e| {
            tracing::warn!(action, error = %e, "mutation request failed");
        })?;
        let outcome = self.client.parse_submit(mutation, response)?;
        match &outcome {
            MutationOutcome::Accepted { .. } => {
                tracing::info!(action, room_id = ?mutation.room_id(), "mutation accepted");
            }
            MutationOutcome::Rejected { message } => {
                tracing::warn!(action, room_id = ?mutation.room_id(), %message, "mutation rejected");
            }
        }
        Ok(outcome)
    }
}
