//! Client core for the room records service.
//!
//! # Overview
//! Lists, creates, edits, soft-deletes and restores rooms against a remote
//! service that exposes two list endpoints and one multiplexed mutation
//! endpoint. The core builds `HttpRequest` values and parses `HttpResponse`
//! values; the embedder supplies a `Transport` that moves them over the wire.
//!
//! # Design
//! - `RoomClient` is stateless: `build_*` produces a request, `parse_*`
//!   decodes a response into typed values.
//! - `RoomService` drives a `RoomClient` through a `Transport`.
//! - `LifecycleController` validates, submits, and after every accepted
//!   mutation re-fetches the owning partition into its `ListPresenter`.
//! - Everything is single-threaded. Interleaved fetch completions are
//!   ordered by sequence tickets, not locks.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod presenter;
pub mod service;
pub mod types;
pub mod validate;
mod wire;

pub use client::RoomClient;
pub use config::{ClientConfig, ConfigError, Credentials, Endpoints};
pub use controller::{LifecycleController, Phase, RoomError};
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse, Transport};
pub use presenter::{FetchKind, ListPresenter, ListState, Ticket};
pub use service::RoomService;
pub use types::{Mutation, MutationOutcome, Partition, Room, RoomDraft, RoomFields, RoomId};
pub use validate::{coerce, validate, CoercionError, ValidationError};
pub use wire::ABSENT_SUMMARY_MEANS_SUCCESS;
