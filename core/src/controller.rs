//! Create/update/delete/restore orchestration.
//!
//! # Design
//! Every intent runs the same pipeline: validate (drafts only), submit, and
//! on success re-fetch the partition the mutation made stale. Lists are
//! never patched locally, so a failed step leaves every `ListPresenter`
//! exactly as it was.
//!
//! ```text
//! Idle ─► Validating ─► Submitting ─► Refreshing ─► Idle
//!              │             │
//!              └──► Failed ◄─┘ ──(next intent / acknowledge)──► Idle
//! ```
//!
//! A new intent is refused with `RoomError::Busy` unless the controller is
//! `Idle` or `Failed`. That is the only guard against racing submissions.
//! An intent future dropped mid-flight releases it again.

use std::cell::{Cell, RefCell};

use crate::error::ApiError;
use crate::http::Transport;
use crate::presenter::ListPresenter;
use crate::service::RoomService;
use crate::types::{Mutation, MutationOutcome, Partition, RoomDraft, RoomId};
use crate::validate::{coerce, validate, CoercionError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Submitting,
    Refreshing,
    Failed,
}

impl Phase {
    pub fn accepts_intent(self) -> bool {
        matches!(self, Phase::Idle | Phase::Failed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A required field is missing. No request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A numeric field did not parse. No request was sent.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// No usable response from the service.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The service answered `Success: false`.
    #[error("{0}")]
    Business(String),

    #[error("another change is still in progress")]
    Busy,
}

impl RoomError {
    /// Message for the presentation layer. Validation and business messages
    /// pass through verbatim; transport failures collapse to a generic one.
    pub fn user_message(&self) -> String {
        match self {
            RoomError::Api(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct LifecycleController<T> {
    service: RoomService<T>,
    active: ListPresenter,
    deleted: ListPresenter,
    phase: Cell<Phase>,
    last_error: RefCell<Option<String>>,
}

impl<T: Transport> LifecycleController<T> {
    pub fn new(service: RoomService<T>) -> Self {
        Self {
            service,
            active: ListPresenter::new(Partition::Active),
            deleted: ListPresenter::new(Partition::Deleted),
            phase: Cell::new(Phase::Idle),
            last_error: RefCell::new(None),
        }
    }

    pub fn service(&self) -> &RoomService<T> {
        &self.service
    }

    pub fn presenter(&self, partition: Partition) -> &ListPresenter {
        match partition {
            Partition::Active => &self.active,
            Partition::Deleted => &self.deleted,
        }
    }

    pub fn active(&self) -> &ListPresenter {
        &self.active
    }

    pub fn deleted(&self) -> &ListPresenter {
        &self.deleted
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Message of the last failed intent, until the next intent starts.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    /// Dismiss a failure.
    pub fn acknowledge(&self) {
        if self.phase.get() == Phase::Failed {
            self.phase.set(Phase::Idle);
            *self.last_error.borrow_mut() = None;
        }
    }

    pub async fn load(&self, partition: Partition) {
        self.presenter(partition).load(&self.service).await;
    }

    pub async fn refresh(&self, partition: Partition) {
        self.presenter(partition).refresh(&self.service).await;
    }

    /// Create a room (draft without id) or update one (draft with id).
    pub async fn create_or_update(&self, draft: &RoomDraft) -> Result<(), RoomError> {
        let _intent = self.begin(Phase::Validating)?;
        match prepare(draft) {
            Ok(mutation) => self.submit(mutation).await,
            Err(e) => self.fail(e),
        }
    }

    /// Confirmation is the caller's business.
    pub async fn soft_delete(&self, id: RoomId) -> Result<(), RoomError> {
        let _intent = self.begin(Phase::Submitting)?;
        self.submit(Mutation::SoftDelete(id)).await
    }

    pub async fn restore(&self, id: RoomId) -> Result<(), RoomError> {
        let _intent = self.begin(Phase::Submitting)?;
        self.submit(Mutation::Restore(id)).await
    }

    /// Claim the controller for one intent. The returned guard must live
    /// until the intent settles.
    fn begin(&self, next: Phase) -> Result<Intent<'_>, RoomError> {
        let current = self.phase.get();
        if !current.accepts_intent() {
            tracing::debug!(phase = ?current, "intent refused while busy");
            return Err(RoomError::Busy);
        }
        *self.last_error.borrow_mut() = None;
        self.phase.set(next);
        Ok(Intent { phase: &self.phase })
    }

    fn fail(&self, err: RoomError) -> Result<(), RoomError> {
        self.phase.set(Phase::Failed);
        *self.last_error.borrow_mut() = Some(err.user_message());
        Err(err)
    }

    async fn submit(&self, mutation: Mutation) -> Result<(), RoomError> {
        self.phase.set(Phase::Submitting);
        match self.service.submit(&mutation).await {
            Ok(MutationOutcome::Accepted { .. }) => {}
            Ok(MutationOutcome::Rejected { message }) => return self.fail(RoomError::Business(message)),
            Err(e) => return self.fail(e.into()),
        }

        self.phase.set(Phase::Refreshing);
        self.presenter(mutation.partition()).refresh(&self.service).await;
        self.phase.set(Phase::Idle);
        Ok(())
    }
}

/// Held while an intent is in flight. An intent future dropped before it
/// settles (timeout, `select!`) leaves an in-flight phase behind; dropping
/// the guard puts the controller back to `Idle`.
struct Intent<'a> {
    phase: &'a Cell<Phase>,
}

impl Drop for Intent<'_> {
    fn drop(&mut self) {
        let phase = self.phase.get();
        if !phase.accepts_intent() {
            tracing::debug!(?phase, "intent abandoned before it settled");
            self.phase.set(Phase::Idle);
        }
    }
}

/// Validate, coerce, and pick create or update from the draft's id.
fn prepare(draft: &RoomDraft) -> Result<Mutation, RoomError> {
    validate(draft)?;
    let fields = coerce(draft)?;
    Ok(match draft.id {
        Some(id) => Mutation::Update { id, fields },
        None => Mutation::Create(fields),
    })
}
