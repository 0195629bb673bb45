//! Per-partition list state for the presentation layer.
//!
//! # Design
//! One `ListPresenter` exists per `Partition`. It holds the last fetched
//! rooms plus loading/refreshing/error flags, and is only ever replaced
//! wholesale by a fetch, never patched.
//!
//! Fetches are not cancelable, so two can be in flight at once. Every fetch
//! takes a `Ticket` with a monotonically increasing sequence number when it
//! is issued. A completion whose ticket is older than the newest one already
//! applied is discarded, so an older request that finishes late never
//! overwrites newer data. The state lives in a `RefCell` that is never
//! borrowed across an `.await`, which lets fetches interleave on a single
//! thread through `&self`.

use std::cell::RefCell;

use crate::error::ApiError;
use crate::http::Transport;
use crate::service::RoomService;
use crate::types::{Partition, Room};

/// Snapshot of what a list screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub items: Vec<Room>,
    /// First-load spinner.
    pub is_loading: bool,
    /// Pull-to-refresh spinner.
    pub is_refreshing: bool,
    pub error: Option<String>,
}

impl Default for ListState {
    /// State on mount: loading, nothing fetched yet.
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: true,
            is_refreshing: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Load,
    Refresh,
}

/// Issued by `ListPresenter::begin`, handed back to `ListPresenter::complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    kind: FetchKind,
}

impl Ticket {
    pub fn kind(&self) -> FetchKind {
        self.kind
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: ListState,
    issued: u64,
    applied: u64,
    pending_load: Option<u64>,
    pending_refresh: Option<u64>,
}

#[derive(Debug)]
pub struct ListPresenter {
    partition: Partition,
    inner: RefCell<Inner>,
}

impl ListPresenter {
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            inner: RefCell::new(Inner::default()),
        }
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn state(&self) -> ListState {
        self.inner.borrow().state.clone()
    }

    pub fn items(&self) -> Vec<Room> {
        self.inner.borrow().state.items.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.borrow().state.is_loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.borrow().state.is_refreshing
    }

    pub fn error(&self) -> Option<String> {
        self.inner.borrow().state.error.clone()
    }

    /// Mark a fetch as issued and raise the matching spinner. A load also
    /// clears any previous error.
    pub fn begin(&self, kind: FetchKind) -> Ticket {
        let mut inner = self.inner.borrow_mut();
        inner.issued += 1;
        let seq = inner.issued;
        match kind {
            FetchKind::Load => {
                inner.pending_load = Some(seq);
                inner.state.is_loading = true;
                inner.state.error = None;
            }
            FetchKind::Refresh => {
                inner.pending_refresh = Some(seq);
                inner.state.is_refreshing = true;
            }
        }
        Ticket { seq, kind }
    }

    /// Apply a fetch result. Returns `false` if it was discarded as stale.
    ///
    /// A spinner drops when the most recently issued fetch of its kind
    /// completes, stale or not.
    pub fn complete(&self, ticket: Ticket, result: Result<Vec<Room>, ApiError>) -> bool {
        let mut inner = self.inner.borrow_mut();
        match ticket.kind {
            FetchKind::Load if inner.pending_load == Some(ticket.seq) => {
                inner.pending_load = None;
                inner.state.is_loading = false;
            }
            FetchKind::Refresh if inner.pending_refresh == Some(ticket.seq) => {
                inner.pending_refresh = None;
                inner.state.is_refreshing = false;
            }
            _ => {}
        }

        if ticket.seq < inner.applied {
            tracing::debug!(
                partition = %self.partition,
                seq = ticket.seq,
                applied = inner.applied,
                "discarding stale room list"
            );
            return false;
        }
        inner.applied = ticket.seq;
        if inner.pending_load.is_none() {
            inner.state.is_loading = false;
        }

        match result {
            Ok(items) => {
                inner.state.items = items;
                inner.state.error = None;
            }
            Err(e) => {
                tracing::warn!(partition = %self.partition, error = %e, "room list fetch failed");
                inner.state.error = Some(e.user_message().to_string());
            }
        }
        true
    }

    /// Initial or explicit reload.
    pub async fn load<T: Transport>(&self, service: &RoomService<T>) {
        self.fetch(FetchKind::Load, service).await;
    }

    /// Pull-to-refresh, and the re-fetch after every successful mutation.
    pub async fn refresh<T: Transport>(&self, service: &RoomService<T>) {
        self.fetch(FetchKind::Refresh, service).await;
    }

    async fn fetch<T: Transport>(&self, kind: FetchKind, service: &RoomService<T>) {
        let ticket = self.begin(kind);
        let result = service.list(self.partition).await;
        self.complete(ticket, result);
    }
}
