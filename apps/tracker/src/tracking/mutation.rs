//! Lifecycle of a single optimistic mutation.
//!
//! `Idle -> Pending(snapshot) -> Confirmed | RolledBack`, or `Superseded` when a
//! newer mutation of the same record was dispatched while this one was in
//! flight. The snapshot only lives while the request is pending.
//!
//! A rolled-back mutation reaches the caller as the request's `ApiError`, so
//! only the successful settlements have a `MutationOutcome`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MutationState<S> {
    #[default]
    Idle,
    Pending(S),
    Confirmed,
    RolledBack,
    Superseded,
}

/// What the caller learns once a mutation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    /// The server accepted the change and its representation is now local.
    Confirmed,
    /// A newer mutation owns the record; this response was ignored.
    Superseded,
}

impl<S> MutationState<S> {
    pub fn begin(snapshot: S) -> Self {
        MutationState::Pending(snapshot)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending(_))
    }

    /// Pending -> Confirmed. The snapshot is dropped.
    pub fn confirm(&mut self) -> Option<MutationOutcome> {
        self.settle(MutationState::Confirmed).map(|_| MutationOutcome::Confirmed)
    }

    /// Pending -> RolledBack, handing back the snapshot to restore.
    pub fn roll_back(&mut self) -> Option<S> {
        self.settle(MutationState::RolledBack)
    }

    /// Pending -> Superseded. The snapshot is dropped.
    pub fn supersede(&mut self) -> Option<MutationOutcome> {
        self.settle(MutationState::Superseded).map(|_| MutationOutcome::Superseded)
    }

    /// Only a pending mutation can settle; any other state is left as is.
    fn settle(&mut self, next: MutationState<S>) -> Option<S> {
        if !self.is_pending() {
            return None;
        }
        match std::mem::replace(self, next) {
            MutationState::Pending(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}
