//! Follow-back engine.
//!
//! This crate provides:
//! - Exhaustive cursor pagination of relationship listings
//! - A session guard that resumes an expired session and retries, bounded
//! - Concurrent snapshots of followers, followings and mutes
//! - Pure reconciliation of who still needs a follow-back
//! - A sequential bulk follow executor with per-target isolation
//! - An explicit FSM-based lifecycle driven by [`FollowBackController`]
//!
//! The remote service is reached only through [`RelationshipApi`], and the
//! session is persisted only through [`SessionPersistence`].

mod actor;
mod bulk_follow;
mod controller;
mod error;
mod lifecycle_fsm;
mod paginator;
mod persistence;
mod reconcile;
mod remote;
mod session_cell;
mod session_guard;
mod snapshot;

#[cfg(test)]
mod tests;

pub use actor::Actor;
pub use bulk_follow::{
    BulkFollowExecutor, BulkFollowReport, FollowFailure, FollowOutcome, FollowProgress,
};
pub use controller::{
    EngineSettings, FollowBackController, PhaseChanged, PhaseObserver, SessionOwner,
};
pub use error::{ApiError, EngineError, EngineResult};
pub use lifecycle_fsm::lifecycle_machine;
pub use lifecycle_fsm::{LifecycleMachine, LifecycleState, Phase, PhaseEvent};
pub use paginator::{fetch_all, Page};
pub use persistence::SessionPersistence;
pub use reconcile::{reconcile, Reconciliation};
pub use remote::{Credentials, RelationshipApi};
pub use session_cell::SessionCell;
pub use session_guard::{
    ResumeFailurePolicy, SessionGuard, SessionResumer, StoredSessionResumer,
    DEFAULT_MAX_ATTEMPTS,
};
pub use snapshot::{RelationshipSnapshot, SnapshotBuilder, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Authenticated account session, as persisted.
pub use followback_storage::StoredSession as Session;
