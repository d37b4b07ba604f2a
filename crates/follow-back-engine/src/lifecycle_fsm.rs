//! Follow-back lifecycle state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//! Initial ──StoredSessionFound──► ResumingSession ──SessionResumed──┐
//!    │                                  │ ResumeFailed              │
//!    │ NoStoredSession                  ▼                           │
//!    └───────────────────────────► BeforeLogin ◄── Logout ──┐       │
//!                                       │ SubmitLogin       │       │
//!                                       ▼                   │       │
//!              LoginFailed ◄──── LoginInProgress            │       │
//!                 │  ▲  LoginRejected   │ LoginSucceeded    │       │
//!     SubmitLogin └──┘                  ▼                   │       │
//!                        FetchFollowersInProgress ◄─────────┼───────┘
//!                          │ SnapshotBuilt  │ SnapshotFailed│
//!                          ▼                ▼               │
//!               FetchedFollowers    FetchFollowersFailed    │
//!                          │        (RetryFetch ──► back)   │
//!                          │ StartFollowBack                │
//!                          ▼                                │
//!               FollowBackInProgress ──FollowBackFinished──► FollowedBack
//! ```
//!
//! `Logout` is accepted from LoginFailed, FetchFollowersFailed,
//! FetchedFollowers and FollowedBack. It is not accepted from
//! FollowBackInProgress: a batch runs to completion before the session can be
//! dropped.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Generates a module `lifecycle_machine` with:
// - lifecycle_machine::State (enum)
// - lifecycle_machine::Input (enum)
// - lifecycle_machine::StateMachine (type alias)
// - lifecycle_machine::Impl (trait impl)
state_machine! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub lifecycle_machine(Initial)

    Initial => {
        StoredSessionFound => ResumingSession,
        NoStoredSession => BeforeLogin
    },
    BeforeLogin => {
        SubmitLogin => LoginInProgress
    },
    LoginInProgress => {
        LoginSucceeded => FetchFollowersInProgress,
        LoginRejected => LoginFailed
    },
    LoginFailed => {
        SubmitLogin => LoginInProgress,
        Logout => BeforeLogin
    },
    ResumingSession => {
        SessionResumed => FetchFollowersInProgress,
        ResumeFailed => BeforeLogin
    },
    FetchFollowersInProgress => {
        SnapshotBuilt => FetchedFollowers,
        SnapshotFailed => FetchFollowersFailed
    },
    FetchFollowersFailed => {
        RetryFetch => FetchFollowersInProgress,
        Logout => BeforeLogin
    },
    FetchedFollowers => {
        StartFollowBack => FollowBackInProgress,
        Logout => BeforeLogin
    },
    FollowBackInProgress => {
        FollowBackFinished => FollowedBack
    },
    FollowedBack => {
        Logout => BeforeLogin
    }
}

pub use lifecycle_machine::Input as PhaseEvent;
pub use lifecycle_machine::State as LifecycleState;
pub use lifecycle_machine::StateMachine as LifecycleMachine;

/// Operational phase, the public view of [`LifecycleState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Initial,
    BeforeLogin,
    LoginInProgress,
    LoginFailed,
    ResumingSession,
    FetchFollowersInProgress,
    FetchedFollowers,
    FetchFollowersFailed,
    FollowBackInProgress,
    FollowedBack,
}

impl Phase {
    pub const ALL: [Phase; 10] = [
        Phase::Initial,
        Phase::BeforeLogin,
        Phase::LoginInProgress,
        Phase::LoginFailed,
        Phase::ResumingSession,
        Phase::FetchFollowersInProgress,
        Phase::FetchedFollowers,
        Phase::FetchFollowersFailed,
        Phase::FollowBackInProgress,
        Phase::FollowedBack,
    ];

    /// Presentation message key for the phase.
    pub fn message_key(&self) -> &'static str {
        match self {
            Phase::Initial | Phase::BeforeLogin => "message.blank",
            Phase::LoginInProgress | Phase::ResumingSession => "message.loginInProgress",
            Phase::LoginFailed => "message.loginFailed",
            Phase::FetchFollowersInProgress => "message.fetchingFollowers",
            Phase::FetchedFollowers => "message.fetchedFollowers",
            Phase::FetchFollowersFailed => "message.fetchFollowersFailed",
            Phase::FollowBackInProgress => "message.followingBack",
            Phase::FollowedBack => "message.followedBack",
        }
    }

    /// Phases where the login form applies.
    pub fn is_logged_out(&self) -> bool {
        matches!(
            self,
            Phase::BeforeLogin | Phase::LoginInProgress | Phase::LoginFailed
        )
    }

    /// Phases reachable only with an established session.
    pub fn is_logged_in(&self) -> bool {
        matches!(
            self,
            Phase::FetchFollowersInProgress
                | Phase::FetchedFollowers
                | Phase::FetchFollowersFailed
                | Phase::FollowBackInProgress
                | Phase::FollowedBack
        )
    }

    /// Phases where a reconciliation is available to show.
    pub fn has_fetched_followers(&self) -> bool {
        matches!(self, Phase::FetchedFollowers | Phase::FollowBackInProgress)
    }
}

impl From<&LifecycleState> for Phase {
    fn from(state: &LifecycleState) -> Self {
        match state {
            LifecycleState::Initial => Phase::Initial,
            LifecycleState::BeforeLogin => Phase::BeforeLogin,
            LifecycleState::LoginInProgress => Phase::LoginInProgress,
            LifecycleState::LoginFailed => Phase::LoginFailed,
            LifecycleState::ResumingSession => Phase::ResumingSession,
            LifecycleState::FetchFollowersInProgress => Phase::FetchFollowersInProgress,
            LifecycleState::FetchedFollowers => Phase::FetchedFollowers,
            LifecycleState::FetchFollowersFailed => Phase::FetchFollowersFailed,
            LifecycleState::FollowBackInProgress => Phase::FollowBackInProgress,
            LifecycleState::FollowedBack => Phase::FollowedBack,
        }
    }
}

impl PhaseEvent {
    pub const ALL: [PhaseEvent; 13] = [
        PhaseEvent::StoredSessionFound,
        PhaseEvent::NoStoredSession,
        PhaseEvent::SubmitLogin,
        PhaseEvent::LoginSucceeded,
        PhaseEvent::LoginRejected,
        PhaseEvent::SessionResumed,
        PhaseEvent::ResumeFailed,
        PhaseEvent::SnapshotBuilt,
        PhaseEvent::SnapshotFailed,
        PhaseEvent::RetryFetch,
        PhaseEvent::StartFollowBack,
        PhaseEvent::FollowBackFinished,
        PhaseEvent::Logout,
    ];

    /// The phase this event leads to from every state that accepts it.
    pub fn destination(&self) -> Phase {
        match self {
            PhaseEvent::StoredSessionFound => Phase::ResumingSession,
            PhaseEvent::NoStoredSession => Phase::BeforeLogin,
            PhaseEvent::SubmitLogin => Phase::LoginInProgress,
            PhaseEvent::LoginSucceeded => Phase::FetchFollowersInProgress,
            PhaseEvent::LoginRejected => Phase::LoginFailed,
            PhaseEvent::SessionResumed => Phase::FetchFollowersInProgress,
            PhaseEvent::ResumeFailed => Phase::BeforeLogin,
            PhaseEvent::SnapshotBuilt => Phase::FetchedFollowers,
            PhaseEvent::SnapshotFailed => Phase::FetchFollowersFailed,
            PhaseEvent::RetryFetch => Phase::FetchFollowersInProgress,
            PhaseEvent::StartFollowBack => Phase::FollowBackInProgress,
            PhaseEvent::FollowBackFinished => Phase::FollowedBack,
            PhaseEvent::Logout => Phase::BeforeLogin,
        }
    }

    /// Whether `state` has an outgoing edge for this event.
    pub fn is_accepted_in(&self, state: &LifecycleState) -> bool {
        <lifecycle_machine::Impl as StateMachineImpl>::transition(state, self).is_some()
    }
}
