//! Lifecycle orchestration.
//!
//! [`FollowBackController`] is the only component that sees all the others.
//! It owns the session cell, drives the lifecycle FSM and publishes every
//! phase change to an optional observer.

use crate::lifecycle_fsm::{LifecycleMachine, Phase, PhaseEvent};
use crate::{
    reconcile, ApiError, BulkFollowExecutor, BulkFollowReport, Credentials, EngineError,
    EngineResult, FollowProgress, Reconciliation, RelationshipApi, RelationshipSnapshot,
    ResumeFailurePolicy, SessionCell, SessionGuard, SessionPersistence, SnapshotBuilder,
    StoredSessionResumer, DEFAULT_MAX_ATTEMPTS, DEFAULT_PAGE_LIMIT,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tunables for the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Page size for listing requests, clamped to the endpoint maximum.
    pub page_limit: u32,
    /// Total attempts for a call failing with an expired session.
    pub max_auth_attempts: u32,
    pub resume_failure_policy: ResumeFailurePolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            max_auth_attempts: DEFAULT_MAX_ATTEMPTS,
            resume_failure_policy: ResumeFailurePolicy::default(),
        }
    }
}

/// Identity of the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOwner {
    pub did: String,
    pub handle: String,
}

/// Payload for phase change notifications.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseChanged {
    pub phase: Phase,
    pub message_key: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_handle: Option<String>,
}

/// Callback type for phase change notifications.
pub type PhaseObserver = Box<dyn Fn(&PhaseChanged) + Send + Sync>;

/// Drives login, snapshot, reconciliation and bulk follow through the
/// lifecycle FSM.
///
/// Every operation takes `&mut self`, so at most one runs at a time.
pub struct FollowBackController {
    api: Arc<dyn RelationshipApi>,
    persistence: Arc<dyn SessionPersistence>,
    cell: Arc<SessionCell>,
    fsm: LifecycleMachine,
    snapshot_builder: SnapshotBuilder,
    executor: BulkFollowExecutor,
    snapshot: Option<RelationshipSnapshot>,
    reconciliation: Option<Reconciliation>,
    /// Why the stored session was rejected by the last `start`.
    resume_failure: Option<ApiError>,
    observer: Option<PhaseObserver>,
}

impl FollowBackController {
    pub fn new(
        api: Arc<dyn RelationshipApi>,
        persistence: Arc<dyn SessionPersistence>,
        settings: EngineSettings,
    ) -> Self {
        let cell = Arc::new(SessionCell::new());
        let resumer = Arc::new(StoredSessionResumer::new(
            api.clone(),
            cell.clone(),
            persistence.clone(),
        ));
        let guard = SessionGuard::new(resumer)
            .with_max_attempts(settings.max_auth_attempts)
            .with_policy(settings.resume_failure_policy);

        let snapshot_builder = SnapshotBuilder::new(api.clone(), cell.clone(), guard.clone())
            .with_page_limit(settings.page_limit);
        let executor = BulkFollowExecutor::new(api.clone(), cell.clone(), guard);

        Self {
            api,
            persistence,
            cell,
            fsm: LifecycleMachine::new(),
            snapshot_builder,
            executor,
            snapshot: None,
            reconciliation: None,
            resume_failure: None,
            observer: None,
        }
    }

    /// Set a callback to be notified of phase changes.
    pub fn set_phase_observer(&mut self, observer: PhaseObserver) {
        self.observer = Some(observer);
    }

    pub fn phase(&self) -> Phase {
        Phase::from(self.fsm.state())
    }

    pub fn snapshot(&self) -> Option<&RelationshipSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn reconciliation(&self) -> Option<&Reconciliation> {
        self.reconciliation.as_ref()
    }

    /// Set when `start` found a stored session the service no longer
    /// accepts. The user has to log in again.
    pub fn resume_failure(&self) -> Option<EngineError> {
        self.resume_failure
            .clone()
            .map(EngineError::SessionResumeFailed)
    }

    pub fn session_owner(&self) -> Option<SessionOwner> {
        self.cell.get().map(|s| SessionOwner {
            did: s.did,
            handle: s.handle,
        })
    }

    /// Leave `Initial`: resume the persisted session if there is one and
    /// fetch, otherwise wait for a login.
    ///
    /// A failed resume lands in `BeforeLogin` and is not an error.
    pub async fn start(&mut self) -> EngineResult<()> {
        let Some(stored) = self.persistence.load() else {
            info!("No stored session");
            self.transition(PhaseEvent::NoStoredSession)?;
            return Ok(());
        };

        if !self.transition(PhaseEvent::StoredSessionFound)? {
            return Ok(());
        }
        info!(did = %stored.did, handle = %stored.handle, "Resuming stored session");

        match self.api.resume_session(&stored).await {
            Ok(fresh) => {
                self.cell.replace(fresh.clone());
                self.persistence.save(&fresh);
                self.transition(PhaseEvent::SessionResumed)?;
                self.fetch().await
            }
            Err(e) => {
                warn!(did = %stored.did, error = %e, "Stored session could not be resumed");
                self.cell.clear();
                self.resume_failure = Some(e);
                self.transition(PhaseEvent::ResumeFailed)?;
                Ok(())
            }
        }
    }

    /// Log in, persist the session, then fetch.
    pub async fn submit_login(&mut self, credentials: Credentials) -> EngineResult<()> {
        if !self.transition(PhaseEvent::SubmitLogin)? {
            return Ok(());
        }
        info!(identifier = %credentials.identifier, "Logging in");

        match self
            .api
            .login(&credentials.identifier, credentials.password())
            .await
        {
            Ok(session) => {
                info!(did = %session.did, handle = %session.handle, "Logged in");
                self.resume_failure = None;
                self.cell.replace(session.clone());
                self.persistence.save(&session);
                self.transition(PhaseEvent::LoginSucceeded)?;
                self.fetch().await
            }
            Err(e) => {
                warn!(identifier = %credentials.identifier, error = %e, "Login failed");
                self.transition(PhaseEvent::LoginRejected)?;
                Err(EngineError::LoginFailed(e))
            }
        }
    }

    /// Fetch again after a failed snapshot.
    pub async fn retry_fetch(&mut self) -> EngineResult<()> {
        if !self.transition(PhaseEvent::RetryFetch)? {
            return Ok(());
        }
        self.fetch().await
    }

    /// Follow every follower not yet followed back, then reconcile again.
    ///
    /// Reaches `FollowedBack` even when some targets fail; the failures are in
    /// the returned report.
    pub async fn start_follow_back<F>(&mut self, on_progress: F) -> EngineResult<BulkFollowReport>
    where
        F: FnMut(FollowProgress<'_>),
    {
        let targets = match (&self.snapshot, &self.reconciliation) {
            (Some(_), Some(reconciliation)) => reconciliation.not_followed.clone(),
            _ => {
                return Err(EngineError::InvalidPhaseTransition(format!(
                    "Cannot apply {:?} in phase {:?} without a snapshot",
                    PhaseEvent::StartFollowBack,
                    self.phase()
                )))
            }
        };

        if !self.transition(PhaseEvent::StartFollowBack)? {
            return Ok(BulkFollowReport::default());
        }

        let report = match self.snapshot.as_mut() {
            Some(snapshot) => {
                self.executor
                    .follow_back_all(targets, &mut snapshot.followings, on_progress)
                    .await
            }
            None => BulkFollowReport::default(),
        };

        self.reconciliation = self
            .snapshot
            .as_ref()
            .map(|s| reconcile(&s.followers, &s.followings, &s.mutes));

        self.transition(PhaseEvent::FollowBackFinished)?;
        Ok(report)
    }

    /// Drop the session everywhere and return to `BeforeLogin`.
    pub fn logout(&mut self) -> EngineResult<()> {
        let event = PhaseEvent::Logout;
        if self.phase() == event.destination() {
            return Ok(());
        }
        if !event.is_accepted_in(self.fsm.state()) {
            return Err(self.invalid(event));
        }

        if let Some(session) = self.cell.clear() {
            info!(did = %session.did, "Logging out");
        }
        self.persistence.clear();
        self.snapshot = None;
        self.reconciliation = None;

        self.transition(event)?;
        Ok(())
    }

    async fn fetch(&mut self) -> EngineResult<()> {
        match self.snapshot_builder.build().await {
            Ok(snapshot) => {
                let reconciliation =
                    reconcile(&snapshot.followers, &snapshot.followings, &snapshot.mutes);
                info!(
                    not_followed = reconciliation.not_followed.len(),
                    already_followed = reconciliation.already_followed.len(),
                    muted = reconciliation.muted_followers,
                    "Reconciled followers"
                );
                self.snapshot = Some(snapshot);
                self.reconciliation = Some(reconciliation);
                self.transition(PhaseEvent::SnapshotBuilt)?;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Fetching relationships failed");
                self.snapshot = None;
                self.reconciliation = None;
                self.transition(PhaseEvent::SnapshotFailed)?;
                Err(match e {
                    ApiError::NotLoggedIn => EngineError::NotLoggedIn,
                    other => EngineError::FetchFailed(other),
                })
            }
        }
    }

    /// Apply `event`. Returns `Ok(false)` without side effects when already in
    /// the event's destination phase.
    fn transition(&mut self, event: PhaseEvent) -> EngineResult<bool> {
        let old_phase = self.phase();
        if old_phase == event.destination() {
            debug!(phase = ?old_phase, event = ?event, "Already in destination phase");
            return Ok(false);
        }

        self.fsm.consume(&event).map_err(|_| self.invalid(event))?;

        let new_phase = self.phase();
        debug!(old_phase = ?old_phase, new_phase = ?new_phase, "Lifecycle transition");
        self.notify_phase_change(new_phase);
        Ok(true)
    }

    fn invalid(&self, event: PhaseEvent) -> EngineError {
        EngineError::InvalidPhaseTransition(format!(
            "Cannot apply {:?} in phase {:?}",
            event,
            self.phase()
        ))
    }

    fn notify_phase_change(&self, phase: Phase) {
        if let Some(observer) = self.observer.as_ref() {
            observer(&PhaseChanged {
                phase,
                message_key: phase.message_key(),
                owner_handle: self.cell.get().map(|s| s.handle),
            });
        }
    }
}
