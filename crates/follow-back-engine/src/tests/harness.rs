//! Test harness for engine scenario tests.
//!
//! Provides:
//! - FakeRelationshipApi: an in-memory social graph with scripted failures
//! - TestHarness: wires the fake, a memory-backed session store and a
//!   controller, and records every phase change

use crate::{
    Actor, ApiError, EngineSettings, FollowBackController, Page, Phase, PhaseChanged,
    RelationshipApi, Session,
};
use async_trait::async_trait;
use followback_storage::{MemoryStorage, SessionStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const OWNER_DID: &str = "did:plc:owner";
pub const OWNER_HANDLE: &str = "owner.bsky.social";
pub const PASSWORD: &str = "hunter2";

/// Remote operations, used to script failures and inspect calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Login,
    Resume,
    Followers,
    Followings,
    Mutes,
    Follow,
}

/// A call received by the fake.
#[derive(Debug, Clone)]
pub struct Call {
    pub op: Op,
    pub access_jwt: Option<String>,
    pub actor: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

struct State {
    followers: Vec<Actor>,
    followings: Vec<Actor>,
    mutes: Vec<Actor>,
    page_size: usize,
    /// Remaining `AuthRequired` answers per operation.
    expiries: HashMap<Op, u32>,
    /// Operations that always fail with the given error.
    failures: HashMap<Op, ApiError>,
    /// Follow targets that always fail, by DID.
    follow_failures: HashMap<String, ApiError>,
    token_generation: u32,
    calls: Vec<Call>,
}

/// In-memory social graph implementing [`RelationshipApi`].
pub struct FakeRelationshipApi {
    state: Mutex<State>,
}

impl FakeRelationshipApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                followers: Vec::new(),
                followings: Vec::new(),
                mutes: Vec::new(),
                page_size: 2,
                expiries: HashMap::new(),
                failures: HashMap::new(),
                follow_failures: HashMap::new(),
                token_generation: 0,
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_graph(followers: Vec<Actor>, followings: Vec<Actor>, mutes: Vec<Actor>) -> Self {
        let api = Self::new();
        {
            let mut state = api.state.lock().unwrap();
            state.followers = followers;
            state.followings = followings;
            state.mutes = mutes;
        }
        api
    }

    /// The next `times` calls of `op` fail with an expired session.
    pub fn expire(&self, op: Op, times: u32) {
        self.state.lock().unwrap().expiries.insert(op, times);
    }

    /// Every call of `op` fails with `error` until cleared.
    pub fn fail(&self, op: Op, error: ApiError) {
        self.state.lock().unwrap().failures.insert(op, error);
    }

    pub fn clear_failure(&self, op: Op) {
        self.state.lock().unwrap().failures.remove(&op);
    }

    pub fn fail_follow(&self, did: &str, error: ApiError) {
        self.state
            .lock()
            .unwrap()
            .follow_failures
            .insert(did.to_string(), error);
    }

    /// Accounts the owner follows on the server side.
    pub fn server_followings(&self) -> Vec<Actor> {
        self.state.lock().unwrap().followings.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_of(&self, op: Op) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls_of(op).len()
    }

    fn record(
        &self,
        op: Op,
        session: Option<&Session>,
        actor: Option<&str>,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            op,
            access_jwt: session.map(|s| s.access_jwt.clone()),
            actor: actor.map(String::from),
            cursor: cursor.map(String::from),
            limit,
        });

        if let Some(error) = state.failures.get(&op) {
            return Err(error.clone());
        }
        if let Some(remaining) = state.expiries.get_mut(&op) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ApiError::AuthRequired("ExpiredToken".into()));
            }
        }
        Ok(())
    }

    fn page(&self, list: &[Actor], cursor: Option<&str>) -> Page<Actor> {
        let page_size = self.state.lock().unwrap().page_size;
        let offset: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        let end = (offset + page_size).min(list.len());
        let items = list.get(offset..end).unwrap_or_default().to_vec();
        let cursor = (end < list.len()).then(|| end.to_string());
        Page::new(items, cursor)
    }

    fn issue_session(&self) -> Session {
        let mut state = self.state.lock().unwrap();
        state.token_generation += 1;
        session_with_tokens(state.token_generation)
    }
}

#[async_trait]
impl RelationshipApi for FakeRelationshipApi {
    async fn login(&self, identifier: &str, password: &str) -> Result<Session, ApiError> {
        self.record(Op::Login, None, Some(identifier), None, None)?;
        if identifier != OWNER_HANDLE || password != PASSWORD {
            return Err(ApiError::Rejected {
                status: 401,
                error: "AuthenticationRequired".into(),
                message: "Invalid identifier or password".into(),
            });
        }
        Ok(self.issue_session())
    }

    async fn resume_session(&self, session: &Session) -> Result<Session, ApiError> {
        self.record(Op::Resume, Some(session), None, None, None)?;
        Ok(self.issue_session())
    }

    async fn list_followers(
        &self,
        session: &Session,
        actor: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError> {
        self.record(Op::Followers, Some(session), Some(actor), cursor, Some(limit))?;
        let list = self.state.lock().unwrap().followers.clone();
        Ok(self.page(&list, cursor))
    }

    async fn list_followings(
        &self,
        session: &Session,
        actor: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError> {
        self.record(Op::Followings, Some(session), Some(actor), cursor, Some(limit))?;
        let list = self.state.lock().unwrap().followings.clone();
        Ok(self.page(&list, cursor))
    }

    async fn list_mutes(
        &self,
        session: &Session,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError> {
        self.record(Op::Mutes, Some(session), None, cursor, Some(limit))?;
        let list = self.state.lock().unwrap().mutes.clone();
        Ok(self.page(&list, cursor))
    }

    async fn create_follow(&self, session: &Session, target: &Actor) -> Result<String, ApiError> {
        self.record(Op::Follow, Some(session), Some(&target.did), None, None)?;
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.follow_failures.get(&target.did) {
            return Err(error.clone());
        }
        state.followings.push(target.clone());
        Ok(format!(
            "at://{}/app.bsky.graph.follow/{}",
            session.did,
            state.followings.len()
        ))
    }
}

pub fn actor(did: &str) -> Actor {
    Actor::new(did, format!("{}.bsky.social", did))
}

pub fn actors(dids: &[&str]) -> Vec<Actor> {
    dids.iter().map(|d| actor(d)).collect()
}

pub fn dids(actors: &[Actor]) -> Vec<String> {
    actors.iter().map(|a| a.did.clone()).collect()
}

pub fn session_with_tokens(generation: u32) -> Session {
    Session {
        did: OWNER_DID.into(),
        handle: OWNER_HANDLE.into(),
        email: None,
        access_jwt: format!("access-{}", generation),
        refresh_jwt: format!("refresh-{}", generation),
    }
}

pub fn rejected(status: u16) -> ApiError {
    ApiError::Rejected {
        status,
        error: "InternalServerError".into(),
        message: "try again later".into(),
    }
}

/// Wires a controller to a fake service and a memory-backed session store.
pub struct TestHarness {
    pub api: Arc<FakeRelationshipApi>,
    pub store: Arc<SessionStore>,
    pub controller: FollowBackController,
    phases: Arc<Mutex<Vec<PhaseChanged>>>,
}

impl TestHarness {
    pub fn new(api: FakeRelationshipApi) -> Self {
        Self::with_settings(api, EngineSettings::default())
    }

    pub fn with_settings(api: FakeRelationshipApi, settings: EngineSettings) -> Self {
        let api = Arc::new(api);
        let store = Arc::new(SessionStore::new(Box::new(MemoryStorage::new())));
        let mut controller = FollowBackController::new(api.clone(), store.clone(), settings);

        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = phases.clone();
        controller.set_phase_observer(Box::new(move |change| {
            sink.lock().unwrap().push(change.clone());
        }));

        Self {
            api,
            store,
            controller,
            phases,
        }
    }

    /// Seed the store as if a previous run had logged in.
    pub fn with_stored_session(self) -> Self {
        self.store.save_session(&session_with_tokens(0)).unwrap();
        self
    }

    /// Every phase entered so far, in order.
    pub fn phases(&self) -> Vec<Phase> {
        self.phases.lock().unwrap().iter().map(|c| c.phase).collect()
    }

    pub fn phase_changes(&self) -> Vec<PhaseChanged> {
        self.phases.lock().unwrap().clone()
    }

    pub fn stored_session(&self) -> Option<Session> {
        self.store.load_session().unwrap()
    }

    /// Start if needed, log in with the owner's credentials and wait for
    /// the snapshot.
    pub async fn login(&mut self) {
        if self.controller.phase() == Phase::Initial {
            self.controller.start().await.unwrap();
        }
        self.controller
            .submit_login(crate::Credentials::new(OWNER_HANDLE, PASSWORD))
            .await
            .unwrap();
    }
}
