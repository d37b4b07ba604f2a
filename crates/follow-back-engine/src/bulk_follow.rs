//! Sequential bulk follow with per-target isolation.

use crate::{Actor, ApiError, RelationshipApi, SessionCell, SessionGuard};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of following a single target.
#[derive(Debug, Clone, Copy)]
pub enum FollowOutcome<'a> {
    Followed,
    Failed(&'a ApiError),
}

/// Progress notification emitted after each target.
#[derive(Debug, Clone, Copy)]
pub struct FollowProgress<'a> {
    /// 1-based position in the batch.
    pub index: usize,
    pub total: usize,
    pub actor: &'a Actor,
    pub outcome: FollowOutcome<'a>,
}

/// A target that could not be followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowFailure {
    pub actor: Actor,
    pub error: ApiError,
}

/// Summary of a bulk follow batch.
#[derive(Debug, Clone, Default)]
pub struct BulkFollowReport {
    pub followed: Vec<Actor>,
    pub failures: Vec<FollowFailure>,
}

impl BulkFollowReport {
    pub fn attempted(&self) -> usize {
        self.followed.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Follows a fixed list of targets one at a time.
pub struct BulkFollowExecutor {
    api: Arc<dyn RelationshipApi>,
    cell: Arc<SessionCell>,
    guard: SessionGuard,
}

impl BulkFollowExecutor {
    pub fn new(api: Arc<dyn RelationshipApi>, cell: Arc<SessionCell>, guard: SessionGuard) -> Self {
        Self { api, cell, guard }
    }

    /// Follow every target in order, one request in flight at a time.
    ///
    /// A failed target is recorded and skipped. Each followed target is
    /// appended to `followings` as soon as its request succeeds. `targets` is
    /// owned, so growing `followings` cannot change what gets iterated.
    pub async fn follow_back_all<F>(
        &self,
        targets: Vec<Actor>,
        followings: &mut Vec<Actor>,
        mut on_progress: F,
    ) -> BulkFollowReport
    where
        F: FnMut(FollowProgress<'_>),
    {
        let total = targets.len();
        let mut report = BulkFollowReport::default();
        info!(total, "Starting follow-back batch");

        for (i, target) in targets.into_iter().enumerate() {
            let index = i + 1;
            match self.follow_one(&target).await {
                Ok(uri) => {
                    debug!(did = %target.did, uri = %uri, index, total, "Followed");
                    followings.push(target.clone());
                    on_progress(FollowProgress {
                        index,
                        total,
                        actor: &target,
                        outcome: FollowOutcome::Followed,
                    });
                    report.followed.push(target);
                }
                Err(e) => {
                    error!(
                        did = %target.did,
                        handle = %target.handle,
                        error = %e,
                        index,
                        total,
                        "Follow failed"
                    );
                    on_progress(FollowProgress {
                        index,
                        total,
                        actor: &target,
                        outcome: FollowOutcome::Failed(&e),
                    });
                    report.failures.push(FollowFailure {
                        actor: target,
                        error: e,
                    });
                }
            }
        }

        info!(
            followed = report.followed.len(),
            failed = report.failures.len(),
            "Follow-back batch finished"
        );
        report
    }

    async fn follow_one(&self, target: &Actor) -> Result<String, ApiError> {
        let (api, cell) = (&*self.api, &*self.cell);

        self.guard
            .run("com.atproto.repo.createRecord", move || async move {
                let session = cell.require()?;
                api.create_follow(&session, target).await
            })
            .await
    }
}
