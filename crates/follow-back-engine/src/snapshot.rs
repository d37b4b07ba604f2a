//! Point-in-time capture of the owner's relationships.

use crate::{fetch_all, Actor, ApiError, RelationshipApi, SessionCell, SessionGuard};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Default page size for listing requests.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Largest page size the listing endpoints accept.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Followers, followings and mutes as listed by the service, in server order.
#[derive(Debug, Clone)]
pub struct RelationshipSnapshot {
    pub followers: Vec<Actor>,
    pub followings: Vec<Actor>,
    pub mutes: Vec<Actor>,
    pub captured_at: DateTime<Utc>,
}

/// Builds a [`RelationshipSnapshot`] for the session owner.
pub struct SnapshotBuilder {
    api: Arc<dyn RelationshipApi>,
    cell: Arc<SessionCell>,
    guard: SessionGuard,
    page_limit: u32,
}

impl SnapshotBuilder {
    pub fn new(api: Arc<dyn RelationshipApi>, cell: Arc<SessionCell>, guard: SessionGuard) -> Self {
        Self {
            api,
            cell,
            guard,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Fetch all three listings concurrently. Any failure fails the build.
    pub async fn build(&self) -> Result<RelationshipSnapshot, ApiError> {
        let owner = self.cell.require()?.did;

        let (followers, followings, mutes) = tokio::try_join!(
            self.followers(&owner),
            self.followings(&owner),
            self.mutes(),
        )?;

        info!(
            did = %owner,
            followers = followers.len(),
            followings = followings.len(),
            mutes = mutes.len(),
            "Relationship snapshot built"
        );

        Ok(RelationshipSnapshot {
            followers,
            followings,
            mutes,
            captured_at: Utc::now(),
        })
    }

    async fn followers(&self, actor: &str) -> Result<Vec<Actor>, ApiError> {
        let (api, cell, guard, limit) = (&*self.api, &*self.cell, &self.guard, self.page_limit);

        fetch_all("followers", move |cursor: Option<String>| async move {
            guard
                .run("app.bsky.graph.getFollowers", move || {
                    let cursor = cursor.clone();
                    async move {
                        let session = cell.require()?;
                        api.list_followers(&session, actor, cursor.as_deref(), limit)
                            .await
                    }
                })
                .await
        })
        .await
    }

    async fn followings(&self, actor: &str) -> Result<Vec<Actor>, ApiError> {
        let (api, cell, guard, limit) = (&*self.api, &*self.cell, &self.guard, self.page_limit);

        fetch_all("followings", move |cursor: Option<String>| async move {
            guard
                .run("app.bsky.graph.getFollows", move || {
                    let cursor = cursor.clone();
                    async move {
                        let session = cell.require()?;
                        api.list_followings(&session, actor, cursor.as_deref(), limit)
                            .await
                    }
                })
                .await
        })
        .await
    }

    async fn mutes(&self) -> Result<Vec<Actor>, ApiError> {
        let (api, cell, guard, limit) = (&*self.api, &*self.cell, &self.guard, self.page_limit);

        fetch_all("mutes", move |cursor: Option<String>| async move {
            guard
                .run("app.bsky.graph.getMutes", move || {
                    let cursor = cursor.clone();
                    async move {
                        let session = cell.require()?;
                        api.list_mutes(&session, cursor.as_deref(), limit).await
                    }
                })
                .await
        })
        .await
    }
}
