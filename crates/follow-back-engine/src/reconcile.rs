//! Follow-back reconciliation.

use crate::Actor;
use serde::Serialize;
use std::collections::HashSet;

/// Partition of the followers list.
///
/// `not_followed`, `already_followed` and the muted followers are pairwise
/// disjoint and together cover every follower, compared by DID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Followers not followed back and not muted, in followers order.
    pub not_followed: Vec<Actor>,
    /// Followers already followed back and not muted, in followers order.
    pub already_followed: Vec<Actor>,
    /// Number of followers dropped because they are muted.
    pub muted_followers: usize,
}

impl Reconciliation {
    pub fn is_settled(&self) -> bool {
        self.not_followed.is_empty()
    }
}

/// Classify each follower. Mutes win over follow status.
pub fn reconcile(followers: &[Actor], followings: &[Actor], mutes: &[Actor]) -> Reconciliation {
    let following: HashSet<&str> = followings.iter().map(|a| a.did.as_str()).collect();
    let muted: HashSet<&str> = mutes.iter().map(|a| a.did.as_str()).collect();

    let mut result = Reconciliation::default();
    for follower in followers {
        let did = follower.did.as_str();
        if muted.contains(did) {
            result.muted_followers += 1;
        } else if following.contains(did) {
            result.already_followed.push(follower.clone());
        } else {
            result.not_followed.push(follower.clone());
        }
    }
    result
}
