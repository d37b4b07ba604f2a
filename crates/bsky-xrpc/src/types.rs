//! Request and response bodies for the XRPC methods we call.

use follow_back_engine::{Actor, Session};
use serde::{Deserialize, Serialize};

pub const CREATE_SESSION: &str = "com.atproto.server.createSession";
pub const GET_SESSION: &str = "com.atproto.server.getSession";
pub const REFRESH_SESSION: &str = "com.atproto.server.refreshSession";
pub const GET_FOLLOWERS: &str = "app.bsky.graph.getFollowers";
pub const GET_FOLLOWS: &str = "app.bsky.graph.getFollows";
pub const GET_MUTES: &str = "app.bsky.graph.getMutes";
pub const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

/// Collection and `$type` of follow records.
pub const FOLLOW_COLLECTION: &str = "app.bsky.graph.follow";

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Returned by `createSession` and `refreshSession`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub email: Option<String>,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

impl SessionResponse {
    pub fn into_session(self, fallback_email: Option<String>) -> Session {
        Session {
            did: self.did,
            handle: self.handle,
            email: self.email.or(fallback_email),
            access_jwt: self.access_jwt,
            refresh_jwt: self.refresh_jwt,
        }
    }
}

/// Returned by `getSession`. Carries no tokens.
#[derive(Debug, Deserialize)]
pub(crate) struct GetSessionResponse {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FollowersResponse {
    pub followers: Vec<Actor>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FollowsResponse {
    pub follows: Vec<Actor>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MutesResponse {
    pub mutes: Vec<Actor>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FollowRecord<'a> {
    #[serde(rename = "$type")]
    pub record_type: &'static str,
    pub subject: &'a str,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRecordRequest<'a> {
    pub repo: &'a str,
    pub collection: &'static str,
    pub record: FollowRecord<'a>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRecordResponse {
    pub uri: String,
}

/// Error body shared by every XRPC method.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct XrpcErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_followers_response_ignores_unknown_fields() {
        let body = r#"{
            "subject": {"did": "did:plc:owner", "handle": "owner.bsky.social"},
            "followers": [
                {"did": "did:plc:a", "handle": "a.bsky.social", "displayName": "Alice",
                 "avatar": "https://cdn.example/a.jpg", "indexedAt": "2024-01-01T00:00:00Z"},
                {"did": "did:plc:b", "handle": "b.bsky.social"}
            ],
            "cursor": "3kz"
        }"#;

        let resp: FollowersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.followers.len(), 2);
        assert_eq!(resp.followers[0].display_name.as_deref(), Some("Alice"));
        assert!(resp.followers[1].display_name.is_none());
        assert_eq!(resp.cursor.as_deref(), Some("3kz"));
    }

    #[test]
    fn test_last_page_has_no_cursor() {
        let resp: MutesResponse = serde_json::from_str(r#"{"mutes": []}"#).unwrap();
        assert!(resp.mutes.is_empty());
        assert!(resp.cursor.is_none());
    }

    #[test]
    fn test_session_response_keeps_previous_email_when_absent() {
        let body = r#"{"did": "did:plc:owner", "handle": "owner.bsky.social",
                       "accessJwt": "a", "refreshJwt": "r"}"#;
        let resp: SessionResponse = serde_json::from_str(body).unwrap();
        let session = resp.into_session(Some("owner@example.com".into()));

        assert_eq!(session.email.as_deref(), Some("owner@example.com"));
        assert_eq!(session.access_jwt, "a");
        assert_eq!(session.refresh_jwt, "r");
    }

    #[test]
    fn test_follow_record_shape() {
        let request = CreateRecordRequest {
            repo: "did:plc:owner",
            collection: FOLLOW_COLLECTION,
            record: FollowRecord {
                record_type: FOLLOW_COLLECTION,
                subject: "did:plc:a",
                created_at: "2024-01-01T00:00:00Z".to_string(),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["repo"], "did:plc:owner");
        assert_eq!(json["collection"], "app.bsky.graph.follow");
        assert_eq!(json["record"]["$type"], "app.bsky.graph.follow");
        assert_eq!(json["record"]["subject"], "did:plc:a");
        assert_eq!(json["record"]["createdAt"], "2024-01-01T00:00:00Z");
    }
}
