//! reqwest-based XRPC client implementing [`RelationshipApi`].

use crate::error::{XrpcError, XrpcResult};
use crate::types::*;
use async_trait::async_trait;
use follow_back_engine::{Actor, ApiError, Page, RelationshipApi, Session};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

const USER_AGENT: &str = concat!("followback/", env!("CARGO_PKG_VERSION"));

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Turn a non-success response into an [`XrpcError::Xrpc`].
///
/// The raw body is never kept; a body that is not an XRPC error object is
/// replaced by its summary.
fn classify_failure(status: u16, body: &str) -> XrpcError {
    let parsed: XrpcErrorBody = serde_json::from_str(body).unwrap_or_default();
    let error = parsed.error.unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .replace(' ', "")
    });
    let message = parsed
        .message
        .unwrap_or_else(|| format!("upstream error ({})", summarize_response_body(body)));
    XrpcError::Xrpc {
        status,
        error,
        message,
    }
}

/// Client for one AT Protocol service (PDS or entryway).
#[derive(Clone, Debug)]
pub struct XrpcClient {
    http_client: reqwest::Client,
    service_url: Url,
}

impl XrpcClient {
    /// Create a client for `service_url` (e.g. `https://bsky.social`).
    ///
    /// `timeout` bounds every request end to end.
    pub fn new(service_url: Url, timeout: Duration) -> XrpcResult<Self> {
        if service_url.cannot_be_a_base() {
            return Err(XrpcError::Config(format!(
                "Service URL cannot be a base: {}",
                service_url
            )));
        }
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http_client,
            service_url,
        })
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    /// Build `<service>/xrpc/<nsid>?<params>`.
    fn endpoint(&self, nsid: &str, params: &[(&str, &str)]) -> XrpcResult<Url> {
        let mut url = self.service_url.clone();
        url.path_segments_mut()
            .map_err(|_| XrpcError::Config(format!("Invalid service URL: {}", self.service_url)))?
            .pop_if_empty()
            .push("xrpc")
            .push(nsid);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        nsid: &str,
        params: &[(&str, &str)],
        token: &str,
    ) -> XrpcResult<T> {
        let url = self.endpoint(nsid, params)?;
        debug!(nsid, "XRPC query");

        let request = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .header("Accept", "application/json");
        self.send(nsid, request).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        nsid: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> XrpcResult<T> {
        let url = self.endpoint(nsid, &[])?;
        debug!(nsid, "XRPC procedure");

        let mut request = self
            .http_client
            .post(url)
            .header("Accept", "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(nsid, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        nsid: &str,
        request: reqwest::RequestBuilder,
    ) -> XrpcResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &body);
            error!(
                nsid,
                status = %status,
                body_summary = %summarize_response_body(&body),
                auth = err.is_auth_failure(),
                "XRPC call failed"
            );
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                nsid,
                body_summary = %summarize_response_body(&body),
                error = %e,
                "Unexpected XRPC response shape"
            );
            XrpcError::Json(e)
        })
    }

    async fn refresh(&self, session: &Session) -> XrpcResult<Session> {
        let resp: SessionResponse = self
            .post::<(), _>(REFRESH_SESSION, None, Some(&session.refresh_jwt))
            .await?;
        Ok(resp.into_session(session.email.clone()))
    }
}

#[async_trait]
impl RelationshipApi for XrpcClient {
    async fn login(&self, identifier: &str, password: &str) -> Result<Session, ApiError> {
        let body = CreateSessionRequest {
            identifier,
            password,
        };
        let resp: SessionResponse = self.post(CREATE_SESSION, Some(&body), None).await?;
        info!(did = %resp.did, handle = %resp.handle, "Session created");
        Ok(resp.into_session(None))
    }

    /// Check the access token with `getSession`; refresh the tokens when it
    /// is no longer accepted.
    async fn resume_session(&self, session: &Session) -> Result<Session, ApiError> {
        match self
            .get::<GetSessionResponse>(GET_SESSION, &[], &session.access_jwt)
            .await
        {
            Ok(current) => Ok(Session {
                did: current.did,
                handle: current.handle,
                email: current.email.or_else(|| session.email.clone()),
                access_jwt: session.access_jwt.clone(),
                refresh_jwt: session.refresh_jwt.clone(),
            }),
            Err(e) if e.is_auth_failure() => {
                debug!(did = %session.did, "Access token rejected, refreshing session");
                let refreshed = self.refresh(session).await?;
                info!(did = %refreshed.did, "Session refreshed");
                Ok(refreshed)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_followers(
        &self,
        session: &Session,
        actor: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError> {
        let limit = limit.to_string();
        let params = list_params(Some(actor), &limit, cursor);
        let resp: FollowersResponse = self
            .get(GET_FOLLOWERS, &params, &session.access_jwt)
            .await?;
        Ok(Page::new(resp.followers, resp.cursor))
    }

    async fn list_followings(
        &self,
        session: &Session,
        actor: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError> {
        let limit = limit.to_string();
        let params = list_params(Some(actor), &limit, cursor);
        let resp: FollowsResponse = self.get(GET_FOLLOWS, &params, &session.access_jwt).await?;
        Ok(Page::new(resp.follows, resp.cursor))
    }

    async fn list_mutes(
        &self,
        session: &Session,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError> {
        let limit = limit.to_string();
        let params = list_params(None, &limit, cursor);
        let resp: MutesResponse = self.get(GET_MUTES, &params, &session.access_jwt).await?;
        Ok(Page::new(resp.mutes, resp.cursor))
    }

    async fn create_follow(&self, session: &Session, target: &Actor) -> Result<String, ApiError> {
        let body = CreateRecordRequest {
            repo: &session.did,
            collection: FOLLOW_COLLECTION,
            record: FollowRecord {
                record_type: FOLLOW_COLLECTION,
                subject: &target.did,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        };
        let resp: CreateRecordResponse = self
            .post(CREATE_RECORD, Some(&body), Some(&session.access_jwt))
            .await?;
        Ok(resp.uri)
    }
}

fn list_params<'a>(
    actor: Option<&'a str>,
    limit: &'a str,
    cursor: Option<&'a str>,
) -> Vec<(&'static str, &'a str)> {
    let mut params = Vec::with_capacity(3);
    if let Some(actor) = actor {
        params.push(("actor", actor));
    }
    params.push(("limit", limit));
    if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
        params.push(("cursor", cursor));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> XrpcClient {
        XrpcClient::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_appends_xrpc_path() {
        let c = client("https://bsky.social");
        let url = c.endpoint(GET_SESSION, &[]).unwrap();
        assert_eq!(url.as_str(), "https://bsky.social/xrpc/com.atproto.server.getSession");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let c = client("https://pds.example.com/proxy/");
        let url = c.endpoint(GET_MUTES, &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://pds.example.com/proxy/xrpc/app.bsky.graph.getMutes"
        );
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let c = client("https://bsky.social");
        let params = list_params(Some("did:plc:owner"), "100", Some("a b&c"));
        let url = c.endpoint(GET_FOLLOWERS, &params).unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("actor".to_string(), "did:plc:owner".to_string()),
                ("limit".to_string(), "100".to_string()),
                ("cursor".to_string(), "a b&c".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_params_skip_missing_and_empty_cursor() {
        assert_eq!(list_params(None, "50", None), vec![("limit", "50")]);
        assert_eq!(
            list_params(Some("did:plc:x"), "50", Some("")),
            vec![("actor", "did:plc:x"), ("limit", "50")]
        );
    }

    #[test]
    fn test_new_rejects_non_base_url() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        let result = XrpcClient::new(url, Duration::from_secs(5));
        assert!(matches!(result, Err(XrpcError::Config(_))));
    }

    #[test]
    fn test_classify_xrpc_error_body() {
        let err = classify_failure(400, r#"{"error":"ExpiredToken","message":"Token has expired"}"#);
        assert!(err.is_auth_failure());
        match err {
            XrpcError::Xrpc {
                status,
                error,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(error, "ExpiredToken");
                assert_eq!(message, "Token has expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_non_json_body_is_summarized() {
        let body = "<html>secret upstream page</html>";
        let err = classify_failure(502, body);
        assert!(!err.is_auth_failure());
        match err {
            XrpcError::Xrpc { error, message, .. } => {
                assert_eq!(error, "BadGateway");
                assert!(!message.contains("secret"));
                assert!(message.contains(&format!("len={}", body.len())));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_bare_unauthorized() {
        let err = classify_failure(401, "");
        assert!(err.is_auth_failure());
        assert_eq!(
            ApiError::from(err),
            ApiError::AuthRequired("Unauthorized".to_string())
        );
    }

    #[test]
    fn test_summary_is_stable_and_opaque() {
        let a = summarize_response_body("hello");
        assert_eq!(a, summarize_response_body("hello"));
        assert_ne!(a, summarize_response_body("hellp"));
        assert!(a.starts_with("len=5,digest="));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let c = XrpcClient::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            Duration::from_millis(500),
        )
        .unwrap();

        let err = c.login("alice.bsky.social", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
