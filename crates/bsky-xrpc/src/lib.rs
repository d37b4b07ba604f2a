//! AT Protocol XRPC client.
//!
//! [`XrpcClient`] implements the engine's [`RelationshipApi`] against a
//! Bluesky service:
//!
//! - `com.atproto.server.createSession` for login
//! - `com.atproto.server.getSession` and `refreshSession` for resume
//! - `app.bsky.graph.getFollowers`, `getFollows` and `getMutes` for listings
//! - `com.atproto.repo.createRecord` for follow records
//!
//! [`RelationshipApi`]: follow_back_engine::RelationshipApi

mod client;
mod error;
mod types;

pub use client::XrpcClient;
pub use error::{XrpcError, XrpcResult};
pub use types::FOLLOW_COLLECTION;
