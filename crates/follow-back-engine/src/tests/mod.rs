//! Scenario tests for the follow-back engine.
//!
//! - `harness.rs`       - In-memory relationship service and controller wiring
//! - `lifecycle.rs`     - Phase transitions for start, login, fetch and logout
//! - `session_expiry.rs` - Resume-and-retry behaviour on expired sessions
//! - `snapshot.rs`      - Pagination and scoping of the three listings
//! - `follow_back.rs`   - Bulk follow, per-target isolation, re-reconciliation

pub(crate) mod harness;
