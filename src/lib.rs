#![forbid(unsafe_code)]
//! archive-reconcile: plan and apply the minimal set of structural edits that replaces an
//! archived node (and its subtree) by a staged workspace copy.
//!
//! Safety model highlights:
//! - Protected nodes (shared by several parents) are never deleted or overwritten; planning
//!   fails with `ProtectedNode` before the executor is called.
//! - Nodes of different structural kinds (document vs resource) are never reconciled;
//!   planning fails with `IncompatibleNodes`.
//! - Application is fail-fast and ordered; actions already applied when the executor fails
//!   are left in place.
//! - Storage is only touched through the caller's `ActionExecutor`.

pub mod adapters;
pub mod api;
pub mod constants;
pub mod logging;
pub mod policy;
pub mod types;

pub use api::*;
