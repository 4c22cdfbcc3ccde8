//! Shared crate-wide constants for archive-reconcile.
//!
//! Centralizes magic values and default labels used across modules.

/// Subsystem label attached to every emitted fact.
pub const SUBSYSTEM: &str = "archive-reconcile";

/// Default bound on document nesting explored by a single replace request.
/// Real archive trees are a handful of levels deep; anything near this is malformed data.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Depth bound used by `Policy::strict_preset()`.
pub const STRICT_MAX_DEPTH: usize = 64;

/// Poll interval in milliseconds for the file-backed lock manager (see `adapters/lock/file.rs`).
pub const LOCK_POLL_MS: u64 = 25;

/// Default lock timeout used when a lock manager is attached.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// UUIDv5 namespace tag for deterministic plan/action IDs.
pub const NS_TAG: &str = "https://archive-reconcile/replace";

/// Hash algorithm label written next to content checksums in facts.
pub const HASH_ALG: &str = "sha256";
