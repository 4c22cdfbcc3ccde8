use crate::constants::{DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_DEPTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockingPolicy {
    /// Commits fail unless a lock manager is attached.
    Required,
    /// Use the lock manager when one is attached; the caller serializes otherwise.
    Optional,
}

#[derive(Clone, Debug)]
pub struct Traversal {
    pub max_depth: usize,
    pub detect_cycles: bool,
}

impl Default for Traversal {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detect_cycles: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Governance {
    pub locking: LockingPolicy,
    pub lock_timeout_ms: u64,
}

impl Default for Governance {
    fn default() -> Self {
        Self {
            locking: LockingPolicy::Optional,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditPolicy {
    pub redact_dry_run: bool,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            redact_dry_run: true,
        }
    }
}
