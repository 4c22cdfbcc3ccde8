pub mod file;

use crate::types::errors::Result;

/// Held for the duration of a replace request; released on drop.
pub trait LockGuard {}

pub trait LockManager {
    /// Acquire an exclusive lock on `workspace` within the timeout.
    /// # Errors
    /// Returns an error if the lock cannot be acquired within the timeout period.
    fn acquire_workspace_lock(&self, workspace: &str, timeout_ms: u64) -> Result<Box<dyn LockGuard>>;
}
