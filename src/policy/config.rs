use crate::constants::STRICT_MAX_DEPTH;

use super::types::{AuditPolicy, Governance, LockingPolicy, Traversal};

/// Policy governs traversal bounds, locking and audit behavior of a `ReplaceManager`.
///
/// Grouped fields provide clearer ownership and ergonomics.
#[derive(Clone, Debug, Default)]
pub struct Policy {
    pub traversal: Traversal,
    pub governance: Governance,
    pub audit: AuditPolicy,
}

impl Policy {
    /// Construct a Policy for unattended use.
    ///
    /// Tightens the defaults:
    /// - `governance.locking = Required`: committing without a lock manager fails with
    ///   `E_LOCKING` before any planning happens
    /// - `traversal.max_depth = STRICT_MAX_DEPTH`
    ///
    /// # Example
    /// ```rust
    /// use archive_reconcile::adapters::{FileLockManager, MemoryRepository};
    /// use archive_reconcile::logging::JsonlSink;
    /// use archive_reconcile::policy::Policy;
    /// # use archive_reconcile::adapters::{ActionExecutor, ArchiveContentProvider};
    /// # use archive_reconcile::types::{Action, ArchiveRef, ExecutorError, NodeFileInfo};
    /// # struct NoArchive;
    /// # impl ArchiveContentProvider for NoArchive {
    /// #     fn archived_node(&self, _r: &ArchiveRef) -> Option<NodeFileInfo> { None }
    /// #     fn has_content_changed(&self, _i: &NodeFileInfo, _p: &std::path::Path) -> bool { true }
    /// # }
    /// # struct Noop;
    /// # impl ActionExecutor for Noop {
    /// #     fn execute(&self, _a: &Action) -> Result<(), ExecutorError> { Ok(()) }
    /// # }
    ///
    /// let api = archive_reconcile::ReplaceManager::new(
    ///     JsonlSink,
    ///     JsonlSink,
    ///     Policy::strict_preset(),
    ///     MemoryRepository::new(),
    ///     NoArchive,
    ///     Noop,
    /// )
    /// .with_lock_manager(Box::new(FileLockManager::new(std::env::temp_dir())));
    /// # let _ = api;
    /// ```
    #[must_use]
    pub fn strict_preset() -> Self {
        let mut p = Self::default();
        p.apply_strict_preset();
        p
    }

    /// Mutate this Policy to apply the strict preset.
    pub fn apply_strict_preset(&mut self) -> &mut Self {
        self.governance.locking = LockingPolicy::Required;
        self.traversal.max_depth = STRICT_MAX_DEPTH;
        self
    }
}
