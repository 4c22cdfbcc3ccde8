// Facade for the replace engine; delegates to submodules under src/api/

use log::Level;

use crate::adapters::{ActionExecutor, ArchiveContentProvider, LockManager, NodeRepository};
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;
use crate::types::{ActionPlan, ApplyMode, ApplyReport, Node};

mod apply;
pub mod checker;
pub mod errors;
pub mod explorer;
pub mod factory;
pub mod manager;
mod plan;

pub use checker::ReplaceChecker;
pub use errors::ReplaceError;
pub use explorer::TreeExplorer;
pub use factory::ActionFactory;
pub use manager::ActionManager;

/// One replacement: `old` (linked to `parent`) is to be reconciled against `new`.
#[derive(Clone, Copy, Debug)]
pub struct ReplaceRequest<'a> {
    pub old: &'a Node,
    pub new: &'a Node,
    pub parent: &'a Node,
    /// Whether `new` has already been linked to `parent` by an earlier step.
    pub new_already_linked: bool,
}

impl<'a> ReplaceRequest<'a> {
    #[must_use]
    pub const fn new(old: &'a Node, new: &'a Node, parent: &'a Node) -> Self {
        Self {
            old,
            new,
            parent,
            new_already_linked: false,
        }
    }

    #[must_use]
    pub fn already_linked(mut self, linked: bool) -> Self {
        self.new_already_linked = linked;
        self
    }
}

pub struct ReplaceManager<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    repository: Box<dyn NodeRepository>,
    archive: Box<dyn ArchiveContentProvider>,
    executor: Box<dyn ActionExecutor>,
    lock: Option<Box<dyn LockManager>>, // None unless the caller wants the engine to serialize
}

impl<E: FactsEmitter, A: AuditSink> ReplaceManager<E, A> {
    pub fn new(
        facts: E,
        audit: A,
        policy: Policy,
        repository: impl NodeRepository + 'static,
        archive: impl ArchiveContentProvider + 'static,
        executor: impl ActionExecutor + 'static,
    ) -> Self {
        Self {
            facts,
            audit,
            policy,
            repository: Box::new(repository),
            archive: Box::new(archive),
            executor: Box::new(executor),
            lock: None,
        }
    }

    pub fn with_lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Replace `old` (linked to `parent`) by `new`, subtree included, and apply the edits.
    ///
    /// On executor failure the actions applied so far stay applied.
    /// # Errors
    /// Any [`ReplaceError`]; planning errors occur before the executor is called.
    pub fn replace_tree(&self, old: &Node, new: &Node, parent: &Node) -> Result<(), ReplaceError> {
        self.replace(ReplaceRequest::new(old, new, parent), ApplyMode::Commit)
            .map(|_| ())
    }

    /// Plan and apply one request in the given mode, returning what was executed.
    /// # Errors
    /// Any [`ReplaceError`].
    pub fn replace(
        &self,
        request: ReplaceRequest<'_>,
        mode: ApplyMode,
    ) -> Result<ApplyReport, ReplaceError> {
        apply::run(self, request, mode)
    }

    /// Decision phase only. Emits one `plan` fact per action.
    /// # Errors
    /// Planning errors (`ProtectedNode`, `IncompatibleNodes`, `Lookup`, malformed trees).
    pub fn plan(&self, request: ReplaceRequest<'_>) -> Result<ActionPlan, ReplaceError> {
        let mut plan = ActionPlan::new();
        plan::build(self, request, &mut plan)?;
        plan::emit_facts(self, &plan, ApplyMode::DryRun);
        Ok(plan)
    }

    /// Apply a previously built plan. `DryRun` emits facts without calling the executor.
    /// `Commit` takes the workspace lock the same way `replace` does.
    /// # Errors
    /// `LockingTimeout` when the lock cannot be taken; `ExecutorFailure` for the first rejected
    /// action.
    pub fn apply(&self, plan: &ActionPlan, mode: ApplyMode) -> Result<ApplyReport, ReplaceError> {
        self.audit.log(Level::Info, "apply: starting");
        let res = apply::apply_locked(self, plan, mode);
        self.audit.log(Level::Info, "apply: finished");
        res
    }
}
