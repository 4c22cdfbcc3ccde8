//! Per-node replace decision.
//!
//! Steps, evaluated in order; the first that applies settles the node:
//! 1. same identity: unlink the old node from `parent`
//! 2. old node protected: fail
//! 3. old node external or formats differ: unlink old, delete old, link new
//! 4. compare archived content of the old node with the new node's workspace file
//!
//! Documents reconcile their children between steps 3 and 4.
use crate::adapters::ArchiveContentProvider;
use crate::api::errors::ReplaceError;
use crate::api::factory::ActionFactory;
use crate::api::manager::ActionManager;
use crate::types::{ActionPlan, Node, NodeFileInfo, NodeKind};

pub struct ReplaceChecker<'a> {
    kind: NodeKind,
    archive: &'a dyn ArchiveContentProvider,
    factory: ActionFactory,
}

impl<'a> ReplaceChecker<'a> {
    /// Checker for the structural kind of `old`.
    pub fn for_node(old: &Node, archive: &'a dyn ArchiveContentProvider) -> Self {
        Self {
            kind: old.kind,
            archive,
            factory: ActionFactory,
        }
    }

    /// Decide the actions for one `(old, new, parent)` triple. Documents call
    /// `reconcile_children` once the node itself is known to be reconciled in place.
    /// # Errors
    /// `ProtectedNode` when a destructive action would target a protected node; any error
    /// returned by `reconcile_children`.
    pub fn decide_actions<F>(
        &self,
        old: &Node,
        new: &Node,
        parent: &Node,
        new_already_linked: bool,
        plan: &mut ActionPlan,
        reconcile_children: F,
    ) -> Result<(), ReplaceError>
    where
        F: FnOnce(&mut ActionPlan) -> Result<(), ReplaceError>,
    {
        if self.settle_node(old, new, parent, plan)? {
            return Ok(());
        }
        match self.kind {
            NodeKind::Document => reconcile_children(plan)?,
            NodeKind::Resource => {}
        }
        self.decide_content(old, new, parent, new_already_linked, plan)
    }

    /// `decide_actions` for nodes whose children are not explored.
    /// # Errors
    /// See [`ReplaceChecker::decide_actions`].
    pub fn decide_leaf(
        &self,
        old: &Node,
        new: &Node,
        parent: &Node,
        new_already_linked: bool,
        plan: &mut ActionPlan,
    ) -> Result<(), ReplaceError> {
        self.decide_actions(old, new, parent, new_already_linked, plan, |_| Ok(()))
    }

    /// Steps 1 to 3. Returns true when the node is settled.
    fn settle_node(
        &self,
        old: &Node,
        new: &Node,
        parent: &Node,
        plan: &mut ActionPlan,
    ) -> Result<bool, ReplaceError> {
        if old.id == new.id {
            log::debug!("node {} replaces itself; unlinking from {}", old.id, parent.id);
            ActionManager::add_action_to_list(self.factory.unlink(old, parent), plan);
            return Ok(true);
        }
        ensure_unprotected(old)?;
        if old.external || old.format != new.format {
            log::debug!(
                "node {} not reconcilable in place (external={}, format {} -> {})",
                old.id,
                old.external,
                old.format,
                new.format
            );
            ActionManager::add_action_to_list(self.factory.unlink(old, parent), plan);
            ActionManager::add_action_to_list(self.factory.delete(old), plan);
            ActionManager::add_action_to_list(self.factory.link(new, parent), plan);
            return Ok(true);
        }
        Ok(false)
    }

    /// Step 4. A replacement keeps the archived fingerprint it was decided against.
    fn decide_content(
        &self,
        old: &Node,
        new: &Node,
        parent: &Node,
        new_already_linked: bool,
        plan: &mut ActionPlan,
    ) -> Result<(), ReplaceError> {
        let (changed, archived) = self.compare_content(old, new);
        if changed {
            let added = ActionManager::add_action_to_list(
                self.factory.replace(old, parent, new, new_already_linked),
                plan,
            );
            if let (true, Some(info)) = (added, archived) {
                plan.record_fingerprint(&old.id, info);
            }
        } else if new_already_linked {
            // The new node duplicates the archived one; retract it and keep the old node.
            ensure_unprotected(new)?;
            ActionManager::add_action_to_list(self.factory.unlink(new, parent), plan);
            ActionManager::add_action_to_list(self.factory.delete(new), plan);
            ActionManager::add_action_to_list(self.factory.link(old, parent), plan);
        } else {
            log::debug!(
                "node {} unchanged by {}; old node stays linked to {}",
                old.id,
                new.id,
                parent.id
            );
        }
        Ok(())
    }

    /// Whether `new` differs from the archived content of `old`, with the archived fingerprint
    /// when the archive holds one. No fingerprint or no workspace file counts as changed.
    fn compare_content(&self, old: &Node, new: &Node) -> (bool, Option<NodeFileInfo>) {
        let Some(info) = old
            .archive_ref
            .as_ref()
            .and_then(|r| self.archive.archived_node(r))
        else {
            return (true, None);
        };
        let changed = new
            .file_path()
            .map_or(true, |file| self.archive.has_content_changed(&info, file));
        (changed, Some(info))
    }
}

fn ensure_unprotected(node: &Node) -> Result<(), ReplaceError> {
    if node.protected {
        log::warn!("refusing to mutate protected node {}", node.id);
        return Err(ReplaceError::ProtectedNode {
            node: node.id.clone(),
            workspace: node.workspace.clone(),
        });
    }
    Ok(())
}
