//! Depth-first walk pairing the children of an old document with those of its replacement.
//!
//! Child actions are expressed relative to the old document, the parent context the old
//! children live in. Pairing:
//! 1. same identity, or equal archive references when both sides have one
//! 2. same name when at least one side has no archive reference
//!
//! In both passes the first unmatched candidate in link order wins. Unpaired old children
//! are unlinked (and deleted unless protected); unpaired new children are linked.
use crate::adapters::{ArchiveContentProvider, NodeRepository};
use crate::api::checker::ReplaceChecker;
use crate::api::errors::ReplaceError;
use crate::api::factory::ActionFactory;
use crate::api::manager::ActionManager;
use crate::policy::types::Traversal;
use crate::types::{ActionPlan, Node, NodeId};

pub struct TreeExplorer<'a> {
    repository: &'a dyn NodeRepository,
    archive: &'a dyn ArchiveContentProvider,
    traversal: &'a Traversal,
    factory: ActionFactory,
}

impl<'a> TreeExplorer<'a> {
    pub fn new(
        repository: &'a dyn NodeRepository,
        archive: &'a dyn ArchiveContentProvider,
        traversal: &'a Traversal,
    ) -> Self {
        Self {
            repository,
            archive,
            traversal,
            factory: ActionFactory,
        }
    }

    /// Plan the replacement of `old` (linked to `parent`) by `new`, including subtrees.
    /// # Errors
    /// `IncompatibleNodes` when a pair differs in kind, `ProtectedNode` from the checkers,
    /// `Lookup` when children cannot be read, `DepthExceeded`/`CycleDetected` for malformed trees.
    pub fn explore_replace(
        &self,
        old: &Node,
        new: &Node,
        parent: &Node,
        new_already_linked: bool,
        plan: &mut ActionPlan,
    ) -> Result<(), ReplaceError> {
        let mut ancestors: Vec<NodeId> = Vec::new();
        self.explore(old, new, parent, new_already_linked, plan, 0, &mut ancestors)
    }

    #[allow(clippy::too_many_arguments)]
    fn explore(
        &self,
        old: &Node,
        new: &Node,
        parent: &Node,
        new_already_linked: bool,
        plan: &mut ActionPlan,
        depth: usize,
        ancestors: &mut Vec<NodeId>,
    ) -> Result<(), ReplaceError> {
        if old.kind != new.kind {
            return Err(ReplaceError::IncompatibleNodes {
                old: old.id.clone(),
                new: new.id.clone(),
            });
        }
        if depth > self.traversal.max_depth {
            return Err(ReplaceError::DepthExceeded {
                limit: self.traversal.max_depth,
            });
        }
        if self.traversal.detect_cycles && ancestors.contains(&old.id) {
            return Err(ReplaceError::CycleDetected(old.id.clone()));
        }

        let checker = ReplaceChecker::for_node(old, self.archive);
        ancestors.push(old.id.clone());
        let res = checker.decide_actions(old, new, parent, new_already_linked, plan, |plan| {
            self.explore_children(old, new, plan, depth, ancestors)
        });
        ancestors.pop();
        res
    }

    fn explore_children(
        &self,
        old: &Node,
        new: &Node,
        plan: &mut ActionPlan,
        depth: usize,
        ancestors: &mut Vec<NodeId>,
    ) -> Result<(), ReplaceError> {
        let old_children = self.repository.children(old)?;
        let new_children = self.repository.children(new)?;
        let pairs = pair_children(&old_children, &new_children);
        log::trace!(
            "document {}: {} old / {} new children",
            old.id,
            old_children.len(),
            new_children.len()
        );

        let mut new_used = vec![false; new_children.len()];
        for (oc, matched) in old_children.iter().zip(&pairs) {
            match matched {
                Some(ni) => {
                    new_used[*ni] = true;
                    self.explore(oc, &new_children[*ni], old, false, plan, depth + 1, ancestors)?;
                }
                None => self.retire_child(oc, old, plan),
            }
        }
        for (nc, used) in new_children.iter().zip(new_used) {
            if !used {
                ActionManager::add_action_to_list(self.factory.link(nc, old), plan);
            }
        }
        Ok(())
    }

    /// Old child with no counterpart: detach it, and delete it unless other parents hold it.
    fn retire_child(&self, child: &Node, parent: &Node, plan: &mut ActionPlan) {
        ActionManager::add_action_to_list(self.factory.unlink(child, parent), plan);
        if child.protected {
            log::debug!("protected child {} only unlinked from {}", child.id, parent.id);
        } else {
            ActionManager::add_action_to_list(self.factory.delete(child), plan);
        }
    }
}

/// For each old child, the index of its paired new child.
fn pair_children(old: &[Node], new: &[Node]) -> Vec<Option<usize>> {
    let mut pairs: Vec<Option<usize>> = vec![None; old.len()];
    let mut taken = vec![false; new.len()];

    for (oi, o) in old.iter().enumerate() {
        let found = new.iter().enumerate().position(|(ni, n)| {
            !taken[ni]
                && (n.id == o.id
                    || matches!((&o.archive_ref, &n.archive_ref), (Some(a), Some(b)) if a == b))
        });
        if let Some(ni) = found {
            taken[ni] = true;
            pairs[oi] = Some(ni);
        }
    }

    for (oi, o) in old.iter().enumerate() {
        if pairs[oi].is_some() {
            continue;
        }
        let found = new.iter().enumerate().position(|(ni, n)| {
            !taken[ni]
                && n.name == o.name
                && (o.archive_ref.is_none() || n.archive_ref.is_none())
        });
        if let Some(ni) = found {
            taken[ni] = true;
            pairs[oi] = Some(ni);
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryRepository;
    use crate::types::{Action, ArchiveRef, NodeFileInfo};
    use std::path::Path;

    /// Everything archived is considered changed.
    struct ChangedArchive;

    impl ArchiveContentProvider for ChangedArchive {
        fn archived_node(&self, _reference: &ArchiveRef) -> Option<NodeFileInfo> {
            None
        }
        fn has_content_changed(&self, _info: &NodeFileInfo, _workspace_file: &Path) -> bool {
            true
        }
    }

    fn res(id: &str, name: &str) -> Node {
        Node::resource(id, name, "text/plain")
    }

    #[test]
    fn pairs_by_reference_then_by_name() {
        let old = vec![
            res("o1", "a").with_archive_ref("r1"),
            res("o2", "b").with_archive_ref("r2"),
            res("o3", "c"),
            res("o4", "d").with_archive_ref("r4"),
        ];
        let new = vec![
            res("n3", "c"),
            res("n1", "renamed").with_archive_ref("r1"),
            res("n4", "d").with_archive_ref("r9"),
            res("n2", "b"),
        ];
        // o4/n4 share a name but carry different references: not paired.
        assert_eq!(pair_children(&old, &new), vec![Some(1), Some(3), Some(0), None]);
    }

    #[test]
    fn kind_mismatch_fails_before_touching_the_plan() {
        let repo = MemoryRepository::new();
        let traversal = Traversal::default();
        let explorer = TreeExplorer::new(&repo, &ChangedArchive, &traversal);
        let mut plan = ActionPlan::new();
        let err = explorer
            .explore_replace(
                &Node::document("d", "x", "collection"),
                &res("r", "x"),
                &Node::document("p", "root", "collection"),
                false,
                &mut plan,
            )
            .unwrap_err();
        assert!(matches!(err, ReplaceError::IncompatibleNodes { .. }));
        assert!(plan.is_empty());
    }

    #[test]
    fn children_are_reconciled_depth_first() {
        let f = ActionFactory;
        let root = Node::document("root", "root", "collection");
        let old = Node::document("od", "doc", "collection").with_archive_ref("d");
        let new = Node::document("nd", "doc", "collection");
        let kept = res("k", "kept.txt");
        let changed_old = res("co", "c.txt").with_archive_ref("c");
        let changed_new = res("cn", "c.txt").with_archive_ref("c");
        let gone = res("g", "gone.txt");
        let shared_gone = res("s", "shared.txt").protected();
        let added = res("a", "added.txt");

        let repo = MemoryRepository::new()
            .with_children(&old, [kept.clone(), changed_old.clone(), gone.clone(), shared_gone.clone()])
            .with_children(&new, [changed_new.clone(), kept.clone(), added.clone()]);
        let traversal = Traversal::default();
        let explorer = TreeExplorer::new(&repo, &ChangedArchive, &traversal);
        let mut plan = ActionPlan::new();
        explorer
            .explore_replace(&old, &new, &root, false, &mut plan)
            .unwrap();

        assert_eq!(
            plan.actions(),
            &[
                f.unlink(&kept, &old),
                f.replace(&changed_old, &old, &changed_new, false),
                f.unlink(&gone, &old),
                f.delete(&gone),
                f.unlink(&shared_gone, &old),
                f.link(&added, &old),
                f.replace(&old, &root, &new, false),
            ]
        );
        assert!(!plan
            .iter()
            .any(|a| matches!(a, Action::Delete { node } if node.protected)));
    }

    #[test]
    fn nested_child_kind_mismatch_aborts() {
        let root = Node::document("root", "root", "collection");
        let old = Node::document("od", "doc", "collection");
        let new = Node::document("nd", "doc", "collection");
        let repo = MemoryRepository::new()
            .with_children(&old, [Node::document("x", "part", "collection")])
            .with_children(&new, [res("y", "part")]);
        let traversal = Traversal::default();
        let explorer = TreeExplorer::new(&repo, &ChangedArchive, &traversal);
        let mut plan = ActionPlan::new();
        let err = explorer
            .explore_replace(&old, &new, &root, false, &mut plan)
            .unwrap_err();
        assert!(matches!(err, ReplaceError::IncompatibleNodes { ref old, .. } if old.as_str() == "x"));
    }

    #[test]
    fn cycles_in_persisted_data_are_detected() {
        let root = Node::document("root", "root", "collection");
        let old = Node::document("od", "doc", "collection");
        let new = Node::document("nd", "doc", "collection");
        // Both trees loop back onto themselves under the same name.
        let repo = MemoryRepository::new()
            .with_children(&old, [old.clone()])
            .with_children(&new, [new.clone()]);
        let traversal = Traversal::default();
        let explorer = TreeExplorer::new(&repo, &ChangedArchive, &traversal);
        let mut plan = ActionPlan::new();
        let err = explorer
            .explore_replace(&old, &new, &root, false, &mut plan)
            .unwrap_err();
        assert!(matches!(err, ReplaceError::CycleDetected(ref id) if id.as_str() == "od"));
    }

    #[test]
    fn depth_limit_is_enforced_without_cycle_detection() {
        let root = Node::document("root", "root", "collection");
        let old = Node::document("od", "doc", "collection");
        let new = Node::document("nd", "doc", "collection");
        let repo = MemoryRepository::new()
            .with_children(&old, [old.clone()])
            .with_children(&new, [new.clone()]);
        let traversal = Traversal {
            max_depth: 4,
            detect_cycles: false,
        };
        let explorer = TreeExplorer::new(&repo, &ChangedArchive, &traversal);
        let mut plan = ActionPlan::new();
        let err = explorer
            .explore_replace(&old, &new, &root, false, &mut plan)
            .unwrap_err();
        assert!(matches!(err, ReplaceError::DepthExceeded { limit: 4 }));
    }
}
