use std::collections::HashMap;

use super::node::{Node, NodeFileInfo, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ApplyMode {
    #[default]
    DryRun,
    Commit,
}

/// Tag of an [`Action`], used for facts and deterministic ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Delete,
    Link,
    Unlink,
    MoveLinkLocation,
    Replace,
    RemoveArchiveReference,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Delete => "delete",
            ActionKind::Link => "link",
            ActionKind::Unlink => "unlink",
            ActionKind::MoveLinkLocation => "move_link_location",
            ActionKind::Replace => "replace",
            ActionKind::RemoveArchiveReference => "remove_archive_reference",
        }
    }
}

/// One structural edit for the executor.
///
/// Equality is structural over node identities: two actions are equal when they have the
/// same kind, refer to the same node ids and (for `Replace`) carry the same linked flag.
#[derive(Clone, Debug)]
pub enum Action {
    Delete {
        node: Node,
    },
    Link {
        node: Node,
        parent: Node,
    },
    Unlink {
        node: Node,
        parent: Node,
    },
    MoveLinkLocation {
        node: Node,
        old_parent: Node,
        new_parent: Node,
    },
    Replace {
        old: Node,
        parent: Node,
        new: Node,
        new_already_linked: bool,
    },
    RemoveArchiveReference {
        node: Node,
        parent: Node,
    },
}

impl Action {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Action::Delete { .. } => ActionKind::Delete,
            Action::Link { .. } => ActionKind::Link,
            Action::Unlink { .. } => ActionKind::Unlink,
            Action::MoveLinkLocation { .. } => ActionKind::MoveLinkLocation,
            Action::Replace { .. } => ActionKind::Replace,
            Action::RemoveArchiveReference { .. } => ActionKind::RemoveArchiveReference,
        }
    }

    /// The node the action mutates. For `Replace` this is the node being overwritten.
    #[must_use]
    pub const fn target(&self) -> &Node {
        match self {
            Action::Delete { node }
            | Action::Link { node, .. }
            | Action::Unlink { node, .. }
            | Action::MoveLinkLocation { node, .. }
            | Action::RemoveArchiveReference { node, .. } => node,
            Action::Replace { old, .. } => old,
        }
    }

    /// Parent context of the action, if it has one. `MoveLinkLocation` reports the new parent.
    #[must_use]
    pub const fn parent(&self) -> Option<&Node> {
        match self {
            Action::Delete { .. } => None,
            Action::Link { parent, .. }
            | Action::Unlink { parent, .. }
            | Action::Replace { parent, .. }
            | Action::RemoveArchiveReference { parent, .. } => Some(parent),
            Action::MoveLinkLocation { new_parent, .. } => Some(new_parent),
        }
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Action::Delete { node: a }, Action::Delete { node: b }) => a.id == b.id,
            (Action::Link { node: a, parent: pa }, Action::Link { node: b, parent: pb })
            | (Action::Unlink { node: a, parent: pa }, Action::Unlink { node: b, parent: pb })
            | (
                Action::RemoveArchiveReference { node: a, parent: pa },
                Action::RemoveArchiveReference { node: b, parent: pb },
            ) => a.id == b.id && pa.id == pb.id,
            (
                Action::MoveLinkLocation {
                    node: a,
                    old_parent: oa,
                    new_parent: na,
                },
                Action::MoveLinkLocation {
                    node: b,
                    old_parent: ob,
                    new_parent: nb,
                },
            ) => a.id == b.id && oa.id == ob.id && na.id == nb.id,
            (
                Action::Replace {
                    old: oa,
                    parent: pa,
                    new: na,
                    new_already_linked: la,
                },
                Action::Replace {
                    old: ob,
                    parent: pb,
                    new: nb,
                    new_already_linked: lb,
                },
            ) => oa.id == ob.id && pa.id == pb.id && na.id == nb.id && la == lb,
            _ => false,
        }
    }
}

impl Eq for Action {}

/// Ordered, duplicate-free list of actions. Only `ActionManager` appends to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionPlan {
    pub(crate) actions: Vec<Action>,
    /// Archived fingerprint each planned replacement was decided against, by old node id.
    pub(crate) fingerprints: HashMap<NodeId, NodeFileInfo>,
}

impl ActionPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn contains(&self, action: &Action) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    #[must_use]
    pub fn fingerprint(&self, node: &NodeId) -> Option<&NodeFileInfo> {
        self.fingerprints.get(node)
    }

    pub(crate) fn record_fingerprint(&mut self, node: &NodeId, info: NodeFileInfo) {
        self.fingerprints.insert(node.clone(), info);
    }
}

impl<'a> IntoIterator for &'a ActionPlan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
