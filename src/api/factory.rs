//! Mechanical constructors for actions. No validation happens here; the checkers decide
//! what may be built before asking for it.
use crate::types::{Action, Node};

#[derive(Clone, Copy, Debug, Default)]
pub struct ActionFactory;

impl ActionFactory {
    #[must_use]
    pub fn delete(&self, node: &Node) -> Action {
        Action::Delete { node: node.clone() }
    }

    #[must_use]
    pub fn link(&self, node: &Node, parent: &Node) -> Action {
        Action::Link {
            node: node.clone(),
            parent: parent.clone(),
        }
    }

    #[must_use]
    pub fn unlink(&self, node: &Node, parent: &Node) -> Action {
        Action::Unlink {
            node: node.clone(),
            parent: parent.clone(),
        }
    }

    #[must_use]
    pub fn move_link_location(&self, node: &Node, old_parent: &Node, new_parent: &Node) -> Action {
        Action::MoveLinkLocation {
            node: node.clone(),
            old_parent: old_parent.clone(),
            new_parent: new_parent.clone(),
        }
    }

    #[must_use]
    pub fn replace(&self, old: &Node, parent: &Node, new: &Node, new_already_linked: bool) -> Action {
        Action::Replace {
            old: old.clone(),
            parent: parent.clone(),
            new: new.clone(),
            new_already_linked,
        }
    }

    #[must_use]
    pub fn remove_archive_reference(&self, node: &Node, parent: &Node) -> Action {
        Action::RemoveArchiveReference {
            node: node.clone(),
            parent: parent.clone(),
        }
    }
}
