//! Child lookup for document nodes.
use std::collections::HashMap;

use crate::types::errors::{Error, ErrorKind, Result};
use crate::types::{Node, NodeId};

pub trait NodeRepository {
    /// Children of `node` in link order. Resources have none.
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn children(&self, node: &Node) -> Result<Vec<Node>>;
}

/// In-memory repository holding child lists keyed by parent id.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    children: HashMap<NodeId, Vec<Node>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `child` to the children of `parent`.
    pub fn add_child(&mut self, parent: &Node, child: Node) -> &mut Self {
        self.children.entry(parent.id.clone()).or_default().push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, parent: &Node, children: impl IntoIterator<Item = Node>) -> Self {
        self.children
            .entry(parent.id.clone())
            .or_default()
            .extend(children);
        self
    }
}

impl NodeRepository for MemoryRepository {
    fn children(&self, node: &Node) -> Result<Vec<Node>> {
        if !node.is_document() {
            return Err(Error::new(
                ErrorKind::Storage,
                format!("resource {} has no children", node.id),
            ));
        }
        Ok(self.children.get(&node.id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_are_returned_in_insertion_order() {
        let doc = Node::document("d", "doc", "collection");
        let mut repo = MemoryRepository::new();
        repo.add_child(&doc, Node::resource("a", "a.txt", "text/plain"))
            .add_child(&doc, Node::resource("b", "b.txt", "text/plain"));

        let ids: Vec<String> = repo
            .children(&doc)
            .unwrap()
            .into_iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(repo.children(&Node::document("x", "x", "collection")).unwrap().is_empty());
    }

    #[test]
    fn resources_have_no_child_list() {
        let repo = MemoryRepository::new();
        let err = repo.children(&Node::resource("r", "r", "text/plain")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }
}
