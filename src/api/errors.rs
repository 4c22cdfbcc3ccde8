use thiserror::Error;

use crate::types::errors::ExecutorError;
use crate::types::NodeId;

#[derive(Debug, Error)]
pub enum ReplaceError {
    /// Attempted delete or overwrite of a node shared outside this subtree.
    #[error("node {node} in workspace '{workspace}' is protected and cannot be replaced")]
    ProtectedNode { node: NodeId, workspace: String },
    /// Old and new nodes differ in structural kind.
    #[error("incompatible nodes: {old} and {new} differ in structural kind")]
    IncompatibleNodes { old: NodeId, new: NodeId },
    /// The executor failed while applying a planned action.
    #[error("executor failed on {action} (action {action_id}): {source}")]
    ExecutorFailure {
        action_id: String,
        action: String,
        #[source]
        source: ExecutorError,
    },
    #[error("node lookup failed: {0}")]
    Lookup(String),
    #[error("tree deeper than the configured limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("cycle detected at node {0}")]
    CycleDetected(NodeId),
    #[error("locking timeout: {0}")]
    LockingTimeout(String),
}

impl ReplaceError {
    #[must_use]
    pub const fn id(&self) -> ErrorId {
        match self {
            ReplaceError::ProtectedNode { .. } => ErrorId::E_PROTECTED,
            ReplaceError::IncompatibleNodes { .. } => ErrorId::E_INCOMPATIBLE,
            ReplaceError::ExecutorFailure { .. } => ErrorId::E_EXECUTOR,
            ReplaceError::Lookup(_) => ErrorId::E_LOOKUP,
            ReplaceError::DepthExceeded { .. } | ReplaceError::CycleDetected(_) => {
                ErrorId::E_MALFORMED_TREE
            }
            ReplaceError::LockingTimeout(_) => ErrorId::E_LOCKING,
        }
    }

    /// True when the error was raised before any executor call for this request.
    #[must_use]
    pub const fn is_planning_error(&self) -> bool {
        !matches!(self, ReplaceError::ExecutorFailure { .. })
    }
}

impl From<crate::types::errors::Error> for ReplaceError {
    fn from(e: crate::types::errors::Error) -> Self {
        ReplaceError::Lookup(e.to_string())
    }
}

// Stable identifiers surfaced to the orchestration layer; SCREAMING_SNAKE_CASE matches
// the emitted `error_id` strings.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_PROTECTED,
    E_INCOMPATIBLE,
    E_EXECUTOR,
    E_LOOKUP,
    E_MALFORMED_TREE,
    E_LOCKING,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_PROTECTED => "E_PROTECTED",
        ErrorId::E_INCOMPATIBLE => "E_INCOMPATIBLE",
        ErrorId::E_EXECUTOR => "E_EXECUTOR",
        ErrorId::E_LOOKUP => "E_LOOKUP",
        ErrorId::E_MALFORMED_TREE => "E_MALFORMED_TREE",
        ErrorId::E_LOCKING => "E_LOCKING",
    }
}

#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_PROTECTED => 10,
        ErrorId::E_INCOMPATIBLE => 20,
        ErrorId::E_EXECUTOR => 30,
        ErrorId::E_LOOKUP => 40,
        ErrorId::E_MALFORMED_TREE => 50,
        ErrorId::E_LOCKING => 60,
    }
}

#[must_use]
pub fn exit_code_for_id_str(s: &str) -> Option<i32> {
    match s {
        "E_PROTECTED" => Some(10),
        "E_INCOMPATIBLE" => Some(20),
        "E_EXECUTOR" => Some(30),
        "E_LOOKUP" => Some(40),
        "E_MALFORMED_TREE" => Some(50),
        "E_LOCKING" => Some(60),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::errors::{Error, ErrorKind};

    #[test]
    fn every_error_maps_to_a_stable_id_and_code() {
        let errs = [
            ReplaceError::ProtectedNode {
                node: NodeId::new("n"),
                workspace: "ws".into(),
            },
            ReplaceError::IncompatibleNodes {
                old: NodeId::new("a"),
                new: NodeId::new("b"),
            },
            ReplaceError::ExecutorFailure {
                action_id: "x".into(),
                action: "delete".into(),
                source: Error::new(ErrorKind::Storage, "disk"),
            },
            ReplaceError::Lookup("gone".into()),
            ReplaceError::DepthExceeded { limit: 3 },
            ReplaceError::CycleDetected(NodeId::new("c")),
            ReplaceError::LockingTimeout("busy".into()),
        ];
        for e in &errs {
            let s = id_str(e.id());
            assert_eq!(exit_code_for_id_str(s), Some(exit_code_for(e.id())));
        }
        assert!(errs[0].is_planning_error());
        assert!(!errs[2].is_planning_error());
        assert_eq!(exit_code_for_id_str("E_UNKNOWN"), None);
    }

    #[test]
    fn protected_error_names_node_and_workspace() {
        let e = ReplaceError::ProtectedNode {
            node: NodeId::new("n7"),
            workspace: "ws-3".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("n7") && msg.contains("ws-3"), "{msg}");
    }
}
