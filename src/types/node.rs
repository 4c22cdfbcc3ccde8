//! Node model read from the workspace/archive store at the start of a replace request.
//!
//! Nodes are never mutated by the engine; only an `ActionExecutor` changes storage.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Workspace-local node identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Reference to the archived counterpart of a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArchiveRef(String);

impl ArchiveRef {
    pub fn new(r: impl Into<String>) -> Self {
        Self(r.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural kind of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Has children and carries a structural schema reference.
    Document,
    /// Leaf carrying a payload of some mimetype.
    Resource,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Resource => "resource",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Schema reference for documents, mimetype for resources.
    pub format: String,
    pub workspace: String,
    pub archive_ref: Option<ArchiveRef>,
    /// Referenced by more than one parent in the archive; never deleted or overwritten.
    pub protected: bool,
    /// Lives outside the managed archive (foreign reference).
    pub external: bool,
    /// Workspace-side content: metadata file for documents, payload for resources.
    pub file: Option<PathBuf>,
}

impl Node {
    pub fn document(id: impl Into<String>, name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::Document, schema)
    }

    pub fn resource(id: impl Into<String>, name: impl Into<String>, mimetype: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::Resource, mimetype)
    }

    fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: NodeKind,
        format: impl Into<String>,
    ) -> Self {
        Self {
            id: NodeId::new(id),
            name: name.into(),
            kind,
            format: format.into(),
            workspace: String::new(),
            archive_ref: None,
            protected: false,
            external: false,
            file: None,
        }
    }

    #[must_use]
    pub fn with_archive_ref(mut self, r: impl Into<String>) -> Self {
        self.archive_ref = Some(ArchiveRef::new(r));
        self
    }

    #[must_use]
    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    #[must_use]
    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    #[must_use]
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    #[must_use]
    pub const fn is_document(&self) -> bool {
        matches!(self.kind, NodeKind::Document)
    }
}

/// Archive-side representation of a node. Checksum and timestamp form its content fingerprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeFileInfo {
    pub reference: ArchiveRef,
    pub path: PathBuf,
    pub size: u64,
    /// Lowercase hex SHA-256 of the archived content.
    pub checksum: String,
    /// RFC3339 modification time, when the store records one.
    pub modified: Option<String>,
}
