//! Archive-side content lookup used by the content-equality step of a replace decision.
use std::fs;
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::types::{ArchiveRef, NodeFileInfo};

pub trait ArchiveContentProvider {
    /// Look up the archived representation of a node, if the archive holds one.
    fn archived_node(&self, reference: &ArchiveRef) -> Option<NodeFileInfo>;

    /// Whether the workspace file differs from the archived fingerprint.
    /// Implementations treat an unreadable workspace file as changed.
    fn has_content_changed(&self, info: &NodeFileInfo, workspace_file: &Path) -> bool;
}

/// Compute SHA-256 of a file at `path`, returning a lowercase hex string.
pub fn sha256_hex_of(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut f, &mut hasher).ok()?;
    Some(hex::encode(hasher.finalize()))
}

/// Archive content provider over a plain directory: reference `r` lives at `<root>/r`.
#[derive(Debug, Clone)]
pub struct FsArchiveStore {
    root: PathBuf,
}

impl FsArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &ArchiveRef) -> Option<PathBuf> {
        let rel = Path::new(reference.as_str());
        // Only plain relative components; references never escape the archive root.
        if rel.as_os_str().is_empty()
            || !rel.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(rel))
    }
}

impl ArchiveContentProvider for FsArchiveStore {
    fn archived_node(&self, reference: &ArchiveRef) -> Option<NodeFileInfo> {
        let path = self.resolve(reference)?;
        let md = fs::metadata(&path).ok()?;
        if !md.is_file() {
            return None;
        }
        let checksum = sha256_hex_of(&path)?;
        let modified = md
            .modified()
            .ok()
            .and_then(|t| OffsetDateTime::from(t).format(&Rfc3339).ok());
        Some(NodeFileInfo {
            reference: reference.clone(),
            path,
            size: md.len(),
            checksum,
            modified,
        })
    }

    fn has_content_changed(&self, info: &NodeFileInfo, workspace_file: &Path) -> bool {
        let Ok(md) = fs::metadata(workspace_file) else {
            log::debug!(
                "workspace file {} unreadable; treating as changed",
                workspace_file.display()
            );
            return true;
        };
        if md.len() != info.size {
            return true;
        }
        match sha256_hex_of(workspace_file) {
            Some(actual) => !actual.eq_ignore_ascii_case(&info.checksum),
            None => true,
        }
    }
}
