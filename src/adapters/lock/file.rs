use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::LOCK_POLL_MS;
use crate::types::errors::{Error, ErrorKind, Result};
use fs2::FileExt;

use super::{LockGuard, LockManager};

/// One lock file per workspace under `dir`: `<dir>/<workspace>.lock`.
#[derive(Debug)]
pub struct FileLockManager {
    dir: PathBuf,
}

impl FileLockManager {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn lock_path(&self, workspace: &str) -> PathBuf {
        let name: String = workspace
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let name = if name.is_empty() { "default".to_string() } else { name };
        self.dir.join(format!("{name}.lock"))
    }
}

struct FileGuard {
    file: File,
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl LockGuard for FileGuard {}

impl LockManager for FileLockManager {
    fn acquire_workspace_lock(&self, workspace: &str, timeout_ms: u64) -> Result<Box<dyn LockGuard>> {
        let t0 = Instant::now();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(self.lock_path(workspace))
            .map_err(|e| Error::new(ErrorKind::Io, e.to_string()))?;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Box::new(FileGuard { file })),
                Err(_e) => {
                    if t0.elapsed() >= Duration::from_millis(timeout_ms) {
                        return Err(Error::new(
                            ErrorKind::Policy,
                            format!("timeout acquiring lock for workspace '{workspace}'"),
                        ));
                    }
                    thread::sleep(Duration::from_millis(LOCK_POLL_MS));
                }
            }
        }
    }
}
