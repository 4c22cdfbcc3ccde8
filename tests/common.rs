//! Shared test helpers for the archive-reconcile integration tests.
#![allow(dead_code)]

use log::Level;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use archive_reconcile::adapters::{ActionExecutor, FsArchiveStore};
use archive_reconcile::logging::{AuditSink, FactsEmitter};
use archive_reconcile::types::{Action, Error, ErrorKind, ExecutorError, Node};

/// A simple in-memory emitter to capture facts during tests.
#[derive(Clone, Default, Debug)]
pub struct TestEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl TestEmitter {
    /// Fields of every fact emitted for `stage`.
    pub fn stage(&self, stage: &str) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, event, _, _)| event == stage)
            .map(|(_, _, _, f)| f.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, _, f)| f.clone())
            .collect()
    }
}

impl FactsEmitter for TestEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events
            .lock()
            .unwrap()
            .push((subsystem.into(), event.into(), decision.into(), fields));
    }
}

/// A no-op audit sink for tests.
#[derive(Clone, Default)]
pub struct TestAudit;

impl AuditSink for TestAudit {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Executor that records every submitted action and can fail at a given call index.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    pub calls: Arc<Mutex<Vec<Action>>>,
    pub fail_at: Option<usize>,
}

impl RecordingExecutor {
    pub fn failing_at(idx: usize) -> Self {
        Self {
            fail_at: Some(idx),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Action> {
        self.calls.lock().unwrap().clone()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&self, action: &Action) -> Result<(), ExecutorError> {
        let mut calls = self.calls.lock().unwrap();
        let idx = calls.len();
        calls.push(action.clone());
        if self.fail_at == Some(idx) {
            return Err(Error::new(ErrorKind::Storage, "simulated storage failure"));
        }
        Ok(())
    }
}

/// Temporary archive root and workspace directory.
pub struct Fixture {
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("archive")).unwrap();
        std::fs::create_dir_all(dir.path().join("workspace")).unwrap();
        Self { dir }
    }

    pub fn archive(&self) -> FsArchiveStore {
        FsArchiveStore::new(self.dir.path().join("archive"))
    }

    /// Store archived content under `reference`.
    pub fn archived(&self, reference: &str, content: &[u8]) {
        let p = self.dir.path().join("archive").join(reference);
        std::fs::write(p, content).unwrap();
    }

    /// Write a workspace file and return its path.
    pub fn staged(&self, name: &str, content: &[u8]) -> PathBuf {
        let p = self.dir.path().join("workspace").join(name);
        std::fs::write(&p, content).unwrap();
        p
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

pub fn collection(id: &str, name: &str) -> Node {
    Node::document(id, name, "collection").with_workspace("ws-1")
}

pub fn text(id: &str, name: &str) -> Node {
    Node::resource(id, name, "text/plain").with_workspace("ws-1")
}
