use log::Level;
use serde_json::Value;

pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Discards everything. Default sink for callers that do not collect facts.
#[derive(Default, Clone, Copy, Debug)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Forwards audit lines and facts (one JSON object per line) to the `log` facade.
#[derive(Default, Clone, Copy, Debug)]
pub struct LogSink;

impl FactsEmitter for LogSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        let level = if decision == "failure" { Level::Warn } else { Level::Info };
        log::log!(target: "archive_reconcile::facts", level, "{subsystem} {event} {fields}");
    }
}

impl AuditSink for LogSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: "archive_reconcile::audit", level, "{msg}");
    }
}
