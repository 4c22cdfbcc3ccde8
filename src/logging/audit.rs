// Audit helpers that emit replace facts across stages.
//
// Side-effects:
// - Emits JSON facts via `FactsEmitter` for `plan` (one per action), `apply.attempt` and
//   `apply.result` (one each per action), and a final `replace.summary`.
// - Ensures a minimal envelope is present on every fact: `schema_version`, `ts`, `plan_id`,
//   `node_id`, `dry_run`, `decision`.
// - Applies redaction when the context asks for it (dry-run by default).
//
// The envelope is described by `schemas/replace_event.v1.schema.json`.
use serde_json::{json, Value};

use crate::constants::SUBSYSTEM;
use crate::logging::{redact_event, FactsEmitter};
use crate::types::{Action, Node};

pub(crate) const SCHEMA_VERSION: i64 = 1;

#[derive(Clone, Debug, Default)]
pub(crate) struct AuditMode {
    pub dry_run: bool,
    pub redact: bool,
}

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub plan_id: String,
    pub ts: String,
    pub mode: AuditMode,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(
        facts: &'a dyn FactsEmitter,
        plan_id: String,
        ts: String,
        mode: AuditMode,
    ) -> Self {
        Self {
            facts,
            plan_id,
            ts,
            mode,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    Plan,
    ApplyAttempt,
    ApplyResult,
    ReplaceSummary,
}

impl Stage {
    const fn as_event(self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::ApplyAttempt => "apply.attempt",
            Stage::ApplyResult => "apply.result",
            Stage::ReplaceSummary => "replace.summary",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
}

impl Decision {
    const fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
        }
    }
}

/// Builder facade over audit emission with centralized envelope+redaction.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn plan(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Plan)
    }
    pub fn apply_attempt(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ApplyAttempt)
    }
    pub fn apply_result(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ApplyResult)
    }
    pub fn replace_summary(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::ReplaceSummary)
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub fn action_id(mut self, action_id: impl Into<String>) -> Self {
        self.fields.insert("action_id".into(), json!(action_id.into()));
        self
    }

    pub fn node(mut self, node: &Node) -> Self {
        self.fields.insert("node_id".into(), json!(node.id));
        self.fields.insert("node_kind".into(), json!(node.kind));
        self
    }

    /// Kind, target node and parent of an action.
    pub fn action(mut self, action: &Action) -> Self {
        self.fields
            .insert("action_kind".into(), json!(action.kind().as_str()));
        if let Some(parent) = action.parent() {
            self.fields.insert("parent_id".into(), json!(parent.id));
        }
        if let Action::Replace {
            new,
            new_already_linked,
            ..
        } = action
        {
            self.fields.insert("new_node_id".into(), json!(new.id));
            self.fields
                .insert("new_already_linked".into(), json!(new_already_linked));
        }
        self.node(action.target())
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn merge(mut self, extra: Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("decision").or_insert(json!(decision.as_str()));
        }
        redact_and_emit(self.ctx, self.stage.as_event(), decision.as_str(), fields);
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success);
    }
    pub fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
}

fn redact_and_emit(ctx: &AuditCtx, event: &str, decision: &str, mut fields: Value) {
    if let Some(obj) = fields.as_object_mut() {
        obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
        obj.entry("ts").or_insert(json!(ctx.ts));
        obj.entry("plan_id").or_insert(json!(ctx.plan_id));
        obj.entry("node_id").or_insert(json!(""));
        obj.entry("dry_run").or_insert(json!(ctx.mode.dry_run));
    }
    let out = if ctx.mode.redact {
        redact_event(fields)
    } else {
        fields
    };
    ctx.facts.emit(SUBSYSTEM, event, decision, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        events: Mutex<Vec<(String, String, Value)>>,
    }

    impl FactsEmitter for Capture {
        fn emit(&self, _subsystem: &str, event: &str, decision: &str, fields: Value) {
            self.events
                .lock()
                .unwrap()
                .push((event.to_string(), decision.to_string(), fields));
        }
    }

    #[test]
    fn envelope_fields_are_filled_in() {
        let cap = Capture::default();
        let ctx = AuditCtx::new(
            &cap,
            "pid".into(),
            "2025-01-01T00:00:00Z".into(),
            AuditMode {
                dry_run: false,
                redact: false,
            },
        );
        let slog = StageLogger::new(&ctx);
        let p = Node::document("p", "root", "collection");
        let n = Node::resource("n", "a.txt", "text/plain");
        slog.apply_attempt()
            .action(&Action::Unlink { node: n, parent: p })
            .action_id("aid")
            .emit_success();

        let events = cap.events.lock().unwrap();
        let (event, decision, f) = &events[0];
        assert_eq!(event, "apply.attempt");
        assert_eq!(decision, "success");
        assert_eq!(f["schema_version"], json!(1));
        assert_eq!(f["plan_id"], json!("pid"));
        assert_eq!(f["node_id"], json!("n"));
        assert_eq!(f["parent_id"], json!("p"));
        assert_eq!(f["action_kind"], json!("unlink"));
        assert_eq!(f["dry_run"], json!(false));
        assert_eq!(f["ts"], json!("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn redacting_context_zeroes_timestamp() {
        let cap = Capture::default();
        let ctx = AuditCtx::new(
            &cap,
            "pid".into(),
            "2025-01-01T00:00:00Z".into(),
            AuditMode {
                dry_run: true,
                redact: true,
            },
        );
        StageLogger::new(&ctx)
            .replace_summary()
            .field("duration_ms", json!(12))
            .emit_failure();

        let events = cap.events.lock().unwrap();
        let f = &events[0].2;
        assert_eq!(f["ts"], json!(crate::logging::TS_ZERO));
        assert!(f.get("duration_ms").is_none());
        assert_eq!(f["decision"], json!("failure"));
    }
}
