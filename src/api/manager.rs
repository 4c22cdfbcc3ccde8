//! Plan accumulation and fail-fast application.
//!
//! Side-effects of `apply`:
//! - Emits `apply.attempt` and `apply.result` facts per action.
//! - Calls the executor once per action in plan order, stopping at the first failure.
//!   Already-applied actions are not compensated.
use std::time::Instant;

use serde_json::json;
use uuid::Uuid;

use crate::adapters::ActionExecutor;
use crate::api::errors::{exit_code_for, id_str, ErrorId, ReplaceError};
use crate::logging::audit::{AuditCtx, AuditMode};
use crate::logging::{ts_for_mode, JsonlSink, StageLogger};
use crate::types::ids::{action_id, plan_id};
use crate::types::{Action, ActionPlan, ApplyMode, ApplyReport};

pub struct ActionManager<'a> {
    executor: &'a dyn ActionExecutor,
}

impl<'a> ActionManager<'a> {
    pub fn new(executor: &'a dyn ActionExecutor) -> Self {
        Self { executor }
    }

    /// Append `action` unless an equal action is already planned.
    /// Returns whether the plan grew.
    pub fn add_action_to_list(action: Action, plan: &mut ActionPlan) -> bool {
        if plan.contains(&action) {
            log::trace!(
                "skipping duplicate {} for node {}",
                action.kind().as_str(),
                action.target().id
            );
            return false;
        }
        plan.actions.push(action);
        true
    }

    /// Apply every action in order without emitting facts.
    /// # Errors
    /// Returns `ReplaceError::ExecutorFailure` for the first action the executor rejects;
    /// later actions are not submitted.
    pub fn apply_actions(&self, plan: &ActionPlan) -> Result<ApplyReport, ReplaceError> {
        let sink = JsonlSink;
        let pid = plan_id(plan);
        let ctx = AuditCtx::new(
            &sink,
            pid.to_string(),
            ts_for_mode(ApplyMode::Commit),
            AuditMode::default(),
        );
        self.apply(plan, ApplyMode::Commit, &pid, &StageLogger::new(&ctx))
    }

    pub(crate) fn apply(
        &self,
        plan: &ActionPlan,
        mode: ApplyMode,
        pid: &Uuid,
        slog: &StageLogger<'_>,
    ) -> Result<ApplyReport, ReplaceError> {
        let t0 = Instant::now();
        let dry = matches!(mode, ApplyMode::DryRun);
        let mut executed: Vec<Action> = Vec::with_capacity(plan.len());

        for (idx, act) in plan.iter().enumerate() {
            let aid = action_id(pid, act, idx).to_string();
            slog.apply_attempt()
                .action(act)
                .action_id(aid.clone())
                .emit_success();

            if dry {
                slog.apply_result()
                    .action(act)
                    .action_id(aid)
                    .emit_success();
                executed.push(act.clone());
                continue;
            }

            let step_t0 = Instant::now();
            match self.executor.execute(act) {
                Ok(()) => {
                    slog.apply_result()
                        .action(act)
                        .action_id(aid)
                        .field("duration_ms", json!(elapsed_ms(step_t0)))
                        .emit_success();
                    executed.push(act.clone());
                }
                Err(e) => {
                    let id = ErrorId::E_EXECUTOR;
                    log::warn!(
                        "{} of node {} failed after {} applied action(s): {}",
                        act.kind().as_str(),
                        act.target().id,
                        executed.len(),
                        e
                    );
                    slog.apply_result()
                        .action(act)
                        .action_id(aid.clone())
                        .field("duration_ms", json!(elapsed_ms(step_t0)))
                        .field("error", json!(e.to_string()))
                        .field("error_id", json!(id_str(id)))
                        .field("exit_code", json!(exit_code_for(id)))
                        .emit_failure();
                    return Err(ReplaceError::ExecutorFailure {
                        action_id: aid,
                        action: format!("{} {}", act.kind().as_str(), act.target().id),
                        source: e,
                    });
                }
            }
        }

        Ok(ApplyReport {
            executed,
            duration_ms: elapsed_ms(t0),
            plan_uuid: Some(*pid),
            dry_run: dry,
        })
    }
}

fn elapsed_ms(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}
