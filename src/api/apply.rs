//! api/apply.rs: lock, plan, apply and summarize one replace request.
//!
//! Side-effects:
//! - Acquires the workspace lock in Commit mode when a lock manager is attached (required
//!   when `governance.locking = Required`), for full requests and for prebuilt plans alike.
//! - Emits `plan`, `apply.attempt`/`apply.result` facts and one `replace.summary`.
//! - Calls the executor once per planned action, stopping at the first failure.

use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::adapters::LockGuard;
use crate::api::errors::{exit_code_for, id_str, ReplaceError};
use crate::api::manager::ActionManager;
use crate::api::{plan, ReplaceManager, ReplaceRequest};
use crate::logging::audit::{AuditCtx, AuditMode};
use crate::logging::{ts_for_mode, AuditSink, FactsEmitter, StageLogger};
use crate::policy::types::LockingPolicy;
use crate::types::ids::plan_id;
use crate::types::{ActionPlan, ApplyMode, ApplyReport};

pub(super) fn run<E: FactsEmitter, A: AuditSink>(
    api: &ReplaceManager<E, A>,
    request: ReplaceRequest<'_>,
    mode: ApplyMode,
) -> Result<ApplyReport, ReplaceError> {
    let t0 = Instant::now();
    api.audit.log(
        Level::Info,
        &format!("replace: starting {} -> {}", request.old.id, request.new.id),
    );

    let mut plan = ActionPlan::new();
    let mut lock_wait_ms = None;
    let res = acquire_lock(api, request.old.workspace.as_str(), mode).and_then(|lock| {
        lock_wait_ms = lock.wait_ms;
        let _guard = lock.guard;
        plan::build(api, request, &mut plan)?;
        plan::emit_facts(api, &plan, mode);
        apply_plan(api, &plan, mode)
    });

    emit_summary(api, &request, &plan, mode, t0, lock_wait_ms, &res);
    api.audit.log(Level::Info, "replace: finished");
    res
}

/// Apply a plan built earlier, under the same locking rules as a full request.
/// The workspace locked is the one of the first planned action's target.
pub(super) fn apply_locked<E: FactsEmitter, A: AuditSink>(
    api: &ReplaceManager<E, A>,
    plan: &ActionPlan,
    mode: ApplyMode,
) -> Result<ApplyReport, ReplaceError> {
    let workspace = plan
        .iter()
        .next()
        .map_or("", |act| act.target().workspace.as_str());
    let lock = acquire_lock(api, workspace, mode)?;
    let _guard = lock.guard;
    apply_plan(api, plan, mode)
}

fn apply_plan<E: FactsEmitter, A: AuditSink>(
    api: &ReplaceManager<E, A>,
    plan: &ActionPlan,
    mode: ApplyMode,
) -> Result<ApplyReport, ReplaceError> {
    let pid = plan_id(plan);
    let tctx = audit_ctx(api, pid.to_string(), mode);
    ActionManager::new(api.executor.as_ref()).apply(plan, mode, &pid, &StageLogger::new(&tctx))
}

/// Held workspace lock, if any, and how long acquiring it took.
struct LockOutcome {
    guard: Option<Box<dyn LockGuard>>,
    wait_ms: Option<u64>,
}

impl LockOutcome {
    const fn unlocked() -> Self {
        Self {
            guard: None,
            wait_ms: None,
        }
    }
}

fn acquire_lock<E: FactsEmitter, A: AuditSink>(
    api: &ReplaceManager<E, A>,
    workspace: &str,
    mode: ApplyMode,
) -> Result<LockOutcome, ReplaceError> {
    if matches!(mode, ApplyMode::DryRun) {
        return Ok(LockOutcome::unlocked());
    }
    match &api.lock {
        Some(mgr) => {
            let t0 = Instant::now();
            let guard = mgr
                .acquire_workspace_lock(workspace, api.policy.governance.lock_timeout_ms)
                .map_err(|e| {
                    api.audit
                        .log(Level::Error, "replace: lock acquisition failed (E_LOCKING)");
                    ReplaceError::LockingTimeout(e.msg)
                })?;
            let wait_ms = elapsed_ms(t0);
            api.audit.log(
                Level::Debug,
                &format!("replace: workspace '{workspace}' locked after {wait_ms}ms"),
            );
            Ok(LockOutcome {
                guard: Some(guard),
                wait_ms: Some(wait_ms),
            })
        }
        None if api.policy.governance.locking == LockingPolicy::Required => {
            api.audit
                .log(Level::Error, "replace: no lock manager configured (E_LOCKING)");
            Err(ReplaceError::LockingTimeout(format!(
                "lock manager required to commit workspace '{workspace}'"
            )))
        }
        None => Ok(LockOutcome::unlocked()),
    }
}

fn emit_summary<E: FactsEmitter, A: AuditSink>(
    api: &ReplaceManager<E, A>,
    request: &ReplaceRequest<'_>,
    plan: &ActionPlan,
    mode: ApplyMode,
    t0: Instant,
    lock_wait_ms: Option<u64>,
    res: &Result<ApplyReport, ReplaceError>,
) {
    let pid = plan_id(plan);
    let tctx = audit_ctx(api, pid.to_string(), mode);
    let mut event = StageLogger::new(&tctx)
        .replace_summary()
        .node(request.old)
        .merge(json!({
            "new_node_id": request.new.id,
            "parent_id": request.parent.id,
            "actions_planned": plan.len(),
            "duration_ms": elapsed_ms(t0),
        }));
    if let Some(ms) = lock_wait_ms {
        event = event.field("lock_wait_ms", json!(ms));
    }
    match res {
        Ok(report) => event
            .field("actions_executed", json!(report.executed.len()))
            .emit_success(),
        Err(e) => {
            let id = e.id();
            event
                .merge(json!({
                    "error": e.to_string(),
                    "error_id": id_str(id),
                    "exit_code": exit_code_for(id),
                }))
                .emit_failure();
        }
    }
}

fn audit_ctx<E: FactsEmitter, A: AuditSink>(
    api: &ReplaceManager<E, A>,
    plan_id: String,
    mode: ApplyMode,
) -> AuditCtx<'_> {
    let dry = matches!(mode, ApplyMode::DryRun);
    AuditCtx::new(
        &api.facts as &dyn FactsEmitter,
        plan_id,
        ts_for_mode(mode),
        AuditMode {
            dry_run: dry,
            redact: dry && api.policy.audit.redact_dry_run,
        },
    )
}

fn elapsed_ms(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}
