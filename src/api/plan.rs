//! api/plan.rs: decision phase and per-action plan facts

use log::Level;
use serde_json::json;

use crate::api::explorer::TreeExplorer;
use crate::api::{ReplaceError, ReplaceManager, ReplaceRequest};
use crate::constants::HASH_ALG;
use crate::logging::audit::{AuditCtx, AuditMode};
use crate::logging::{ts_for_mode, AuditSink, FactsEmitter, StageLogger};
use crate::types::ids::{action_id, plan_id};
use crate::types::{Action, ActionPlan, ApplyMode};

/// Explore the request into `plan`. On error `plan` holds whatever was decided before the
/// failing node; nothing has been executed.
pub(super) fn build<E: FactsEmitter, A: AuditSink>(
    api: &ReplaceManager<E, A>,
    request: ReplaceRequest<'_>,
    plan: &mut ActionPlan,
) -> Result<(), ReplaceError> {
    let explorer = TreeExplorer::new(
        api.repository.as_ref(),
        api.archive.as_ref(),
        &api.policy.traversal,
    );
    let res = explorer.explore_replace(
        request.old,
        request.new,
        request.parent,
        request.new_already_linked,
        plan,
    );
    match &res {
        Ok(()) => api.audit.log(
            Level::Debug,
            &format!(
                "plan: {} action(s) to replace {} by {}",
                plan.len(),
                request.old.id,
                request.new.id
            ),
        ),
        Err(e) => api.audit.log(Level::Warn, &format!("plan: {e}")),
    }
    res
}

pub(super) fn emit_facts<E: FactsEmitter, A: AuditSink>(
    api: &ReplaceManager<E, A>,
    plan: &ActionPlan,
    mode: ApplyMode,
) {
    let pid = plan_id(plan);
    let dry = matches!(mode, ApplyMode::DryRun);
    let tctx = AuditCtx::new(
        &api.facts as &dyn FactsEmitter,
        pid.to_string(),
        ts_for_mode(mode),
        AuditMode {
            dry_run: dry,
            redact: dry && api.policy.audit.redact_dry_run,
        },
    );
    let slog = StageLogger::new(&tctx);
    for (idx, act) in plan.iter().enumerate() {
        let mut event = slog
            .plan()
            .action(act)
            .action_id(action_id(&pid, act, idx).to_string());
        // Replacements carry the archived fingerprint they were decided against
        if let Action::Replace { old, .. } = act {
            if let Some(info) = plan.fingerprint(&old.id) {
                event = event.merge(json!({
                    "archive_checksum": info.checksum,
                    "hash_alg": HASH_ALG,
                }));
                if let Some(modified) = &info.modified {
                    event = event.field("archive_modified", json!(modified));
                }
            }
        }
        event.emit_success();
    }
}
