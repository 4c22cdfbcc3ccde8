use uuid::Uuid;

use super::plan::Action;

#[derive(Clone, Debug, Default)]
pub struct ApplyReport {
    pub executed: Vec<Action>,
    pub duration_ms: u64,
    pub plan_uuid: Option<Uuid>,
    pub dry_run: bool,
}
