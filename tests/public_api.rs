//! Lower-level building blocks used directly by callers that assemble their own plans.

mod common;

use archive_reconcile::types::ids::plan_id;
use archive_reconcile::types::{ActionKind, ActionPlan};
use archive_reconcile::{ActionFactory, ActionManager, ReplaceError};

use common::{collection, text, RecordingExecutor};

#[test]
fn hand_built_plan_is_deduplicated_and_applied_in_order() {
    let f = ActionFactory;
    let root = collection("root", "root");
    let archive = collection("arch", "archive");
    let doc = text("d", "d.txt").with_archive_ref("r-d");

    let mut plan = ActionPlan::new();
    for action in [
        f.move_link_location(&doc, &root, &archive),
        f.remove_archive_reference(&doc, &archive),
        f.move_link_location(&doc, &root, &archive),
        f.delete(&doc),
    ] {
        ActionManager::add_action_to_list(action, &mut plan);
    }
    assert_eq!(plan.len(), 3);

    let exec = RecordingExecutor::default();
    let report = ActionManager::new(&exec).apply_actions(&plan).unwrap();

    let kinds: Vec<ActionKind> = exec.calls().iter().map(|a| a.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::MoveLinkLocation,
            ActionKind::RemoveArchiveReference,
            ActionKind::Delete,
        ]
    );
    assert!(!report.dry_run);
    assert_eq!(report.plan_uuid, Some(plan_id(&plan)));
    assert_eq!(report.executed, plan.actions());
}

#[test]
fn apply_actions_stops_at_first_failure() {
    let f = ActionFactory;
    let parent = collection("p", "root");
    let nodes: Vec<_> = (0..4).map(|i| text(&format!("n{i}"), "x")).collect();
    let mut plan = ActionPlan::new();
    for n in &nodes {
        ActionManager::add_action_to_list(f.link(n, &parent), &mut plan);
    }

    let exec = RecordingExecutor::failing_at(2);
    let err = ActionManager::new(&exec).apply_actions(&plan).unwrap_err();

    assert!(matches!(err, ReplaceError::ExecutorFailure { ref action, .. } if action == "link n2"));
    assert_eq!(exec.calls().len(), 3);
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("Storage: simulated storage failure"));
}

#[test]
fn plan_ids_are_stable_for_equal_plans() {
    let f = ActionFactory;
    let parent = collection("p", "root");
    let build = || {
        let mut plan = ActionPlan::new();
        ActionManager::add_action_to_list(f.unlink(&text("a", "a"), &parent), &mut plan);
        ActionManager::add_action_to_list(f.delete(&text("a", "a")), &mut plan);
        plan
    };
    assert_eq!(plan_id(&build()), plan_id(&build()));

    let mut other = build();
    ActionManager::add_action_to_list(f.link(&text("b", "b"), &parent), &mut other);
    assert_ne!(plan_id(&build()), plan_id(&other));
}
