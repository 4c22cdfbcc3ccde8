//! Deterministic UUIDv5 identifiers for plans and actions.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that
//! `plan_id` and `action_id` are reproducible across runs for the same
//! action sequence.
use std::fmt::Write;
use uuid::Uuid;

use super::plan::{Action, ActionPlan};
use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Serialize an action into a stable, human-readable string used for UUIDv5 input.
fn serialize_action(a: &Action) -> String {
    match a {
        Action::Delete { node } => format!("D:{}", node.id),
        Action::Link { node, parent } => format!("L:{}@{}", node.id, parent.id),
        Action::Unlink { node, parent } => format!("U:{}@{}", node.id, parent.id),
        Action::MoveLinkLocation {
            node,
            old_parent,
            new_parent,
        } => format!("M:{}@{}->{}", node.id, old_parent.id, new_parent.id),
        Action::Replace {
            old,
            parent,
            new,
            new_already_linked,
        } => format!("R:{}@{}<={}:{}", old.id, parent.id, new.id, u8::from(*new_already_linked)),
        Action::RemoveArchiveReference { node, parent } => format!("X:{}@{}", node.id, parent.id),
    }
}

/// Compute a deterministic UUIDv5 for a plan by serializing actions in order.
#[must_use]
pub fn plan_id(plan: &ActionPlan) -> Uuid {
    let ns = namespace();
    let mut s = String::new();
    for a in plan.iter() {
        s.push_str(&serialize_action(a));
        s.push('\n');
    }
    Uuid::new_v5(&ns, s.as_bytes())
}

/// Compute a deterministic UUIDv5 for an action from the plan ID, the action and its position.
#[must_use]
pub fn action_id(plan_id: &Uuid, action: &Action, idx: usize) -> Uuid {
    let mut s = serialize_action(action);
    let _ = write!(s, "#{idx}");
    Uuid::new_v5(plan_id, s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::node::Node;

    fn plan_of(actions: Vec<Action>) -> ActionPlan {
        ActionPlan {
            actions,
            ..ActionPlan::default()
        }
    }

    #[test]
    fn identical_plans_share_ids() {
        let p = Node::document("p", "root", "collection");
        let n = Node::resource("n", "a.txt", "text/plain");
        let a = plan_of(vec![Action::Unlink { node: n.clone(), parent: p.clone() }]);
        let b = plan_of(vec![Action::Unlink { node: n, parent: p }]);
        assert_eq!(plan_id(&a), plan_id(&b));
    }

    #[test]
    fn order_and_position_change_ids() {
        let p = Node::document("p", "root", "collection");
        let n = Node::resource("n", "a.txt", "text/plain");
        let unlink = Action::Unlink { node: n.clone(), parent: p.clone() };
        let delete = Action::Delete { node: n };
        let a = plan_of(vec![unlink.clone(), delete.clone()]);
        let b = plan_of(vec![delete, unlink.clone()]);
        assert_ne!(plan_id(&a), plan_id(&b));

        let pid = plan_id(&a);
        assert_ne!(action_id(&pid, &unlink, 0), action_id(&pid, &unlink, 1));
    }
}
