use super::*;

#[test]
fn every_verb_has_a_row() {
    for v in ActionVerb::ALL {
        for k in ResourceKind::ALL {
            assert!(required_role(v, k).is_some(), "missing row for {} on {}", v, k);
        }
    }
}

#[test]
fn reads_pass_for_any_role() {
    for v in ActionVerb::ALL.into_iter().filter(|v| !v.is_mutating()) {
        for k in ResourceKind::ALL {
            assert_eq!(evaluate(v, k, Role::Read), Verdict::Allow, "{} on {}", v, k);
        }
    }
}

#[test]
fn mutations_on_standard_resources_need_write() {
    for v in [ActionVerb::Post, ActionVerb::Put, ActionVerb::Patch, ActionVerb::Delete] {
        for k in [ResourceKind::Record, ResourceKind::Database] {
            assert_eq!(evaluate(v, k, Role::Read), Verdict::Deny);
            assert_eq!(evaluate(v, k, Role::Write), Verdict::Allow);
            assert_eq!(evaluate(v, k, Role::Admin), Verdict::Allow);
        }
    }
}

#[test]
fn mutations_on_escalated_resources_need_admin() {
    for v in [ActionVerb::Post, ActionVerb::Put, ActionVerb::Patch, ActionVerb::Delete] {
        for k in [ResourceKind::Collection, ResourceKind::Permit, ResourceKind::User] {
            assert_eq!(evaluate(v, k, Role::Read), Verdict::Deny);
            assert_eq!(evaluate(v, k, Role::Write), Verdict::Deny, "{} on {}", v, k);
            assert_eq!(evaluate(v, k, Role::Admin), Verdict::Allow);
        }
    }
}

#[test]
fn stored_role_strings() {
    assert_eq!(Role::from_stored("ADMIN"), Role::Admin);
    assert_eq!(Role::from_stored("WRITE"), Role::Write);
    assert_eq!(Role::from_stored("READ"), Role::Read);
    assert_eq!(Role::from_stored("admin"), Role::Read);
    assert_eq!(Role::from_stored("OWNER"), Role::Read);
    assert!(Role::Admin > Role::Write && Role::Write > Role::Read);
}
