/*!
 * Override Propagation Integration Tests
 */

use dept_acl::{
    ChangeType, MemoryAuditSink, MemoryHierarchy, MemoryRuleStore, PermissionEngine, RuleDraft,
    RulePatch, RuleStore, PROPAGATION_REASON, SYSTEM_USER,
};
use std::sync::Arc;

fn setup() -> (MemoryRuleStore, Arc<MemoryAuditSink>, PermissionEngine) {
    let hierarchy = MemoryHierarchy::new();
    hierarchy.insert_root(10, "Parent").unwrap();
    hierarchy.insert_child(10, 11, "C1").unwrap();
    hierarchy.insert_child(10, 12, "C2").unwrap();
    hierarchy.insert_child(10, 13, "C3").unwrap();

    let store = MemoryRuleStore::new();
    let audit = Arc::new(MemoryAuditSink::new());
    let engine = PermissionEngine::new(
        Arc::new(hierarchy),
        Arc::new(store.clone()),
        audit.clone(),
    );
    (store, audit, engine)
}

#[test]
fn test_override_materializes_on_three_children() {
    let (store, audit, engine) = setup();

    let mut conditions = dept_acl::Conditions::new();
    conditions.insert("term".into(), serde_json::json!("2026-fall"));

    engine
        .create_rule(
            RuleDraft::new(10, "exam", "grade", true)
                .cascading(true)
                .with_conditions(conditions.clone()),
            "admin",
        )
        .unwrap();

    for child in [11, 12, 13] {
        let rule = store.find_tuple(child, "exam", "grade").unwrap().unwrap();
        assert!(rule.granted);
        assert_eq!(rule.conditions, conditions);
        assert!(rule.inherit_from_parent);
        assert!(!rule.override_children);
        assert_eq!(rule.created_by, SYSTEM_USER);
    }

    // Parent create + three system-attributed child creates
    assert_eq!(audit.stats().creates, 4);
    for child in [11, 12, 13] {
        let entries = audit.for_department(child, 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].change_type, ChangeType::Create);
        assert_eq!(entries[0].reason, PROPAGATION_REASON);
        assert_eq!(entries[0].changed_by, SYSTEM_USER);
    }
}

#[test]
fn test_update_pushes_new_values_to_children() {
    let (store, audit, engine) = setup();
    let rule = engine
        .create_rule(
            RuleDraft::new(10, "exam", "grade", true).cascading(true),
            "admin",
        )
        .unwrap();

    let patch = RulePatch {
        granted: Some(false),
        priority: Some(3),
        ..RulePatch::default()
    };
    engine.update_rule(rule.id, &patch, "admin").unwrap();

    for child in [11, 12, 13] {
        let rule = store.find_tuple(child, "exam", "grade").unwrap().unwrap();
        assert!(!rule.granted);
        assert_eq!(rule.priority, 3);
    }
    // 4 creates from the first cascade, then 4 updates (parent + 3 children)
    let stats = audit.stats();
    assert_eq!(stats.creates, 4);
    assert_eq!(stats.updates, 4);
}

#[test]
fn test_diverged_child_keeps_its_own_flags() {
    let (store, _audit, engine) = setup();

    // Child 11 declares its own non-inheritable rule first
    engine
        .create_rule(
            RuleDraft::new(11, "exam", "grade", false).inheritable(false),
            "child-admin",
        )
        .unwrap();

    engine
        .create_rule(
            RuleDraft::new(10, "exam", "grade", true).cascading(true),
            "admin",
        )
        .unwrap();

    let child = store.find_tuple(11, "exam", "grade").unwrap().unwrap();
    assert!(child.granted); // value imposed by the cascade
    assert!(!child.inherit_from_parent); // own flag untouched
    assert_eq!(child.created_by, "child-admin"); // attribution untouched
}
