/*!
 * Batch Operation Integration Tests
 */

use dept_acl::{
    AclError, ChangeType, MemoryAuditSink, MemoryHierarchy, MemoryRuleStore, PageRequest,
    PermissionEngine, RuleDraft, RuleFilter, RuleId,
};
use std::sync::Arc;

fn setup() -> (Arc<MemoryAuditSink>, PermissionEngine) {
    let hierarchy = MemoryHierarchy::new();
    hierarchy.insert_root(1, "Root").unwrap();
    hierarchy.insert_child(1, 2, "Source").unwrap();
    hierarchy.insert_child(1, 3, "Target").unwrap();

    let audit = Arc::new(MemoryAuditSink::new());
    let engine = PermissionEngine::new(
        Arc::new(hierarchy),
        Arc::new(MemoryRuleStore::new()),
        audit.clone(),
    );
    (audit, engine)
}

#[test]
fn test_idempotent_batch_delete() {
    let (audit, engine) = setup();
    let a = engine
        .create_rule(RuleDraft::new(2, "a", "read", true), "admin")
        .unwrap();
    let b = engine
        .create_rule(RuleDraft::new(2, "b", "read", true), "admin")
        .unwrap();

    let ids = vec![a.id, b.id];
    assert_eq!(engine.batch_delete(&ids, "admin").unwrap().deleted_count, 2);
    assert_eq!(engine.batch_delete(&ids, "admin").unwrap().deleted_count, 0);

    // Deletions were audited once each, with the old value preserved
    let deletes: Vec<_> = audit
        .recent(10)
        .into_iter()
        .filter(|e| e.change_type == ChangeType::Delete)
        .collect();
    assert_eq!(deletes.len(), 2);
    assert!(deletes.iter().all(|e| e.old_value.is_some()));
}

#[test]
fn test_batch_delete_skips_unknown_ids() {
    let (_audit, engine) = setup();
    let a = engine
        .create_rule(RuleDraft::new(2, "a", "read", true), "admin")
        .unwrap();

    let outcome = engine
        .batch_delete(&[a.id, RuleId::new_v4(), RuleId::new_v4()], "admin")
        .unwrap();
    assert_eq!(outcome.requested, 3);
    assert_eq!(outcome.deleted_count, 1);
}

#[test]
fn test_batch_create_reports_partial_success() {
    let (_audit, engine) = setup();
    engine
        .create_rule(RuleDraft::new(2, "r0", "read", true), "admin")
        .unwrap();

    // 10 requested, 2 doomed: one duplicate tuple, one unknown department
    let mut drafts: Vec<RuleDraft> = (0..8)
        .map(|i| RuleDraft::new(2, format!("r{}", i + 1), "read", true))
        .collect();
    drafts.push(RuleDraft::new(2, "r0", "read", false));
    drafts.push(RuleDraft::new(77, "r9", "read", true));

    let outcome = engine.batch_create(drafts, "admin").unwrap();
    assert_eq!(outcome.requested, 10);
    assert_eq!(outcome.created_count, 8);
    assert_eq!(outcome.rejected.len(), 2);
    assert!(matches!(outcome.rejected[0].error, AclError::Conflict { .. }));
    assert!(matches!(
        outcome.rejected[1].error,
        AclError::DepartmentNotFound(77)
    ));
}

#[test]
fn test_copy_from_department() {
    let (_audit, engine) = setup();
    for (resource, granted) in [("reports", true), ("users", false), ("exams", true)] {
        engine
            .create_rule(RuleDraft::new(2, resource, "read", granted), "admin")
            .unwrap();
    }

    let outcome = engine.copy_from(2, 3, "operator").unwrap();
    assert_eq!(outcome.copied_count, 3);

    let page = engine
        .resolve(3, &RuleFilter::any(), false, PageRequest::default())
        .unwrap();
    assert_eq!(page.total, 3);
    for copy in &page.items {
        assert_eq!(copy.rule.department_id, 3);
        assert_eq!(copy.rule.created_by, "operator");
        // identical behavior, fresh identity
        let original = engine
            .resolve(
                2,
                &RuleFilter::on(copy.rule.resource.clone(), copy.rule.action.clone()),
                false,
                PageRequest::default(),
            )
            .unwrap();
        assert_eq!(original.items[0].rule.granted, copy.rule.granted);
        assert_ne!(original.items[0].rule.id, copy.rule.id);
    }
}

#[test]
fn test_copy_from_empty_source() {
    let (_audit, engine) = setup();
    let outcome = engine.copy_from(2, 3, "operator").unwrap();
    assert_eq!(outcome.copied_count, 0);
    assert!(outcome.created.is_empty());
}

#[test]
fn test_copy_missing_department_fails() {
    let (_audit, engine) = setup();
    assert_eq!(
        engine.copy_from(55, 3, "operator").unwrap_err(),
        AclError::DepartmentNotFound(55)
    );
}
