/*!
 * Resolution Integration Tests
 * Specificity, inheritance visibility, and expiration through the engine
 */

use dept_acl::{
    AclError, DeptId, MemoryAuditSink, MemoryHierarchy, MemoryRuleStore, PageRequest,
    PermissionEngine, RuleDraft, RuleFilter,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

fn chain_engine(depth: usize) -> PermissionEngine {
    let hierarchy = MemoryHierarchy::new();
    hierarchy.insert_root(1, "d1").unwrap();
    for id in 2..=depth as DeptId {
        hierarchy.insert_child(id - 1, id, format!("d{}", id)).unwrap();
    }
    PermissionEngine::new(
        Arc::new(hierarchy),
        Arc::new(MemoryRuleStore::new()),
        Arc::new(MemoryAuditSink::new()),
    )
}

#[test]
fn test_specificity_local_over_root() {
    let engine = chain_engine(3);
    engine
        .create_rule(RuleDraft::new(1, "reports", "export", true), "admin")
        .unwrap();
    engine
        .create_rule(RuleDraft::new(3, "reports", "export", false), "admin")
        .unwrap();

    let page = engine
        .resolve(
            3,
            &RuleFilter::on("reports", "export"),
            true,
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(page.total, 1);
    assert!(!page.items[0].rule.granted);
    assert!(!page.items[0].is_inherited);
}

#[test]
fn test_inheritance_visibility() {
    let engine = chain_engine(3);
    engine
        .create_rule(RuleDraft::new(1, "reports", "export", true), "admin")
        .unwrap();

    let inherited = engine
        .resolve(3, &RuleFilter::any(), true, PageRequest::default())
        .unwrap();
    assert_eq!(inherited.total, 1);
    assert!(inherited.items[0].is_inherited);
    assert_eq!(inherited.items[0].inherited_from, Some(1));

    let local_only = engine
        .resolve(3, &RuleFilter::any(), false, PageRequest::default())
        .unwrap();
    assert_eq!(local_only.total, 0);
}

#[test]
fn test_expired_rule_absent_from_resolution() {
    let engine = chain_engine(2);
    let rule = engine
        .create_rule(
            RuleDraft::new(2, "reports", "export", true)
                .expiring_at(SystemTime::now() + Duration::from_secs(3600)),
            "admin",
        )
        .unwrap();

    // Visible while active
    let page = engine
        .resolve(2, &RuleFilter::any(), true, PageRequest::default())
        .unwrap();
    assert_eq!(page.total, 1);

    // Expire it in place
    let patch = dept_acl::RulePatch {
        expires_at: Some(Some(SystemTime::now() - Duration::from_secs(1))),
        ..dept_acl::RulePatch::default()
    };
    engine.update_rule(rule.id, &patch, "admin").unwrap();

    let page = engine
        .resolve(2, &RuleFilter::any(), true, PageRequest::default())
        .unwrap();
    assert_eq!(page.total, 0);

    // But the tuple is still occupied: re-creating conflicts
    let err = engine
        .create_rule(RuleDraft::new(2, "reports", "export", true), "admin")
        .unwrap_err();
    assert!(matches!(err, AclError::Conflict { .. }));
}

#[test]
fn test_resolve_unknown_department() {
    let engine = chain_engine(2);
    assert_eq!(
        engine
            .resolve(9, &RuleFilter::any(), true, PageRequest::default())
            .unwrap_err(),
        AclError::DepartmentNotFound(9)
    );
}

proptest! {
    /// Whatever subset of the chain declares a tuple, the declaration
    /// nearest the leaf is the one that resolves for the leaf.
    #[test]
    fn prop_nearest_declaration_wins(mask in proptest::collection::vec(any::<bool>(), 2..6)) {
        prop_assume!(mask.iter().any(|declared| *declared));

        let depth = mask.len();
        let engine = chain_engine(depth);
        for (i, declared) in mask.iter().enumerate() {
            if *declared {
                let dept = (i + 1) as DeptId;
                engine
                    .create_rule(RuleDraft::new(dept, "doc", "read", dept % 2 == 0), "admin")
                    .unwrap();
            }
        }

        let leaf = depth as DeptId;
        let nearest = mask
            .iter()
            .rposition(|declared| *declared)
            .map(|i| (i + 1) as DeptId)
            .unwrap();

        let page = engine
            .resolve(leaf, &RuleFilter::on("doc", "read"), true, PageRequest::default())
            .unwrap();
        prop_assert_eq!(page.total, 1);
        let resolved = &page.items[0];
        if nearest == leaf {
            prop_assert!(!resolved.is_inherited);
            prop_assert_eq!(resolved.inherited_from, None);
        } else {
            prop_assert!(resolved.is_inherited);
            prop_assert_eq!(resolved.inherited_from, Some(nearest));
        }
        prop_assert_eq!(resolved.rule.department_id, nearest);
    }
}
