/*!
 * Department Permission Engine
 * Hierarchical permission resolution with inheritance, specificity,
 * override propagation, batch mutations, and an audit trail
 *
 * Rules are scoped per department; a department's effective permissions
 * combine its own rules with ancestor rules, nearest declaration winning.
 * Rules flagged `override_children` are eagerly materialized on every
 * descendant at write time. Every mutation is individually audited through
 * a one-way sink that can never fail the mutation itself.
 *
 * ## Usage
 * ```ignore
 * use dept_acl::{MemoryAuditSink, MemoryHierarchy, MemoryRuleStore};
 * use dept_acl::{PageRequest, PermissionEngine, RuleDraft, RuleFilter};
 * use std::sync::Arc;
 *
 * let hierarchy = MemoryHierarchy::new();
 * hierarchy.insert_root(1, "Root")?;
 * hierarchy.insert_child(1, 2, "Tech")?;
 *
 * let engine = PermissionEngine::new(
 *     Arc::new(hierarchy),
 *     Arc::new(MemoryRuleStore::new()),
 *     Arc::new(MemoryAuditSink::new()),
 * );
 *
 * engine.create_rule(RuleDraft::new(1, "reports", "export", true), "admin")?;
 * let page = engine.resolve(2, &RuleFilter::any(), true, PageRequest::default())?;
 * ```
 */

pub mod audit;
pub mod batch;
pub mod core;
pub mod engine;
pub mod hierarchy;
pub mod propagate;
pub mod resolver;
pub mod rules;
pub mod store;

// Re-exports
pub use audit::{AuditEntry, AuditSink, AuditStats, ChangeType, MemoryAuditSink};
pub use batch::{
    BatchCreateOutcome, BatchDeleteOutcome, BatchOperations, BatchRejection, CopyOutcome,
};
pub use crate::core::errors::AclError;
pub use crate::core::types::{AclResult, DeptId, PageRequest, PageResult, RuleId};
pub use engine::PermissionEngine;
pub use hierarchy::{Department, Hierarchy, MemoryHierarchy};
pub use propagate::{OverridePropagator, PropagationReport, PROPAGATION_REASON, SYSTEM_USER};
pub use resolver::{EffectiveRule, InheritanceResolver};
pub use rules::{Conditions, PermissionRule, RuleDraft, RuleFilter, RulePatch};
pub use store::{MemoryRuleStore, RuleStore};
