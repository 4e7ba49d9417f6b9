/*!
 * Override Propagator
 * Eagerly materializes a cascading rule onto every descendant department
 *
 * Propagation happens at write time over a precomputed descendant set, so
 * fanout cost is visible and each descendant write is an independent unit of
 * work. There is no rollback: a failure partway leaves earlier descendants
 * updated, and the report tells the caller how far it got.
 */

use crate::audit::{append_best_effort, AuditEntry, AuditSink};
use crate::core::types::{AclResult, DeptId};
use crate::hierarchy::Hierarchy;
use crate::rules::{PermissionRule, RulePatch};
use crate::store::RuleStore;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;
use uuid::Uuid;

/// Attribution for rules the engine materializes on descendants
pub const SYSTEM_USER: &str = "system";

/// Audit reason attached to every propagated write
pub const PROPAGATION_REASON: &str = "override propagation";

/// Outcome of one propagation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PropagationReport {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

impl PropagationReport {
    pub fn touched(&self) -> usize {
        self.created + self.updated
    }
}

enum Applied {
    Created,
    Updated,
}

/// Eager write-time cascade of override rules
#[derive(Clone)]
pub struct OverridePropagator {
    hierarchy: Arc<dyn Hierarchy>,
    store: Arc<dyn RuleStore>,
    audit: Arc<dyn AuditSink>,
}

impl OverridePropagator {
    pub fn new(
        hierarchy: Arc<dyn Hierarchy>,
        store: Arc<dyn RuleStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            hierarchy,
            store,
            audit,
        }
    }

    /// Push `rule` onto every descendant of its department
    ///
    /// Existing descendant rules for the tuple keep their own
    /// `inherit_from_parent` / `override_children` / `created_by`; only the
    /// imposed fields (granted, conditions, priority, expiry) change.
    /// Missing ones are materialized as system-attributed local rules.
    pub fn propagate(&self, rule: &PermissionRule, caller: &str) -> AclResult<PropagationReport> {
        let descendants = self.hierarchy.descendants(rule.department_id)?;
        debug!(
            "propagating ({}, {}) from department {} to {} descendants",
            rule.resource,
            rule.action,
            rule.department_id,
            descendants.len()
        );

        let now = SystemTime::now();
        let mut report = PropagationReport::default();
        for dept in descendants {
            match self.apply_to(dept, rule, caller, now) {
                Ok(Applied::Created) => report.created += 1,
                Ok(Applied::Updated) => report.updated += 1,
                Err(err) => {
                    warn!(
                        "propagation of ({}, {}) to department {} failed: {}",
                        rule.resource, rule.action, dept, err
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    fn apply_to(
        &self,
        department: DeptId,
        rule: &PermissionRule,
        caller: &str,
        now: SystemTime,
    ) -> AclResult<Applied> {
        match self
            .store
            .find_tuple(department, &rule.resource, &rule.action)?
        {
            Some(existing) => {
                let patch = RulePatch::override_fields(rule);
                let updated = self.store.update(existing.id, &patch)?;
                append_best_effort(
                    &*self.audit,
                    AuditEntry::updated(&existing, &updated, PROPAGATION_REASON, caller, SYSTEM_USER),
                );
                Ok(Applied::Updated)
            }
            None => {
                let materialized = PermissionRule {
                    id: Uuid::new_v4(),
                    department_id: department,
                    resource: rule.resource.clone(),
                    action: rule.action.clone(),
                    granted: rule.granted,
                    inherit_from_parent: true,
                    override_children: false,
                    conditions: rule.conditions.clone(),
                    priority: rule.priority,
                    expires_at: rule.expires_at,
                    created_by: SYSTEM_USER.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                self.store.insert(materialized.clone())?;
                append_best_effort(
                    &*self.audit,
                    AuditEntry::created(&materialized, PROPAGATION_REASON, caller, SYSTEM_USER),
                );
                Ok(Applied::Created)
            }
        }
    }
}
