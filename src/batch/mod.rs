/*!
 * Batch Operations
 * Bulk administrative mutations: delete-many, create-many, copy-between-departments
 *
 * Batches are best-effort and per-item atomic: a rejected item never rolls
 * back its siblings, and every touched rule gets its own audit entry. The
 * outcome types carry counts and per-item rejections so partial application
 * is visible in the result, not just in logs.
 */

use crate::audit::{append_best_effort, AuditEntry, AuditSink};
use crate::core::errors::AclError;
use crate::core::limits::MAX_BATCH_ITEMS;
use crate::core::types::{AclResult, DeptId, RuleId};
use crate::hierarchy::Hierarchy;
use crate::rules::{PermissionRule, RuleDraft, RuleFilter};
use crate::store::RuleStore;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::SystemTime;

const BATCH_DELETE_REASON: &str = "batch delete";
const BATCH_CREATE_REASON: &str = "batch create";

/// Outcome of a batch delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchDeleteOutcome {
    pub requested: usize,
    pub deleted_count: usize,
}

/// One rejected batch item with its position and error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchRejection {
    pub index: usize,
    pub error: AclError,
}

/// Outcome of a batch create
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchCreateOutcome {
    pub requested: usize,
    pub created_count: usize,
    pub created: Vec<PermissionRule>,
    pub rejected: Vec<BatchRejection>,
}

/// Outcome of a copy-between-departments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CopyOutcome {
    pub copied_count: usize,
    pub created: Vec<PermissionRule>,
    /// Source rules whose tuple was already occupied on the target
    pub skipped: usize,
}

/// Orchestrates bulk mutations over store, hierarchy, and audit
#[derive(Clone)]
pub struct BatchOperations {
    hierarchy: Arc<dyn Hierarchy>,
    store: Arc<dyn RuleStore>,
    audit: Arc<dyn AuditSink>,
}

impl BatchOperations {
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

    fn check_size(len: usize) -> AclResult<()> {
        if len > MAX_BATCH_ITEMS {
            return Err(AclError::Validation(format!(
                "batch of {} items exceeds the {} item limit",
                len, MAX_BATCH_ITEMS
            )));
        }
        Ok(())
    }

    /// Delete the listed rules, auditing each one actually removed
    ///
    /// Idempotent: ids that no longer exist are silently skipped.
    pub fn delete(&self, ids: &[RuleId], actor: &str) -> AclResult<BatchDeleteOutcome> {
        Self::check_size(ids.len())?;

        // Fetch old values first so the audit trail keeps what was deleted
        let mut seen = HashSet::new();
        let mut doomed = Vec::new();
        for id in ids {
            if !seen.insert(*id) {
                continue;
            }
            if let Some(rule) = self.store.get(*id)? {
                doomed.push(rule);
            }
        }

        let doomed_ids: Vec<RuleId> = doomed.iter().map(|r| r.id).collect();
        let removed: HashSet<RuleId> = self.store.delete_many(&doomed_ids)?.into_iter().collect();
        debug!("batch delete: requested {}, deleted {}", ids.len(), removed.len());

        // A concurrent deletion may have beaten us to some of the fetched
        // rules; audit only what this call removed
        for rule in doomed.iter().filter(|rule| removed.contains(&rule.id)) {
            append_best_effort(
                &*self.audit,
                AuditEntry::deleted(rule, BATCH_DELETE_REASON, actor, actor),
            );
        }

        Ok(BatchDeleteOutcome {
            requested: ids.len(),
            deleted_count: removed.len(),
        })
    }

    /// Create rules from the drafts, attributing and timestamping them uniformly
    ///
    /// Per-item rejections (validation, unknown department, tuple conflict)
    /// do not abort the batch.
    pub fn create(&self, drafts: Vec<RuleDraft>, actor: &str) -> AclResult<BatchCreateOutcome> {
        Self::check_size(drafts.len())?;

        let requested = drafts.len();
        let now = SystemTime::now();
        let mut created = Vec::new();
        let mut rejected = Vec::new();

        for (index, draft) in drafts.into_iter().enumerate() {
            match self.create_one(draft, actor, now) {
                Ok(rule) => created.push(rule),
                Err(error) => rejected.push(BatchRejection { index, error }),
            }
        }
        debug!(
            "batch create: requested {}, created {}, rejected {}",
            requested,
            created.len(),
            rejected.len()
        );

        Ok(BatchCreateOutcome {
            requested,
            created_count: created.len(),
            created,
            rejected,
        })
    }

    fn create_one(
        &self,
        draft: RuleDraft,
        actor: &str,
        now: SystemTime,
    ) -> AclResult<PermissionRule> {
        draft.validate()?;
        if !self.hierarchy.contains(draft.department_id) {
            return Err(AclError::DepartmentNotFound(draft.department_id));
        }
        let rule = draft.into_rule(actor, now);
        self.store.insert(rule.clone())?;
        append_best_effort(
            &*self.audit,
            AuditEntry::created(&rule, BATCH_CREATE_REASON, actor, actor),
        );
        Ok(rule)
    }

    /// Clone every rule of `source` onto `target`
    ///
    /// Copies keep resource/action/granted/flags/conditions/priority/expiry;
    /// each copy gets a fresh id and is attributed to the actor. Target
    /// tuples that are already occupied are skipped, not overwritten.
    pub fn copy_rules(
        &self,
        source: DeptId,
        target: DeptId,
        actor: &str,
    ) -> AclResult<CopyOutcome> {
        if !self.hierarchy.contains(source) {
            return Err(AclError::DepartmentNotFound(source));
        }
        if !self.hierarchy.contains(target) {
            return Err(AclError::DepartmentNotFound(target));
        }

        let source_rules = self.store.find(&[source], &RuleFilter::any())?;
        let now = SystemTime::now();
        let reason = format!("copied from department {}", source);

        let mut created = Vec::new();
        let mut skipped = 0;
        for rule in source_rules {
            let copy = rule.clone_for(target, actor, now);
            match self.store.insert(copy.clone()) {
                Ok(()) => {
                    append_best_effort(
                        &*self.audit,
                        AuditEntry::created(&copy, &reason, actor, actor),
                    );
                    created.push(copy);
                }
                Err(AclError::Conflict { .. }) => skipped += 1,
                Err(err) => {
                    warn!(
                        "copy of ({}, {}) to department {} failed: {}",
                        rule.resource, rule.action, target, err
                    );
                    skipped += 1;
                }
            }
        }
        debug!(
            "copy {} -> {}: copied {}, skipped {}",
            source,
            target,
            created.len(),
            skipped
        );

        Ok(CopyOutcome {
            copied_count: created.len(),
            created,
            skipped,
        })
    }
}
