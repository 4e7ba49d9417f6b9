/*!
 * Permission Engine
 * Central facade wiring hierarchy, store, audit, resolution, propagation,
 * and batch operations
 *
 * Within one mutation the store write is sequenced before the audit write;
 * across calls no lock is held — concurrent writers for the same tuple are
 * serialized only by the store's uniqueness constraint (one wins, the other
 * gets `Conflict`).
 */

use crate::audit::{append_best_effort, AuditEntry, AuditSink};
use crate::batch::{BatchCreateOutcome, BatchDeleteOutcome, BatchOperations, CopyOutcome};
use crate::core::errors::AclError;
use crate::core::types::{AclResult, DeptId, PageRequest, PageResult, RuleId};
use crate::hierarchy::Hierarchy;
use crate::propagate::OverridePropagator;
use crate::resolver::{EffectiveRule, InheritanceResolver};
use crate::rules::{PermissionRule, RuleDraft, RuleFilter, RulePatch};
use crate::store::RuleStore;
use log::debug;
use std::sync::Arc;
use std::time::SystemTime;

const CREATE_REASON: &str = "rule created";
const UPDATE_REASON: &str = "rule updated";

/// Central permission engine
#[derive(Clone)]
pub struct PermissionEngine {
    hierarchy: Arc<dyn Hierarchy>,
    store: Arc<dyn RuleStore>,
    audit: Arc<dyn AuditSink>,
    resolver: InheritanceResolver,
    propagator: OverridePropagator,
    batch: BatchOperations,
}

impl PermissionEngine {
    pub fn new(
        hierarchy: Arc<dyn Hierarchy>,
        store: Arc<dyn RuleStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        debug!("initializing department permission engine");
        Self {
            resolver: InheritanceResolver::new(hierarchy.clone(), store.clone()),
            propagator: OverridePropagator::new(hierarchy.clone(), store.clone(), audit.clone()),
            batch: BatchOperations::new(hierarchy.clone(), store.clone(), audit.clone()),
            hierarchy,
            store,
            audit,
        }
    }

    /// Effective rules for a department, paginated
    ///
    /// All-or-nothing: an error never yields a partial rule list.
    pub fn resolve(
        &self,
        department: DeptId,
        filter: &RuleFilter,
        include_inherited: bool,
        page: PageRequest,
    ) -> AclResult<PageResult<EffectiveRule>> {
        let effective = self
            .resolver
            .resolve(department, filter, include_inherited)?;
        Ok(PageResult::paginate(effective, page))
    }

    /// Create a single rule
    ///
    /// `Conflict` if the tuple already holds a rule (expired rules still
    /// occupy their tuple; delete or update them instead). A rule flagged
    /// `override_children` is cascaded to all descendants before returning.
    pub fn create_rule(&self, draft: RuleDraft, caller: &str) -> AclResult<PermissionRule> {
        draft.validate()?;
        if !self.hierarchy.contains(draft.department_id) {
            return Err(AclError::DepartmentNotFound(draft.department_id));
        }
        // Pre-check for a clean conflict instead of a raw constraint violation
        if self
            .store
            .find_tuple(draft.department_id, &draft.resource, &draft.action)?
            .is_some()
        {
            return Err(AclError::Conflict {
                department: draft.department_id,
                resource: draft.resource,
                action: draft.action,
            });
        }

        let rule = draft.into_rule(caller, SystemTime::now());
        self.store.insert(rule.clone())?;
        append_best_effort(
            &*self.audit,
            AuditEntry::created(&rule, CREATE_REASON, caller, caller),
        );

        if rule.override_children {
            let report = self.propagator.propagate(&rule, caller)?;
            debug!(
                "override cascade for rule {}: created {}, updated {}, failed {}",
                rule.id, report.created, report.updated, report.failed
            );
        }
        Ok(rule)
    }

    /// Update a single rule by id
    ///
    /// If the rule carries (or acquires) `override_children`, the updated
    /// fields are cascaded to all descendants.
    pub fn update_rule(
        &self,
        id: RuleId,
        patch: &RulePatch,
        caller: &str,
    ) -> AclResult<PermissionRule> {
        let old = self.store.get(id)?.ok_or(AclError::RuleNotFound(id))?;
        let updated = self.store.update(id, patch)?;
        append_best_effort(
            &*self.audit,
            AuditEntry::updated(&old, &updated, UPDATE_REASON, caller, caller),
        );

        if updated.override_children {
            let report = self.propagator.propagate(&updated, caller)?;
            debug!(
                "override cascade for rule {}: created {}, updated {}, failed {}",
                updated.id, report.created, report.updated, report.failed
            );
        }
        Ok(updated)
    }

    /// Delete many rules; missing ids are skipped
    pub fn batch_delete(&self, ids: &[RuleId], caller: &str) -> AclResult<BatchDeleteOutcome> {
        self.batch.delete(ids, caller)
    }

    /// Create many rules; per-item failures do not abort the batch
    pub fn batch_create(
        &self,
        drafts: Vec<RuleDraft>,
        caller: &str,
    ) -> AclResult<BatchCreateOutcome> {
        self.batch.create(drafts, caller)
    }

    /// Copy every rule from one department to another
    pub fn copy_from(
        &self,
        source: DeptId,
        target: DeptId,
        caller: &str,
    ) -> AclResult<CopyOutcome> {
        self.batch.copy_rules(source, target, caller)
    }
}
