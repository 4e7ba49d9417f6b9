/*!
 * Audit Module
 * Append-only trail of rule mutations for external compliance tooling
 *
 * The engine only ever appends; it never reads the trail back. Appends are
 * best-effort from the caller's perspective: a failed audit write must not
 * fail the permission change it describes (see `append_best_effort`).
 */

use crate::core::limits::{MAX_AUDIT_ENTRIES, MAX_DEPT_AUDIT_ENTRIES};
use crate::core::types::{AclResult, DeptId};
use crate::rules::PermissionRule;
use ahash::RandomState;
use dashmap::DashMap;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;
use uuid::Uuid;

/// Kind of mutation an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
}

/// One audited rule mutation
///
/// `user_id` is the caller the mutation was performed for; `changed_by` is
/// who physically wrote it. They differ only for system-attributed writes
/// such as override propagation.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: String,
    pub department_id: DeptId,
    pub resource: String,
    pub action: String,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
    pub reason: String,
    pub changed_by: String,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub created_at: SystemTime,
}

impl AuditEntry {
    fn snapshot(rule: &PermissionRule) -> Option<serde_json::Value> {
        serde_json::to_value(rule).ok()
    }

    fn base(
        rule: &PermissionRule,
        change_type: ChangeType,
        reason: &str,
        user_id: &str,
        changed_by: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            department_id: rule.department_id,
            resource: rule.resource.clone(),
            action: rule.action.clone(),
            change_type,
            old_value: None,
            new_value: None,
            reason: reason.to_string(),
            changed_by: changed_by.to_string(),
            created_at: SystemTime::now(),
        }
    }

    pub fn created(rule: &PermissionRule, reason: &str, user_id: &str, changed_by: &str) -> Self {
        Self {
            new_value: Self::snapshot(rule),
            ..Self::base(rule, ChangeType::Create, reason, user_id, changed_by)
        }
    }

    pub fn updated(
        old: &PermissionRule,
        new: &PermissionRule,
        reason: &str,
        user_id: &str,
        changed_by: &str,
    ) -> Self {
        Self {
            old_value: Self::snapshot(old),
            new_value: Self::snapshot(new),
            ..Self::base(new, ChangeType::Update, reason, user_id, changed_by)
        }
    }

    pub fn deleted(old: &PermissionRule, reason: &str, user_id: &str, changed_by: &str) -> Self {
        Self {
            old_value: Self::snapshot(old),
            ..Self::base(old, ChangeType::Delete, reason, user_id, changed_by)
        }
    }
}

/// One-way audit channel
pub trait AuditSink: Send + Sync {
    /// Append a single entry
    fn append(&self, entry: AuditEntry) -> AclResult<()>;
}

/// Append without letting a sink failure escape to the primary mutation
pub fn append_best_effort(sink: &dyn AuditSink, entry: AuditEntry) {
    if let Err(err) = sink.append(entry) {
        warn!(
            "audit append failed (mutation already committed, retryable: {}): {}",
            err.is_retryable(),
            err
        );
    }
}

/// In-memory audit sink
///
/// Ring-buffered global log plus per-department logs, for embedding and
/// tests. The accessors exist for external tooling; the engine never calls
/// them.
pub struct MemoryAuditSink {
    entries: parking_lot::RwLock<VecDeque<AuditEntry>>,
    dept_entries: Arc<DashMap<DeptId, VecDeque<AuditEntry>, RandomState>>,
    change_counts: Arc<DashMap<ChangeType, u64, RandomState>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self {
            entries: parking_lot::RwLock::new(VecDeque::with_capacity(MAX_AUDIT_ENTRIES)),
            dept_entries: Arc::new(DashMap::with_hasher(RandomState::new())),
            change_counts: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read();
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Most recent entries for one department, newest first
    pub fn for_department(&self, department: DeptId, limit: usize) -> Vec<AuditEntry> {
        if let Some(entry) = self.dept_entries.get(&department) {
            entry.iter().rev().take(limit).cloned().collect()
        } else {
            Vec::new()
        }
    }

    fn count(&self, change_type: ChangeType) -> u64 {
        self.change_counts.get(&change_type).map(|e| *e).unwrap_or(0)
    }

    pub fn stats(&self) -> AuditStats {
        AuditStats {
            total_entries: self.entries.read().len(),
            creates: self.count(ChangeType::Create),
            updates: self.count(ChangeType::Update),
            deletes: self.count(ChangeType::Delete),
            departments_tracked: self.dept_entries.len(),
        }
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, entry: AuditEntry) -> AclResult<()> {
        let department = entry.department_id;

        {
            let mut entries = self.entries.write();
            if entries.len() >= MAX_AUDIT_ENTRIES {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }

        self.change_counts
            .entry(entry.change_type)
            .and_modify(|count| *count += 1)
            .or_insert(1);

        let mut dept_log = self
            .dept_entries
            .entry(department)
            .or_insert_with(|| VecDeque::with_capacity(MAX_DEPT_AUDIT_ENTRIES));
        if dept_log.len() >= MAX_DEPT_AUDIT_ENTRIES {
            dept_log.pop_front();
        }
        dept_log.push_back(entry);

        Ok(())
    }
}

/// Audit statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_entries: usize,
    pub creates: u64,
    pub updates: u64,
    pub deletes: u64,
    pub departments_tracked: usize,
}
