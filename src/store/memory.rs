/*!
 * In-Memory Rule Store Backend
 * DashMap-backed store with an atomic tuple uniqueness index
 */

use super::traits::RuleStore;
use crate::core::errors::AclError;
use crate::core::types::{AclResult, DeptId, RuleId};
use crate::rules::{PermissionRule, RuleFilter, RulePatch};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::SystemTime;

/// Uniqueness key over (department, resource, action)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TupleKey {
    department: DeptId,
    resource: String,
    action: String,
}

impl TupleKey {
    fn of(rule: &PermissionRule) -> Self {
        Self {
            department: rule.department_id,
            resource: rule.resource.clone(),
            action: rule.action.clone(),
        }
    }
}

/// In-memory rule store implementation
///
/// The tuple index entry API makes insert-or-conflict a single atomic step,
/// so two racing writers for the same tuple see one success and one
/// `Conflict`.
#[derive(Debug, Clone, Default)]
pub struct MemoryRuleStore {
    rules: Arc<DashMap<RuleId, PermissionRule, RandomState>>,
    tuples: Arc<DashMap<TupleKey, RuleId, RandomState>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(DashMap::with_hasher(RandomState::new())),
            tuples: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleStore for MemoryRuleStore {
    fn get(&self, id: RuleId) -> AclResult<Option<PermissionRule>> {
        Ok(self.rules.get(&id).map(|entry| entry.clone()))
    }

    fn find_tuple(
        &self,
        department: DeptId,
        resource: &str,
        action: &str,
    ) -> AclResult<Option<PermissionRule>> {
        let key = TupleKey {
            department,
            resource: resource.to_string(),
            action: action.to_string(),
        };
        let Some(id) = self.tuples.get(&key).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.rules.get(&id).map(|entry| entry.clone()))
    }

    fn find(&self, departments: &[DeptId], filter: &RuleFilter) -> AclResult<Vec<PermissionRule>> {
        let mut found: Vec<PermissionRule> = self
            .rules
            .iter()
            .filter(|entry| departments.contains(&entry.department_id) && filter.matches(entry))
            .map(|entry| entry.clone())
            .collect();

        found.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(found)
    }

    fn insert(&self, rule: PermissionRule) -> AclResult<()> {
        match self.tuples.entry(TupleKey::of(&rule)) {
            Entry::Occupied(_) => Err(AclError::Conflict {
                department: rule.department_id,
                resource: rule.resource,
                action: rule.action,
            }),
            Entry::Vacant(slot) => {
                slot.insert(rule.id);
                self.rules.insert(rule.id, rule);
                Ok(())
            }
        }
    }

    fn update(&self, id: RuleId, patch: &RulePatch) -> AclResult<PermissionRule> {
        let mut entry = self.rules.get_mut(&id).ok_or(AclError::RuleNotFound(id))?;
        patch.apply(entry.value_mut(), SystemTime::now());
        Ok(entry.clone())
    }

    fn delete_many(&self, ids: &[RuleId]) -> AclResult<Vec<RuleId>> {
        let mut deleted = Vec::new();
        for id in ids {
            if let Some((_, rule)) = self.rules.remove(id) {
                self.tuples.remove(&TupleKey::of(&rule));
                deleted.push(rule.id);
            }
        }
        Ok(deleted)
    }
}
