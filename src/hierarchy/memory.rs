/*!
 * In-Memory Hierarchy Backend
 * DashMap-backed department topology for embedding and tests
 */

use super::traits::Hierarchy;
use super::types::Department;
use crate::core::errors::AclError;
use crate::core::types::{AclResult, DeptId};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory hierarchy implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryHierarchy {
    departments: Arc<DashMap<DeptId, Department, RandomState>>,
}

impl MemoryHierarchy {
    pub fn new() -> Self {
        Self {
            departments: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Insert a pre-built department, validating path consistency
    pub fn insert(&self, department: Department) -> AclResult<()> {
        department.validate()?;

        if let Some(parent_id) = department.parent_id {
            let parent = self
                .departments
                .get(&parent_id)
                .ok_or(AclError::DepartmentNotFound(parent_id))?;
            if department.path[..department.path.len() - 1] != parent.path[..] {
                return Err(AclError::Validation(format!(
                    "department {} path does not extend its parent's path",
                    department.id
                )));
            }
        }

        // Entry API keeps racing inserts of the same id from overwriting
        match self.departments.entry(department.id) {
            Entry::Occupied(_) => Err(AclError::Validation(format!(
                "department {} already exists",
                department.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(department);
                Ok(())
            }
        }
    }

    /// Create and insert a root department
    pub fn insert_root(&self, id: DeptId, name: impl Into<String>) -> AclResult<Department> {
        let department = Department::root(id, name);
        self.insert(department.clone())?;
        Ok(department)
    }

    /// Create and insert a department under an existing parent
    pub fn insert_child(
        &self,
        parent_id: DeptId,
        id: DeptId,
        name: impl Into<String>,
    ) -> AclResult<Department> {
        let parent = self
            .departments
            .get(&parent_id)
            .map(|entry| entry.clone())
            .ok_or(AclError::DepartmentNotFound(parent_id))?;
        let department = Department::child_of(&parent, id, name);
        self.insert(department.clone())?;
        Ok(department)
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }
}

impl Hierarchy for MemoryHierarchy {
    fn department(&self, id: DeptId) -> Option<Department> {
        self.departments.get(&id).map(|entry| entry.clone())
    }

    fn ancestor_chain(&self, id: DeptId) -> AclResult<Vec<DeptId>> {
        self.departments
            .get(&id)
            .map(|entry| entry.path.clone())
            .ok_or(AclError::DepartmentNotFound(id))
    }

    fn descendants(&self, id: DeptId) -> AclResult<Vec<DeptId>> {
        let target = self
            .departments
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(AclError::DepartmentNotFound(id))?;

        let mut found: Vec<(usize, DeptId)> = self
            .departments
            .iter()
            .filter(|entry| target.is_ancestor_of(entry.value()))
            .map(|entry| (entry.path.len(), entry.id))
            .collect();

        // Shallow-first, then by id, so fanout order is deterministic
        found.sort_unstable();
        Ok(found.into_iter().map(|(_, id)| id).collect())
    }
}
