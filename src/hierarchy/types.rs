/*!
 * Department Types
 */

use crate::core::errors::AclError;
use crate::core::types::{AclResult, DeptId};
use serde::{Deserialize, Serialize};

/// A node in the organizational tree
///
/// `path` is the materialized ancestor path from the root down to and
/// including this department. Ancestor-chain lookup is a plain read of this
/// list; descendant lookup is a prefix match over other departments' paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Department {
    pub id: DeptId,
    pub name: String,
    pub parent_id: Option<DeptId>,
    pub path: Vec<DeptId>,
}

impl Department {
    pub fn root(id: DeptId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            path: vec![id],
        }
    }

    pub fn child_of(parent: &Department, id: DeptId, name: impl Into<String>) -> Self {
        let mut path = parent.path.clone();
        path.push(id);
        Self {
            id,
            name: name.into(),
            parent_id: Some(parent.id),
            path,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// True if this department's path is a strict prefix of the other's
    pub fn is_ancestor_of(&self, other: &Department) -> bool {
        other.path.len() > self.path.len() && other.path[..self.path.len()] == self.path[..]
    }

    /// Check path/parent consistency
    pub fn validate(&self) -> AclResult<()> {
        if self.path.last() != Some(&self.id) {
            return Err(AclError::Validation(format!(
                "department {} path must end with its own id",
                self.id
            )));
        }
        let expected_parent = if self.path.len() >= 2 {
            Some(self.path[self.path.len() - 2])
        } else {
            None
        };
        if self.parent_id != expected_parent {
            return Err(AclError::Validation(format!(
                "department {} parent is inconsistent with its path",
                self.id
            )));
        }
        // A repeated id in the path would mean a cycle
        for (i, a) in self.path.iter().enumerate() {
            if self.path[i + 1..].contains(a) {
                return Err(AclError::Validation(format!(
                    "department {} path contains a cycle through {}",
                    self.id, a
                )));
            }
        }
        Ok(())
    }
}
