/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::{DeptId, RuleId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Permission engine errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum AclError {
    #[error("Department {0} not found")]
    #[diagnostic(
        code(acl::department_not_found),
        help("The department does not exist in the hierarchy. Check the department id.")
    )]
    DepartmentNotFound(DeptId),

    #[error("Rule {0} not found")]
    #[diagnostic(
        code(acl::rule_not_found),
        help("The rule may have been deleted. Re-resolve before updating.")
    )]
    RuleNotFound(RuleId),

    #[error("Rule already exists for department {department}, resource '{resource}', action '{action}'")]
    #[diagnostic(
        code(acl::conflict),
        help("At most one rule may exist per (department, resource, action). Update the existing rule instead.")
    )]
    Conflict {
        department: DeptId,
        resource: String,
        action: String,
    },

    #[error("Validation failed: {0}")]
    #[diagnostic(
        code(acl::validation),
        help("A required field is missing or invalid. Check resource, action, and batch size.")
    )]
    Validation(String),

    #[error("Store error: {0}")]
    #[diagnostic(
        code(acl::store),
        help("The underlying rule store failed. The mutation did not complete.")
    )]
    Store(String),
}

impl AclError {
    /// Deterministic caller errors are never worth retrying; store errors may be
    pub fn is_retryable(&self) -> bool {
        matches!(self, AclError::Store(_))
    }
}
