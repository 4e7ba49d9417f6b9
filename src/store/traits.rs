/*!
 * Rule Store Traits
 * Storage abstraction for permission rules
 */

use crate::core::types::{AclResult, DeptId, RuleId};
use crate::rules::{PermissionRule, RuleFilter, RulePatch};

/// Durable storage of permission rules keyed by (department, resource, action)
///
/// Implementations must enforce tuple uniqueness: at most one rule per
/// `(department_id, resource, action)`, expired rules included. `insert`
/// failing with `Conflict` is the only cross-writer safety net the engine
/// relies on; no additional locking happens above this trait.
pub trait RuleStore: Send + Sync {
    /// Point lookup by rule id
    fn get(&self, id: RuleId) -> AclResult<Option<PermissionRule>>;

    /// Lookup by the unique tuple
    fn find_tuple(
        &self,
        department: DeptId,
        resource: &str,
        action: &str,
    ) -> AclResult<Option<PermissionRule>>;

    /// All rules owned by any of the given departments, filtered, ordered by
    /// `priority desc, created_at desc`
    fn find(&self, departments: &[DeptId], filter: &RuleFilter) -> AclResult<Vec<PermissionRule>>;

    /// Insert a new rule; `Conflict` if the tuple is already occupied
    fn insert(&self, rule: PermissionRule) -> AclResult<()>;

    /// Apply a partial update; `RuleNotFound` if absent. Bumps `updated_at`.
    fn update(&self, id: RuleId, patch: &RulePatch) -> AclResult<PermissionRule>;

    /// Delete all listed rules, skipping missing ids; returns the ids
    /// actually removed by this call
    fn delete_many(&self, ids: &[RuleId]) -> AclResult<Vec<RuleId>>;
}
