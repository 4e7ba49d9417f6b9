/*!
 * Hierarchy Traits
 * Read-only seam over department topology
 */

use super::types::Department;
use crate::core::types::{AclResult, DeptId};

/// Department topology lookup
///
/// Implementations expose no mutation through this trait; the engine treats
/// the hierarchy as a shared read-only collaborator.
pub trait Hierarchy: Send + Sync {
    /// Look up a single department
    fn department(&self, id: DeptId) -> Option<Department>;

    /// Check existence
    fn contains(&self, id: DeptId) -> bool {
        self.department(id).is_some()
    }

    /// Ordered ancestor chain `[root, ..., id]`, inclusive of self
    fn ancestor_chain(&self, id: DeptId) -> AclResult<Vec<DeptId>>;

    /// All departments below `id`, excluding `id` itself
    fn descendants(&self, id: DeptId) -> AclResult<Vec<DeptId>>;
}
