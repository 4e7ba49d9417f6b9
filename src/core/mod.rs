/*!
 * Core Module
 * Shared types, errors, and limits for the permission engine
 */

pub mod errors;
pub mod limits;
pub mod types;

pub use errors::AclError;
pub use types::{AclResult, DeptId, PageRequest, PageResult, RuleId};
