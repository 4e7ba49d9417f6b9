/*!
 * Hierarchy Module
 * Read-only department topology: materialized paths, ancestor chains,
 * descendant sets
 */

pub mod memory;
pub mod traits;
pub mod types;

pub use memory::MemoryHierarchy;
pub use traits::Hierarchy;
pub use types::Department;
