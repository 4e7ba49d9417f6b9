/*!
 * Store Module
 * Durable rule storage seam plus the in-memory reference backend
 */

pub mod memory;
pub mod traits;

pub use memory::MemoryRuleStore;
pub use traits::RuleStore;
