/*!
 * Rules Module
 * Permission rule data model: stored rules, creation drafts, partial patches
 */

pub mod types;

pub use types::{Conditions, PermissionRule, RuleDraft, RuleFilter, RulePatch};
