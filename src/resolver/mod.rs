/*!
 * Inheritance Resolver
 * Computes the effective rule set for a department by walking its ancestor
 * chain leaf to root
 *
 * Specificity: the first department in the walk that declares a
 * `(resource, action)` tuple owns it; more distant ancestors never override
 * a closer declaration, regardless of priority.
 */

use crate::core::types::{AclResult, DeptId};
use crate::hierarchy::Hierarchy;
use crate::rules::{PermissionRule, RuleFilter};
use crate::store::RuleStore;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::SystemTime;

/// A resolved rule annotated with its origin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EffectiveRule {
    #[serde(flatten)]
    pub rule: PermissionRule,
    pub is_inherited: bool,
    /// Department the rule actually originated from; `None` if local
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<DeptId>,
}

impl EffectiveRule {
    fn local(rule: PermissionRule) -> Self {
        Self {
            rule,
            is_inherited: false,
            inherited_from: None,
        }
    }

    fn inherited(rule: PermissionRule, from: DeptId) -> Self {
        Self {
            rule,
            is_inherited: true,
            inherited_from: Some(from),
        }
    }
}

/// Effective permission computation over hierarchy and store
#[derive(Clone)]
pub struct InheritanceResolver {
    hierarchy: Arc<dyn Hierarchy>,
    store: Arc<dyn RuleStore>,
}

impl InheritanceResolver {
    pub fn new(hierarchy: Arc<dyn Hierarchy>, store: Arc<dyn RuleStore>) -> Self {
        Self { hierarchy, store }
    }

    /// Resolve the effective rule set for a department
    ///
    /// Results are ordered nearest-department-first. With
    /// `include_inherited == false` only locally declared rules remain.
    pub fn resolve(
        &self,
        department: DeptId,
        filter: &RuleFilter,
        include_inherited: bool,
    ) -> AclResult<Vec<EffectiveRule>> {
        let chain = self.hierarchy.ancestor_chain(department)?;
        debug!(
            "resolving department {} (chain depth {}, filter {:?})",
            department,
            chain.len(),
            filter
        );

        // One batched fetch over the whole chain
        let rules = self.store.find(&chain, filter)?;
        let now = SystemTime::now();

        let mut by_dept: HashMap<DeptId, Vec<PermissionRule>> = HashMap::new();
        for rule in rules {
            by_dept.entry(rule.department_id).or_default().push(rule);
        }

        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut effective = Vec::new();

        // Leaf to root: the target department first, the root last
        for dept in chain.iter().rev() {
            let Some(mut local) = by_dept.remove(dept) else {
                continue;
            };
            // Defensive tie-break if a store ever returns duplicate tuples
            // for one department: highest priority, then most recent
            local.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then(b.created_at.cmp(&a.created_at))
            });

            for rule in local {
                if rule.is_expired(now) {
                    continue;
                }
                let key = (rule.resource.clone(), rule.action.clone());
                if !seen.insert(key) {
                    continue;
                }
                effective.push(if *dept == department {
                    EffectiveRule::local(rule)
                } else {
                    EffectiveRule::inherited(rule, *dept)
                });
            }
        }

        if !include_inherited {
            effective.retain(|r| r.inherited_from.is_none());
        }
        Ok(effective)
    }
}
