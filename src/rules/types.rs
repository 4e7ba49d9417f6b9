/*!
 * Rule Types
 * Core types for department-scoped permission rules
 */

use crate::core::errors::AclError;
use crate::core::types::{AclResult, DeptId, RuleId};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::time::SystemTime;
use uuid::Uuid;

/// Opaque condition map attached to a rule; never interpreted by the engine
pub type Conditions = serde_json::Map<String, serde_json::Value>;

/// A permission rule scoped to one department
///
/// At most one rule exists per `(department_id, resource, action)` tuple;
/// the store enforces this. An expired rule still occupies its tuple but is
/// skipped during resolution.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PermissionRule {
    pub id: RuleId,
    pub department_id: DeptId,
    pub resource: String,
    pub action: String,
    pub granted: bool,
    pub inherit_from_parent: bool,
    pub override_children: bool,
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    pub conditions: Conditions,
    pub priority: i32,
    #[serde_as(as = "Option<TimestampSeconds<i64>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<SystemTime>,
    pub created_by: String,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub created_at: SystemTime,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub updated_at: SystemTime,
}

impl PermissionRule {
    /// An active rule has no expiry, or an expiry still in the future
    pub fn is_active(&self, now: SystemTime) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }

    pub fn is_expired(&self, now: SystemTime) -> bool {
        !self.is_active(now)
    }

    /// Clone this rule onto another department with a fresh identity
    ///
    /// Used by copy-between-departments: same tuple and behavior fields,
    /// new id, new owner, new attribution.
    pub fn clone_for(&self, department: DeptId, created_by: &str, now: SystemTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            department_id: department,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}

fn default_true() -> bool {
    true
}

/// Specification for a rule to be created
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RuleDraft {
    pub department_id: DeptId,
    pub resource: String,
    pub action: String,
    pub granted: bool,
    #[serde(default = "default_true")]
    pub inherit_from_parent: bool,
    #[serde(default)]
    pub override_children: bool,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub priority: i32,
    #[serde_as(as = "Option<TimestampSeconds<i64>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<SystemTime>,
}

impl RuleDraft {
    pub fn new(
        department_id: DeptId,
        resource: impl Into<String>,
        action: impl Into<String>,
        granted: bool,
    ) -> Self {
        Self {
            department_id,
            resource: resource.into(),
            action: action.into(),
            granted,
            inherit_from_parent: true,
            override_children: false,
            conditions: Conditions::new(),
            priority: 0,
            expires_at: None,
        }
    }

    pub fn cascading(mut self, override_children: bool) -> Self {
        self.override_children = override_children;
        self
    }

    pub fn inheritable(mut self, inherit_from_parent: bool) -> Self {
        self.inherit_from_parent = inherit_from_parent;
        self
    }

    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn expiring_at(mut self, at: SystemTime) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn validate(&self) -> AclResult<()> {
        if self.resource.trim().is_empty() {
            return Err(AclError::Validation("resource must not be empty".into()));
        }
        if self.action.trim().is_empty() {
            return Err(AclError::Validation("action must not be empty".into()));
        }
        Ok(())
    }

    /// Materialize the draft into a stored rule
    pub fn into_rule(self, created_by: &str, now: SystemTime) -> PermissionRule {
        PermissionRule {
            id: Uuid::new_v4(),
            department_id: self.department_id,
            resource: self.resource,
            action: self.action,
            granted: self.granted,
            inherit_from_parent: self.inherit_from_parent,
            override_children: self.override_children,
            conditions: self.conditions,
            priority: self.priority,
            expires_at: self.expires_at,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for an existing rule
///
/// `expires_at` is doubly optional: `None` leaves the expiry untouched,
/// `Some(None)` clears it, `Some(Some(t))` sets it.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RulePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit_from_parent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_children: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde_as(as = "Option<Option<TimestampSeconds<i64>>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Option<SystemTime>>,
}

impl RulePatch {
    /// Patch carrying the fields an override cascade imposes on descendants
    ///
    /// Deliberately leaves `inherit_from_parent` and `override_children`
    /// unset: a descendant's own flags survive propagation.
    pub fn override_fields(source: &PermissionRule) -> Self {
        Self {
            granted: Some(source.granted),
            conditions: Some(source.conditions.clone()),
            priority: Some(source.priority),
            expires_at: Some(source.expires_at),
            ..Self::default()
        }
    }

    pub fn apply(&self, rule: &mut PermissionRule, now: SystemTime) {
        if let Some(granted) = self.granted {
            rule.granted = granted;
        }
        if let Some(inherit) = self.inherit_from_parent {
            rule.inherit_from_parent = inherit;
        }
        if let Some(cascade) = self.override_children {
            rule.override_children = cascade;
        }
        if let Some(ref conditions) = self.conditions {
            rule.conditions = conditions.clone();
        }
        if let Some(priority) = self.priority {
            rule.priority = priority;
        }
        if let Some(expires_at) = self.expires_at {
            rule.expires_at = expires_at;
        }
        rule.updated_at = now;
    }
}

/// Filter over resource and action; `None` matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RuleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl RuleFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn on(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            action: Some(action.into()),
        }
    }

    pub fn resource(resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            action: None,
        }
    }

    pub fn matches(&self, rule: &PermissionRule) -> bool {
        self.resource.as_deref().map_or(true, |r| r == rule.resource)
            && self.action.as_deref().map_or(true, |a| a == rule.action)
    }
}
