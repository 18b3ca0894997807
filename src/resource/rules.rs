use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validation rule declared for a resource attribute, e.g.
/// `{ field: "title", rule: "maxLength", constraint: 200 }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub field: String,
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Value>,
}

/// Optional source of validation rules for describe output. Deployments
/// without one simply report no rules.
pub trait RuleSource: Send + Sync {
    fn rules_for(&self, resource_type: &str) -> Vec<FieldRule>;
}

/// Rules declared up front, keyed by resource type
#[derive(Debug, Clone, Default)]
pub struct StaticRules {
    rules: HashMap<String, Vec<FieldRule>>,
}

impl StaticRules {
    pub fn new(rules: HashMap<String, Vec<FieldRule>>) -> Self {
        Self { rules }
    }
}

impl RuleSource for StaticRules {
    fn rules_for(&self, resource_type: &str) -> Vec<FieldRule> {
        self.rules.get(resource_type).cloned().unwrap_or_default()
    }
}
