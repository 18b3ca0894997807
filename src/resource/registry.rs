use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::metadata::{RelationshipMeta, ResourceMetadata};
use super::rules::{FieldRule, RuleSource};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Resource type '{0}' is registered twice")]
    DuplicateType(String),

    #[error("Relationship '{relationship}' on '{resource_type}' targets unknown type '{target}'")]
    UnknownTarget {
        resource_type: String,
        relationship: String,
        target: String,
    },
}

/// Collects descriptors; relationship targets are only checked in `build`,
/// so types may reference each other in any registration order.
#[derive(Default)]
pub struct ResourceRegistryBuilder {
    resources: Vec<ResourceMetadata>,
    rules: Option<Arc<dyn RuleSource>>,
}

impl ResourceRegistryBuilder {
    pub fn register(mut self, meta: ResourceMetadata) -> Self {
        self.resources.push(meta);
        self
    }

    pub fn register_all(mut self, metas: impl IntoIterator<Item = ResourceMetadata>) -> Self {
        self.resources.extend(metas);
        self
    }

    pub fn rules(mut self, rules: Arc<dyn RuleSource>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn build(self) -> Result<ResourceRegistry, RegistryError> {
        let mut resources = HashMap::with_capacity(self.resources.len());
        let mut order = Vec::with_capacity(self.resources.len());

        for meta in self.resources {
            if resources.contains_key(&meta.resource_type) {
                return Err(RegistryError::DuplicateType(meta.resource_type));
            }
            order.push(meta.resource_type.clone());
            resources.insert(meta.resource_type.clone(), Arc::new(meta));
        }

        for name in &order {
            let meta = &resources[name];
            for rel in &meta.relationships {
                if !resources.contains_key(&rel.target_type) {
                    return Err(RegistryError::UnknownTarget {
                        resource_type: meta.resource_type.clone(),
                        relationship: rel.exposed_name.clone(),
                        target: rel.target_type.clone(),
                    });
                }
            }
        }

        tracing::debug!(types = order.len(), "resource registry built");
        Ok(ResourceRegistry { resources, order, rules: self.rules })
    }
}

/// Immutable after `build`; share it behind an `Arc` and read without locks.
pub struct ResourceRegistry {
    resources: HashMap<String, Arc<ResourceMetadata>>,
    order: Vec<String>,
    rules: Option<Arc<dyn RuleSource>>,
}

impl ResourceRegistry {
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::default()
    }

    pub fn get(&self, resource_type: &str) -> Option<&ResourceMetadata> {
        self.resources.get(resource_type).map(Arc::as_ref)
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.resources.contains_key(resource_type)
    }

    /// Registered type names in registration order
    pub fn types(&self) -> &[String] {
        &self.order
    }

    /// Metadata of the type a relationship points at
    pub fn target_of(&self, relationship: &RelationshipMeta) -> Option<&ResourceMetadata> {
        self.get(&relationship.target_type)
    }

    /// Validation rules for a type, empty when no rule source is configured
    pub fn rules_for(&self, resource_type: &str) -> Vec<FieldRule> {
        self.rules
            .as_ref()
            .map(|source| source.rules_for(resource_type))
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("types", &self.order)
            .field("rules", &self.rules.is_some())
            .finish()
    }
}
