use std::collections::HashSet;

use serde_json::Value;

use super::document::{ResourceIdentifier, ResourceObject};
use super::serializer::{record_id, ResourceSerializer, SerializeError, SerializeOptions};
use crate::resource::ResourceMetadata;

/// A related record tagged with the relationship that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct IncludedResource {
    pub relation_name: String,
    pub data: Value,
}

impl IncludedResource {
    pub fn new(relation_name: impl Into<String>, data: Value) -> Self {
        Self { relation_name: relation_name.into(), data }
    }
}

#[derive(Debug, Clone)]
pub enum IncludedSource {
    /// Records paired with the parent relationship they came from
    Related(Vec<IncludedResource>),
    /// Untagged records; the target type is guessed from the parent's
    /// relationships in declaration order
    #[deprecated(note = "ambiguous when relationships share a shape; use IncludedSource::Related")]
    Bare(Vec<Value>),
}

/// Accumulates `included` resources with a `type:id` seen-set, which is
/// what keeps cyclic graphs (article → author → article) finite.
pub struct IncludedCollector<'a, 'r> {
    serializer: ResourceSerializer<'r>,
    options: &'a SerializeOptions,
    seen: HashSet<String>,
    resources: Vec<ResourceObject>,
}

impl<'a, 'r> IncludedCollector<'a, 'r> {
    pub fn new(serializer: ResourceSerializer<'r>, options: &'a SerializeOptions) -> Self {
        Self { serializer, options, seen: HashSet::new(), resources: Vec::new() }
    }

    /// Mark a resource as already present in the document (primary data)
    pub fn seed(&mut self, identifier: &ResourceIdentifier) {
        self.seen.insert(identifier.key());
    }

    /// Resolve through the parent's relationship map, never the record itself
    pub fn add_related(
        &mut self,
        parent: &ResourceMetadata,
        relation_name: &str,
        record: &Value,
    ) -> Result<(), SerializeError> {
        let Some(rel) = parent.relationship(relation_name) else {
            tracing::debug!(parent = %parent.resource_type, relation = relation_name, "unknown relationship in included data");
            return Ok(());
        };
        let target = self.serializer.metadata(&rel.target_type)?;
        self.add(record, target)
    }

    pub fn add_bare(&mut self, parent: &ResourceMetadata, record: &Value) -> Result<(), SerializeError> {
        for rel in &parent.relationships {
            let target = self.serializer.metadata(&rel.target_type)?;
            if record_id(record, target).is_some() {
                return self.add(record, target);
            }
        }
        Ok(())
    }

    /// Follow a dotted include path from `records` (all of type `meta`).
    /// Already-seen nodes are still traversed so deeper segments resolve,
    /// but each `type:id` is serialized at most once.
    pub fn walk_path(
        &mut self,
        records: &[Value],
        meta: &'r ResourceMetadata,
        path: &str,
    ) -> Result<(), SerializeError> {
        let mut frontier: Vec<(&'r ResourceMetadata, &Value)> = records.iter().map(|r| (meta, r)).collect();

        for segment in path.split('.') {
            let mut next = Vec::new();
            for (parent, record) in frontier {
                let Some(rel) = parent.relationship(segment) else { continue };
                let Some(value) = record.get(&rel.source_key) else { continue };
                let target = self.serializer.metadata(&rel.target_type)?;

                let items: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                for item in items.into_iter().filter(|item| item.is_object()) {
                    self.add(item, target)?;
                    next.push((target, item));
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        Ok(())
    }

    pub fn finish(self) -> Vec<ResourceObject> {
        self.resources
    }

    fn add(&mut self, record: &Value, target: &ResourceMetadata) -> Result<(), SerializeError> {
        // stubs without an id cannot be linked, skip them
        let Some(id) = record_id(record, target) else { return Ok(()) };
        let key = format!("{}:{}", target.resource_type, id);
        if !self.seen.insert(key) {
            return Ok(());
        }
        let resource = self.serializer.resource_object(record, target, self.options)?;
        self.resources.push(resource);
        Ok(())
    }
}
