use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::document::{
    Document, PrimaryData, Relationship, RelationshipData, ResourceIdentifier, ResourceObject,
};
use super::included::{IncludedCollector, IncludedSource};
use super::pagination::PageContext;
use crate::resource::{AttributeKind, Cardinality, RelationshipMeta, ResourceMetadata, ResourceRegistry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("Resource type '{0}' is not registered")]
    UnknownType(String),

    #[error("Record of type '{0}' has no usable id")]
    MissingId(String),

    #[error("Record of type '{0}' is not an object")]
    NotAnObject(String),
}

/// Per-call shaping options; nothing here outlives the request.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Sparse fieldsets by resource type
    pub fields: BTreeMap<String, Vec<String>>,
    /// Dotted include paths to walk for the `included` array
    pub include: Vec<String>,
    /// Collection paging; adds `links` and `meta.page`
    pub page: Option<PageContext>,
    /// Extra top-level `meta` entries
    pub meta: Map<String, Value>,
}

impl SerializeOptions {
    pub(crate) fn fields_for(&self, resource_type: &str) -> Option<&[String]> {
        self.fields
            .get(resource_type)
            .filter(|list| !list.is_empty())
            .map(Vec::as_slice)
    }
}

/// Turns records into JSON:API documents using the registered metadata
#[derive(Debug, Clone, Copy)]
pub struct ResourceSerializer<'r> {
    registry: &'r ResourceRegistry,
}

impl<'r> ResourceSerializer<'r> {
    pub fn new(registry: &'r ResourceRegistry) -> Self {
        Self { registry }
    }

    /// `None` yields `{data: null}` without looking the type up.
    pub fn serialize_one(
        &self,
        record: Option<&Value>,
        resource_type: &str,
        options: &SerializeOptions,
    ) -> Result<Document, SerializeError> {
        let Some(record) = record else {
            let mut doc = Document::null();
            doc.extend_meta(options.meta.clone());
            return Ok(doc);
        };

        let meta = self.metadata(resource_type)?;
        let resource = self.resource_object(record, meta, options)?;

        let mut doc = Document::new(PrimaryData::Single(Some(resource.clone())));
        doc.included = self.walk_included(std::slice::from_ref(record), meta, &[resource], options)?;
        doc.extend_meta(options.meta.clone());
        Ok(doc)
    }

    pub fn serialize_many(
        &self,
        records: &[Value],
        resource_type: &str,
        options: &SerializeOptions,
    ) -> Result<Document, SerializeError> {
        let meta = self.metadata(resource_type)?;
        let resources = records
            .iter()
            .map(|record| self.resource_object(record, meta, options))
            .collect::<Result<Vec<_>, _>>()?;

        let included = self.walk_included(records, meta, &resources, options)?;
        let mut doc = Document::new(PrimaryData::Many(resources));
        doc.included = included;

        if let Some(page) = &options.page {
            doc.links = Some(page.links());
            doc.extend_meta(Map::from_iter([("page".to_string(), json!(page.meta()))]));
        }
        doc.extend_meta(options.meta.clone());
        Ok(doc)
    }

    /// Serialize related records for a parent type, de-duplicated by `type:id`.
    pub fn serialize_included(
        &self,
        parent_type: &str,
        source: IncludedSource,
        options: &SerializeOptions,
    ) -> Result<Vec<ResourceObject>, SerializeError> {
        let parent = self.metadata(parent_type)?;
        let mut collector = IncludedCollector::new(*self, options);
        match source {
            IncludedSource::Related(items) => {
                for item in &items {
                    collector.add_related(parent, &item.relation_name, &item.data)?;
                }
            }
            #[allow(deprecated)]
            IncludedSource::Bare(records) => {
                for record in &records {
                    collector.add_bare(parent, record)?;
                }
            }
        }
        Ok(collector.finish())
    }

    pub fn resource_object(
        &self,
        record: &Value,
        meta: &ResourceMetadata,
        options: &SerializeOptions,
    ) -> Result<ResourceObject, SerializeError> {
        let object = record
            .as_object()
            .ok_or_else(|| SerializeError::NotAnObject(meta.resource_type.clone()))?;
        let id = record_id(record, meta).ok_or_else(|| SerializeError::MissingId(meta.resource_type.clone()))?;

        let requested = options.fields_for(&meta.resource_type);
        let mut attributes = Map::new();
        for attr in meta.visible_attributes() {
            if let Some(fields) = requested {
                if !fields.contains(&attr.exposed_name) {
                    continue;
                }
            }
            let Some(value) = object.get(&attr.source_key) else { continue };
            let value = match attr.kind {
                AttributeKind::Timestamp => canonical_timestamp(value),
                AttributeKind::Plain => value.clone(),
            };
            attributes.insert(attr.exposed_name.clone(), value);
        }

        let mut relationships = BTreeMap::new();
        for rel in &meta.relationships {
            let Some(value) = object.get(&rel.source_key) else { continue };
            relationships.insert(rel.exposed_name.clone(), Relationship { data: self.linkage(rel, value) });
        }

        Ok(ResourceObject { resource_type: meta.resource_type.clone(), id, attributes, relationships })
    }

    pub(crate) fn metadata(&self, resource_type: &str) -> Result<&'r ResourceMetadata, SerializeError> {
        self.registry
            .get(resource_type)
            .ok_or_else(|| SerializeError::UnknownType(resource_type.to_string()))
    }

    /// Stubs only; full related objects belong in `included`
    fn linkage(&self, rel: &RelationshipMeta, value: &Value) -> RelationshipData {
        let target = self.registry.target_of(rel);
        let stub = |item: &Value| -> Option<ResourceIdentifier> {
            let id = match (item, target) {
                (Value::Object(_), Some(target)) => record_id(item, target),
                (Value::Object(_), None) => None,
                (scalar, _) => scalar_id(scalar),
            }?;
            Some(ResourceIdentifier { resource_type: rel.target_type.clone(), id })
        };

        match rel.cardinality {
            Cardinality::Many => RelationshipData::Many(match value {
                Value::Array(items) => items.iter().filter_map(stub).collect(),
                Value::Null => Vec::new(),
                single => stub(single).into_iter().collect(),
            }),
            Cardinality::One => RelationshipData::One(match value {
                Value::Null => None,
                Value::Array(items) => items.first().and_then(stub),
                single => stub(single),
            }),
        }
    }

    fn walk_included(
        &self,
        records: &[Value],
        meta: &'r ResourceMetadata,
        primary: &[ResourceObject],
        options: &SerializeOptions,
    ) -> Result<Option<Vec<ResourceObject>>, SerializeError> {
        if options.include.is_empty() {
            return Ok(None);
        }
        let mut collector = IncludedCollector::new(*self, options);
        for resource in primary {
            collector.seed(&resource.identifier());
        }
        for path in &options.include {
            collector.walk_path(records, meta, path)?;
        }
        Ok(Some(collector.finish()))
    }
}

/// String form of a record's id, `None` when missing or not a scalar
pub fn record_id(record: &Value, meta: &ResourceMetadata) -> Option<String> {
    record.get(&meta.id_key).and_then(scalar_id)
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize stored date values to `YYYY-MM-DDTHH:MM:SS.sssZ`. Numbers are
/// epoch milliseconds; unparseable values pass through untouched.
pub fn canonical_timestamp(value: &Value) -> Value {
    let parsed: Option<DateTime<Utc>> = match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                    .map(|naive| Utc.from_utc_datetime(&naive))
            })
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| Utc.from_utc_datetime(&naive))
            }),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    match parsed {
        Some(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => value.clone(),
    }
}
