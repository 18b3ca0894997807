use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::pagination::PaginationLinks;

pub const JSONAPI_VERSION: &str = "1.1";
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonApiObject {
    pub version: &'static str,
}

impl Default for JsonApiObject {
    fn default() -> Self {
        Self { version: JSONAPI_VERSION }
    }
}

/// `{type, id}` linkage used inside relationships
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    /// Composite `type:id` key used for de-duplication
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource_type, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelationshipData {
    One(Option<ResourceIdentifier>),
    Many(Vec<ResourceIdentifier>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub data: RelationshipData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub attributes: Map<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

impl ResourceObject {
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier { resource_type: self.resource_type.clone(), id: self.id.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Single(Option<ResourceObject>),
    Many(Vec<ResourceObject>),
}

/// Top-level JSON:API success document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub jsonapi: JsonApiObject,
    pub data: PrimaryData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<ResourceObject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PaginationLinks>,
}

impl Document {
    pub fn null() -> Self {
        Self::new(PrimaryData::Single(None))
    }

    pub fn new(data: PrimaryData) -> Self {
        Self { jsonapi: JsonApiObject::default(), data, included: None, meta: None, links: None }
    }

    /// Merge entries into top-level `meta`
    pub fn extend_meta(&mut self, entries: Map<String, Value>) {
        if entries.is_empty() {
            return;
        }
        self.meta.get_or_insert_with(Map::new).extend(entries);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSource {
    pub parameter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    pub status: String,
    pub code: String,
    pub title: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

/// Top-level JSON:API error document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDocument {
    pub jsonapi: JsonApiObject,
    pub errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    pub fn new(errors: Vec<ErrorObject>) -> Self {
        Self { jsonapi: JsonApiObject::default(), errors }
    }
}
