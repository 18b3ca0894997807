use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    #[default]
    Plain,
    /// Rendered as a canonical UTC timestamp string
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeMeta {
    pub source_key: String,
    pub exposed_name: String,
    pub excluded: bool,
    pub kind: AttributeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipMeta {
    pub source_key: String,
    pub exposed_name: String,
    /// Registered type name of the related resource, resolved by the registry
    pub target_type: String,
    pub cardinality: Cardinality,
}

/// Attribute and relationship layout of one resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id_key: String,
    pub attributes: Vec<AttributeMeta>,
    pub relationships: Vec<RelationshipMeta>,
}

impl ResourceMetadata {
    pub fn builder(resource_type: impl Into<String>) -> ResourceMetadataBuilder {
        ResourceMetadataBuilder {
            meta: ResourceMetadata {
                resource_type: resource_type.into(),
                id_key: "id".to_string(),
                attributes: Vec::new(),
                relationships: Vec::new(),
            },
        }
    }

    pub fn relationship(&self, exposed_name: &str) -> Option<&RelationshipMeta> {
        self.relationships.iter().find(|r| r.exposed_name == exposed_name)
    }

    /// Exposed, non-excluded attribute names
    pub fn visible_attributes(&self) -> impl Iterator<Item = &AttributeMeta> {
        self.attributes.iter().filter(|a| !a.excluded)
    }
}

/// Fluent construction of `ResourceMetadata`
#[derive(Debug, Clone)]
pub struct ResourceMetadataBuilder {
    meta: ResourceMetadata,
}

impl ResourceMetadataBuilder {
    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.meta.id_key = key.into();
        self
    }

    pub fn attribute(self, name: &str) -> Self {
        self.attribute_as(name, name, AttributeKind::Plain)
    }

    pub fn timestamp(self, name: &str) -> Self {
        self.attribute_as(name, name, AttributeKind::Timestamp)
    }

    pub fn attribute_as(mut self, source_key: &str, exposed_name: &str, kind: AttributeKind) -> Self {
        self.meta.attributes.push(AttributeMeta {
            source_key: source_key.to_string(),
            exposed_name: exposed_name.to_string(),
            excluded: false,
            kind,
        });
        self
    }

    /// Present on the record but never serialized
    pub fn excluded(mut self, name: &str) -> Self {
        self.meta.attributes.push(AttributeMeta {
            source_key: name.to_string(),
            exposed_name: name.to_string(),
            excluded: true,
            kind: AttributeKind::Plain,
        });
        self
    }

    pub fn to_one(self, name: &str, target_type: &str) -> Self {
        self.relationship_as(name, name, target_type, Cardinality::One)
    }

    pub fn to_many(self, name: &str, target_type: &str) -> Self {
        self.relationship_as(name, name, target_type, Cardinality::Many)
    }

    pub fn relationship_as(
        mut self,
        source_key: &str,
        exposed_name: &str,
        target_type: &str,
        cardinality: Cardinality,
    ) -> Self {
        self.meta.relationships.push(RelationshipMeta {
            source_key: source_key.to_string(),
            exposed_name: exposed_name.to_string(),
            target_type: target_type.to_string(),
            cardinality,
        });
        self
    }

    pub fn build(self) -> ResourceMetadata {
        self.meta
    }
}

/// Declarative descriptor as written in YAML/JSON resource files
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub id_key: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDescriptor>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
    /// Record key when it differs from the exposed name
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub kind: AttributeKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipDescriptor {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    pub target: String,
    pub cardinality: Cardinality,
}

impl From<ResourceDescriptor> for ResourceMetadata {
    fn from(desc: ResourceDescriptor) -> Self {
        let mut builder = ResourceMetadata::builder(desc.resource_type);
        if let Some(id_key) = desc.id_key {
            builder = builder.id_key(id_key);
        }
        for attr in desc.attributes {
            let source = attr.source.unwrap_or_else(|| attr.name.clone());
            builder = if attr.excluded {
                builder.excluded(&source)
            } else {
                builder.attribute_as(&source, &attr.name, attr.kind)
            };
        }
        for rel in desc.relationships {
            let source = rel.source.unwrap_or_else(|| rel.name.clone());
            builder = builder.relationship_as(&source, &rel.name, &rel.target, rel.cardinality);
        }
        builder.build()
    }
}
