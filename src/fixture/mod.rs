// Fixture loading: one YAML file describing resources, per-type query
// whitelists, validation rules and seed records.
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::query::WhitelistOptions;
use crate::resource::{FieldRule, RegistryError, ResourceDescriptor, ResourceMetadata, ResourceRegistry, StaticRules};
use crate::store::MemoryStore;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Fixture section '{section}' names unregistered type '{resource_type}'")]
    UnknownType { section: &'static str, resource_type: String },
}

/// On-disk layout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureFile {
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
    #[serde(default)]
    pub whitelists: HashMap<String, WhitelistOptions>,
    #[serde(default)]
    pub rules: HashMap<String, Vec<FieldRule>>,
    #[serde(default)]
    pub records: HashMap<String, Vec<Value>>,
}

/// Everything the server needs, built from a fixture file
pub struct Fixture {
    pub registry: Arc<ResourceRegistry>,
    pub whitelists: HashMap<String, WhitelistOptions>,
    pub store: MemoryStore,
}

impl Fixture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let fixture = Self::from_yaml(&raw)?;
        tracing::info!(
            path = %path.display(),
            types = fixture.registry.types().len(),
            "Loaded fixture"
        );
        Ok(fixture)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, FixtureError> {
        Self::from_file(serde_yaml::from_str(raw)?)
    }

    pub fn from_file(file: FixtureFile) -> Result<Self, FixtureError> {
        let mut builder = ResourceRegistry::builder()
            .register_all(file.resources.into_iter().map(ResourceMetadata::from));
        if !file.rules.is_empty() {
            builder = builder.rules(Arc::new(StaticRules::new(file.rules.clone())));
        }
        let registry = Arc::new(builder.build()?);

        check_types(&registry, "whitelists", file.whitelists.keys())?;
        check_types(&registry, "rules", file.rules.keys())?;
        check_types(&registry, "records", file.records.keys())?;

        let mut store = MemoryStore::new(registry.clone());
        for (resource_type, records) in file.records {
            store.insert(resource_type, records);
        }

        Ok(Self { registry, whitelists: file.whitelists, store })
    }
}

fn check_types<'a>(
    registry: &ResourceRegistry,
    section: &'static str,
    mut names: impl Iterator<Item = &'a String>,
) -> Result<(), FixtureError> {
    match names.find(|name| !registry.contains(name)) {
        Some(name) => Err(FixtureError::UnknownType { section, resource_type: name.clone() }),
        None => Ok(()),
    }
}
