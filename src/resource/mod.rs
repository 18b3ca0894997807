pub mod metadata;
pub mod registry;
pub mod rules;

pub use metadata::{
    AttributeKind, AttributeMeta, Cardinality, RelationshipMeta, ResourceDescriptor, ResourceMetadata,
    ResourceMetadataBuilder,
};
pub use registry::{RegistryError, ResourceRegistry, ResourceRegistryBuilder};
pub use rules::{FieldRule, RuleSource, StaticRules};
