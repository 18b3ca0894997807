pub mod document;
pub mod included;
pub mod pagination;
#[allow(clippy::module_inception)]
pub mod serializer;

pub use document::{
    Document, ErrorDocument, ErrorObject, ErrorSource, JsonApiObject, PrimaryData, Relationship, RelationshipData,
    ResourceIdentifier, ResourceObject, JSONAPI_MEDIA_TYPE, JSONAPI_VERSION,
};
pub use included::{IncludedCollector, IncludedResource, IncludedSource};
pub use pagination::{build_links, PageContext, PageMeta, PaginationLinks};
pub use serializer::{canonical_timestamp, record_id, ResourceSerializer, SerializeError, SerializeOptions};
