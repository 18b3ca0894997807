pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::query::{translate, ParsedQuery, SortField};

pub use memory::MemoryStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Resource type '{0}' has no backing collection")]
    UnknownType(String),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store query failed: {0}")]
    Query(String),
}

/// Everything a store needs to answer a collection request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FindArgs {
    /// Nested condition object produced by the predicate translator
    pub where_clause: Value,
    pub order: Vec<SortField>,
    pub skip: u64,
    /// Zero means unbounded
    pub take: u64,
    /// Dotted relationship paths to load alongside each record
    pub include: Vec<String>,
}

impl FindArgs {
    pub fn from_query(parsed: &ParsedQuery) -> Self {
        Self {
            where_clause: translate(&parsed.filter),
            order: parsed.sort.clone(),
            skip: parsed.page.offset,
            take: parsed.page.limit,
            include: parsed.include.clone(),
        }
    }
}

/// Read side of whatever holds the records. Related records named by
/// `include` are returned nested inside their parent under the
/// relationship's source key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Matching page of records plus the total match count before paging
    async fn find_many(&self, resource_type: &str, args: &FindArgs) -> Result<(Vec<Value>, u64), StoreError>;

    async fn find_one(&self, resource_type: &str, id: &str, include: &[String]) -> Result<Option<Value>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryParser;
    use serde_json::json;

    #[test]
    fn find_args_carry_translated_query() {
        let parsed = QueryParser::default()
            .parse_str("filter[age][gte]=18&filter[age][lt]=65&sort=-age&page[offset]=10&page[limit]=5&include=author")
            .unwrap();
        let args = FindArgs::from_query(&parsed);
        assert_eq!(args.where_clause, json!({ "age": { "gte": 18, "lt": 65 } }));
        assert_eq!(args.skip, 10);
        assert_eq!(args.take, 5);
        assert_eq!(args.order.len(), 1);
        assert_eq!(args.include, vec!["author"]);
    }
}
