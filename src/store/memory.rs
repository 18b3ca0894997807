use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{FindArgs, RecordStore, StoreError};
use crate::query::{coerce, Scalar, SortDirection};
use crate::resource::{RelationshipMeta, ResourceMetadata, ResourceRegistry};
use crate::serializer::record_id;

const OPERATOR_KEYS: &[&str] = &["equals", "not", "contains", "caseInsensitive", "gt", "gte", "lt", "lte", "in", "notIn"];

/// Fixture-backed store. Relationships are stored as ids (or arrays of
/// ids) and resolved against the registry when filtering, sorting on a
/// dotted path, or loading includes.
pub struct MemoryStore {
    registry: Arc<ResourceRegistry>,
    records: HashMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry, records: HashMap::new() }
    }

    pub fn insert(&mut self, resource_type: impl Into<String>, records: impl IntoIterator<Item = Value>) {
        self.records.entry(resource_type.into()).or_default().extend(records);
    }

    pub fn with_records(mut self, resource_type: impl Into<String>, records: impl IntoIterator<Item = Value>) -> Self {
        self.insert(resource_type, records);
        self
    }

    pub fn count(&self, resource_type: &str) -> usize {
        self.records.get(resource_type).map_or(0, Vec::len)
    }

    fn table(&self, resource_type: &str) -> Result<(&ResourceMetadata, &[Value]), StoreError> {
        let meta = self
            .registry
            .get(resource_type)
            .ok_or_else(|| StoreError::UnknownType(resource_type.to_string()))?;
        let records = self.records.get(resource_type).map_or(&[][..], Vec::as_slice);
        Ok((meta, records))
    }

    fn lookup(&self, target: &ResourceMetadata, id: &Value) -> Option<&Value> {
        let id = scalar_string(id)?;
        self.records
            .get(&target.resource_type)?
            .iter()
            .find(|record| record_id(record, target).as_deref() == Some(id.as_str()))
    }

    /// Related records behind a relationship, resolving bare ids
    fn related<'a>(&'a self, record: &'a Value, rel: &RelationshipMeta) -> Vec<(&'a ResourceMetadata, &'a Value)> {
        let (Some(target), Some(value)) = (self.registry.get(&rel.target_type), record.get(&rel.source_key)) else {
            return Vec::new();
        };
        let resolve = |item: &'a Value| match item {
            Value::Object(_) => Some(item),
            Value::Null => None,
            id => self.lookup(target, id),
        };
        let items: Vec<&'a Value> = match value {
            Value::Array(items) => items.iter().filter_map(resolve).collect(),
            single => resolve(single).into_iter().collect(),
        };
        items.into_iter().map(|item| (target, item)).collect()
    }

    fn matches(&self, record: &Value, meta: &ResourceMetadata, clause: &Value) -> bool {
        let Value::Object(fields) = clause else { return true };
        fields.iter().all(|(name, condition)| match (meta.relationship(name), condition) {
            // operator keys test the stored id; the rest match when any related record does
            (Some(rel), Value::Object(nested)) if !is_operator_object(nested) => {
                let (ops, rest): (Map<String, Value>, Map<String, Value>) = nested
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .partition(|(key, _)| OPERATOR_KEYS.contains(&key.as_str()));
                let rest = Value::Object(rest);
                (ops.is_empty() || matches_condition(record.get(&rel.source_key), &Value::Object(ops)))
                    && self
                        .related(record, rel)
                        .into_iter()
                        .any(|(target, related)| self.matches(related, target, &rest))
            }
            _ => matches_condition(record.get(source_key(meta, name)), condition),
        })
    }

    fn path_value<'a>(&'a self, record: &'a Value, meta: &'a ResourceMetadata, path: &str) -> Option<&'a Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        match (rest, meta.relationship(head)) {
            (Some(rest), Some(rel)) => {
                let (target, related) = self.related(record, rel).into_iter().next()?;
                self.path_value(related, target, rest)
            }
            (Some(rest), None) => rest
                .split('.')
                .try_fold(record.get(source_key(meta, head))?, |value, key| value.get(key)),
            (None, _) => record.get(source_key(meta, head)),
        }
    }

    fn hydrate(&self, record: &mut Value, meta: &ResourceMetadata, path: &[&str]) {
        let Some((segment, rest)) = path.split_first() else { return };
        let Some(rel) = meta.relationship(segment) else { return };
        let Some(target) = self.registry.get(&rel.target_type) else { return };
        let Some(slot) = record.get_mut(&rel.source_key) else { return };

        match slot {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.resolve_slot(item, target);
                    self.hydrate(item, target, rest);
                }
            }
            single => {
                self.resolve_slot(single, target);
                self.hydrate(single, target, rest);
            }
        }
    }

    fn resolve_slot(&self, slot: &mut Value, target: &ResourceMetadata) {
        if slot.is_object() {
            return;
        }
        if let Some(found) = self.lookup(target, slot) {
            *slot = found.clone();
        }
    }

    fn load(&self, record: &Value, meta: &ResourceMetadata, include: &[String]) -> Value {
        let mut record = record.clone();
        for path in include {
            let segments: Vec<&str> = path.split('.').collect();
            self.hydrate(&mut record, meta, &segments);
        }
        record
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_many(&self, resource_type: &str, args: &FindArgs) -> Result<(Vec<Value>, u64), StoreError> {
        let (meta, records) = self.table(resource_type)?;

        let mut matched: Vec<&Value> = records
            .iter()
            .filter(|record| self.matches(record, meta, &args.where_clause))
            .collect();

        if !args.order.is_empty() {
            matched.sort_by(|a, b| {
                args.order
                    .iter()
                    .map(|sort| {
                        let ordering = compare_nullable(
                            self.path_value(a, meta, &sort.field),
                            self.path_value(b, meta, &sort.field),
                        );
                        match sort.order {
                            SortDirection::Asc => ordering,
                            SortDirection::Desc => ordering.reverse(),
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = matched.len() as u64;
        let take = if args.take == 0 { usize::MAX } else { args.take as usize };
        let page = matched
            .into_iter()
            .skip(args.skip as usize)
            .take(take)
            .map(|record| self.load(record, meta, &args.include))
            .collect::<Vec<_>>();

        tracing::debug!(resource_type, total, returned = page.len(), "memory store find_many");
        Ok((page, total))
    }

    async fn find_one(&self, resource_type: &str, id: &str, include: &[String]) -> Result<Option<Value>, StoreError> {
        let (meta, records) = self.table(resource_type)?;
        Ok(records
            .iter()
            .find(|record| record_id(record, meta).as_deref() == Some(id))
            .map(|record| self.load(record, meta, include)))
    }
}

fn source_key<'a>(meta: &'a ResourceMetadata, name: &'a str) -> &'a str {
    meta.attributes
        .iter()
        .find(|attr| attr.exposed_name == name)
        .map(|attr| attr.source_key.as_str())
        .or_else(|| meta.relationship(name).map(|rel| rel.source_key.as_str()))
        .unwrap_or(name)
}

fn is_operator_object(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|key| OPERATOR_KEYS.contains(&key.as_str()))
}

fn matches_condition(value: Option<&Value>, condition: &Value) -> bool {
    match condition {
        Value::Null => is_null(value),
        Value::Object(ops) if is_operator_object(ops) => ops.iter().all(|(op, operand)| apply_operator(value, op, operand, ops)),
        // plain nested JSON attribute
        Value::Object(nested) => match value {
            Some(Value::Object(inner)) => nested.iter().all(|(key, cond)| matches_condition(inner.get(key), cond)),
            _ => false,
        },
        expected => value.is_some_and(|v| loose_eq(v, expected)),
    }
}

fn apply_operator(value: Option<&Value>, op: &str, operand: &Value, ops: &Map<String, Value>) -> bool {
    match op {
        "equals" => value.is_some_and(|v| loose_eq(v, operand)),
        "not" if operand.is_null() => !is_null(value),
        "not" => !value.is_some_and(|v| loose_eq(v, operand)),
        "contains" => {
            let (Some(Value::String(haystack)), Some(needle)) = (value, scalar_string(operand)) else {
                return false;
            };
            let needle = needle.trim_matches('%');
            if ops.get("caseInsensitive") == Some(&Value::Bool(true)) {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            } else {
                haystack.contains(needle)
            }
        }
        "caseInsensitive" => true,
        "gt" => compare_present(value, operand).is_some_and(Ordering::is_gt),
        "gte" => compare_present(value, operand).is_some_and(Ordering::is_ge),
        "lt" => compare_present(value, operand).is_some_and(Ordering::is_lt),
        "lte" => compare_present(value, operand).is_some_and(Ordering::is_le),
        "in" => value.is_some_and(|v| as_items(operand).iter().any(|item| loose_eq(v, item))),
        "notIn" => !value.is_some_and(|v| as_items(operand).iter().any(|item| loose_eq(v, item))),
        _ => false,
    }
}

fn as_items(operand: &Value) -> &[Value] {
    match operand {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

fn is_null(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn instant(raw: &str) -> Option<DateTime<Utc>> {
    match coerce(raw) {
        Scalar::Date(dt) => Some(dt),
        _ => None,
    }
}

/// Equality across the shapes query tokens coerce into
fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => {
            a == b || matches!((instant(a), instant(b)), (Some(x), Some(y)) if x == y)
        }
        (Value::Bool(a), Value::String(b)) => b == if *a { "true" } else { "false" },
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => n.to_string() == *s,
        _ => actual == expected,
    }
}

fn compare_present(value: Option<&Value>, operand: &Value) -> Option<Ordering> {
    compare(value?, operand)
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (instant(x), instant(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Nulls and missing values sort first
fn compare_nullable(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (is_null(a), is_null(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => match (a, b) {
            (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryParser, SortField};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> MemoryStore {
        let registry = ResourceRegistry::builder()
            .register(
                ResourceMetadata::builder("articles")
                    .attribute("title")
                    .attribute("status")
                    .attribute("views")
                    .timestamp("published_at")
                    .to_one("author", "people")
                    .to_many("comments", "comments")
                    .build(),
            )
            .register(ResourceMetadata::builder("people").attribute("name").to_many("articles", "articles").build())
            .register(ResourceMetadata::builder("comments").attribute("body").build())
            .build()
            .unwrap();

        MemoryStore::new(Arc::new(registry))
            .with_records(
                "articles",
                vec![
                    json!({ "id": 1, "title": "Rust Ownership", "status": "published", "views": 120, "published_at": "2024-01-10T09:00:00Z", "author": 1, "comments": ["c1", "c2"] }),
                    json!({ "id": 2, "title": "Async in practice", "status": "draft", "views": 5, "published_at": null, "author": 2, "comments": [] }),
                    json!({ "id": 3, "title": "Borrowing rules", "status": "published", "views": 40, "published_at": "2024-03-02T12:30:00Z", "author": 1, "comments": ["c3"] }),
                ],
            )
            .with_records(
                "people",
                vec![
                    json!({ "id": 1, "name": "Ann", "articles": [1, 3] }),
                    json!({ "id": 2, "name": "Bob", "articles": [2] }),
                ],
            )
            .with_records(
                "comments",
                vec![
                    json!({ "id": "c1", "body": "great" }),
                    json!({ "id": "c2", "body": "thanks" }),
                    json!({ "id": "c3", "body": "nice" }),
                ],
            )
    }

    async fn ids(store: &MemoryStore, query: &str) -> Vec<Value> {
        let parsed = QueryParser::default().parse_str(query).unwrap();
        let (records, _) = store.find_many("articles", &FindArgs::from_query(&parsed)).await.unwrap();
        records.into_iter().map(|r| r["id"].clone()).collect()
    }

    #[tokio::test]
    async fn filters_follow_translated_operators() {
        let store = store();
        assert_eq!(ids(&store, "filter[status]=published").await, vec![json!(1), json!(3)]);
        assert_eq!(ids(&store, "filter[status][ne]=published").await, vec![json!(2)]);
        assert_eq!(ids(&store, "filter[views][between]=10,200").await, vec![json!(1), json!(3)]);
        assert_eq!(ids(&store, "filter[views][gte]=40&filter[views][lt]=100").await, vec![json!(3)]);
        assert_eq!(ids(&store, "filter[title][ilike]=rust").await, vec![json!(1)]);
        assert_eq!(ids(&store, "filter[title][like]=rust").await, Vec::<Value>::new());
        assert_eq!(ids(&store, "filter[id][in]=1,2").await, vec![json!(1), json!(2)]);
        assert_eq!(ids(&store, "filter[id][nin]=1,2").await, vec![json!(3)]);
        assert_eq!(ids(&store, "filter[published_at][null]=true").await, vec![json!(2)]);
        assert_eq!(ids(&store, "filter[published_at][gt]=2024-02-01").await, vec![json!(3)]);
    }

    #[tokio::test]
    async fn nested_relationship_filters_resolve_ids() {
        let store = store();
        assert_eq!(ids(&store, "filter[author.name]=Bob").await, vec![json!(2)]);
        assert_eq!(ids(&store, "filter[comments.body][ilike]=NIC").await, vec![json!(3)]);
    }

    #[tokio::test]
    async fn relationship_id_and_nested_filters_combine() {
        let store = store();
        assert_eq!(ids(&store, "filter[author]=1").await, vec![json!(1), json!(3)]);
        assert_eq!(ids(&store, "filter[author]=1&filter[author.name]=Ann").await, vec![json!(1), json!(3)]);
        assert_eq!(ids(&store, "filter[author.name]=Ann&filter[author][ne]=3").await, vec![json!(1), json!(3)]);
        assert_eq!(ids(&store, "filter[author]=2&filter[author.name]=Ann").await, Vec::<Value>::new());
    }

    #[tokio::test]
    async fn sorting_paging_and_totals() {
        let store = store();
        assert_eq!(ids(&store, "sort=-views").await, vec![json!(1), json!(3), json!(2)]);
        assert_eq!(ids(&store, "sort=author.name,-id").await, vec![json!(3), json!(1), json!(2)]);

        let args = FindArgs {
            where_clause: json!({}),
            order: vec![SortField { field: "id".into(), order: SortDirection::Asc }],
            skip: 1,
            take: 1,
            include: vec![],
        };
        let (records, total) = store.find_many("articles", &args).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], json!(2));
    }

    #[tokio::test]
    async fn includes_are_loaded_in_place() {
        let store = store();
        let include = vec!["author.articles".to_string(), "comments".to_string()];
        let record = store.find_one("articles", "1", &include).await.unwrap().unwrap();
        assert_eq!(record["author"]["name"], json!("Ann"));
        assert_eq!(record["author"]["articles"][1]["title"], json!("Borrowing rules"));
        // one level deeper stays as ids
        assert_eq!(record["author"]["articles"][1]["author"], json!(1));
        assert_eq!(record["comments"][0]["body"], json!("great"));

        assert!(store.find_one("articles", "99", &[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_type_is_an_error() {
        let err = store().find_many("widgets", &FindArgs::default()).await.unwrap_err();
        assert_eq!(err, StoreError::UnknownType("widgets".into()));
    }
}
