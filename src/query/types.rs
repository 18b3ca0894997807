use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};

/// The closed set of filter operators accepted on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    Eq,
    Ne,
    Like,
    Ilike,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Null,
    Between,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 12] = [
        OperatorKind::Eq,
        OperatorKind::Ne,
        OperatorKind::Like,
        OperatorKind::Ilike,
        OperatorKind::Gt,
        OperatorKind::Gte,
        OperatorKind::Lt,
        OperatorKind::Lte,
        OperatorKind::In,
        OperatorKind::Nin,
        OperatorKind::Null,
        OperatorKind::Between,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "eq",
            OperatorKind::Ne => "ne",
            OperatorKind::Like => "like",
            OperatorKind::Ilike => "ilike",
            OperatorKind::Gt => "gt",
            OperatorKind::Gte => "gte",
            OperatorKind::Lt => "lt",
            OperatorKind::Lte => "lte",
            OperatorKind::In => "in",
            OperatorKind::Nin => "nin",
            OperatorKind::Null => "null",
            OperatorKind::Between => "between",
        }
    }

    /// Exact, case-sensitive lookup. Anything else is not an operator.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == token)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single coerced query-string token
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Number(Number),
    Date(DateTime<Utc>),
    String(String),
}

impl Scalar {
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::Date(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Operand of a filter condition after operator-specific parsing
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Flag(bool),
}

impl FilterValue {
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Scalar(s) => s.to_json(),
            FilterValue::List(items) => Value::Array(items.iter().map(Scalar::to_json).collect()),
            FilterValue::Flag(b) => Value::Bool(*b),
        }
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: OperatorKind,
    pub value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    pub field: String,
    pub order: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageParams {
    pub offset: u64,
    pub limit: u64,
}

/// Externally supplied page sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self { default_limit: 20, max_limit: 100 }
    }
}

/// Typed view of the five JSON:API query namespaces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub filter: Vec<FilterCondition>,
    pub sort: Vec<SortField>,
    pub page: PageParams,
    pub include: Vec<String>,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ParsedQuery {
    /// Requested sparse fieldset for a type; `None` when unrestricted.
    pub fn fields_for(&self, resource_type: &str) -> Option<&[String]> {
        self.fields
            .get(resource_type)
            .filter(|list| !list.is_empty())
            .map(Vec::as_slice)
    }
}
