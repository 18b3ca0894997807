use serde_json::{json, Map, Value};

use super::types::{FilterCondition, FilterValue, OperatorKind};

/// Build the generic nested-condition object handed to the record store.
///
/// Dotted fields nest (`author.name` → `{author: {name: ...}}`) and several
/// operators on the same field merge into one condition object.
pub fn translate(conditions: &[FilterCondition]) -> Value {
    let mut root = Map::new();
    for condition in conditions {
        let path: Vec<&str> = condition.field.split('.').collect();
        insert_path(&mut root, &path, translate_condition(condition));
    }
    Value::Object(root)
}

pub fn translate_condition(condition: &FilterCondition) -> Value {
    let value = condition.value.to_json();
    match condition.operator {
        OperatorKind::Eq => value,
        OperatorKind::Ne => json!({ "not": value }),
        OperatorKind::Like => json!({ "contains": value }),
        OperatorKind::Ilike => json!({ "contains": value, "caseInsensitive": true }),
        OperatorKind::Gt => json!({ "gt": value }),
        OperatorKind::Gte => json!({ "gte": value }),
        OperatorKind::Lt => json!({ "lt": value }),
        OperatorKind::Lte => json!({ "lte": value }),
        OperatorKind::In => json!({ "in": as_list(value) }),
        OperatorKind::Nin => json!({ "notIn": as_list(value) }),
        OperatorKind::Null => match condition.value {
            FilterValue::Flag(false) => json!({ "not": Value::Null }),
            _ => Value::Null,
        },
        OperatorKind::Between => match value {
            Value::Array(mut bounds) if bounds.len() == 2 => {
                let max = bounds.pop().unwrap_or(Value::Null);
                let min = bounds.pop().unwrap_or(Value::Null);
                json!({ "gte": min, "lte": max })
            }
            other => json!({ "gte": other }),
        },
    }
}

fn as_list(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        other => Value::Array(vec![other]),
    }
}

fn insert_path(target: &mut Map<String, Value>, path: &[&str], condition: Value) {
    let Some((head, rest)) = path.split_first() else { return };

    if rest.is_empty() {
        let merged = match target.remove(*head) {
            Some(existing) => merge(existing, condition),
            None => condition,
        };
        target.insert(head.to_string(), merged);
        return;
    }

    let slot = target
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        let scalar = slot.take();
        *slot = json!({ "equals": scalar });
    }
    if let Value::Object(nested) = slot {
        insert_path(nested, rest, condition);
    }
}

/// Later operators add keys to an existing condition; bare values are
/// promoted to `{equals: value}` so neither side is lost.
fn merge(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                let merged = match left.remove(&key) {
                    Some(previous @ Value::Object(_)) if value.is_object() => merge(previous, value),
                    _ => value,
                };
                left.insert(key, merged);
            }
            Value::Object(left)
        }
        (Value::Object(mut left), scalar) => {
            left.insert("equals".to_string(), scalar);
            Value::Object(left)
        }
        (scalar, Value::Object(right)) => {
            let mut left = Map::new();
            left.insert("equals".to_string(), scalar);
            merge(Value::Object(left), Value::Object(right))
        }
        (_, scalar) => scalar,
    }
}
