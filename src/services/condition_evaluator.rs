//! Condition evaluation over semi-structured entity data.
//!
//! Pure functions: no I/O, no clock. A definition's conditions are
//! AND-combined and an empty list is always true. Comparisons are
//! string-coerced so `5` and `"5"` are equal; unknown operators fail closed.

use serde_json::{Map, Value};

use crate::domain::models::automation::{Condition, ConditionOperator};

/// Path segments that short-circuit resolution to "value absent". Entity
/// snapshots come from stores the user partially controls; these names must
/// never resolve.
const BLOCKED_SEGMENTS: &[&str] = &["__proto__", "constructor", "prototype"];

/// Evaluate every condition against the data; all must hold.
pub fn evaluate_all(conditions: &[Condition], data: &Map<String, Value>) -> bool {
    conditions.iter().all(|c| evaluate(c, data))
}

/// Evaluate a single condition against the data.
pub fn evaluate(condition: &Condition, data: &Map<String, Value>) -> bool {
    let field = resolve_path(data, &condition.field);
    let expected = &condition.value;

    match condition.operator {
        ConditionOperator::Equals => scalar_eq(field, expected),
        ConditionOperator::NotEquals => !scalar_eq(field, expected),
        ConditionOperator::Contains => contains(field, expected),
        ConditionOperator::NotContains => !contains(field, expected),
        ConditionOperator::GreaterThan => compare(field, expected, |a, b| a > b),
        ConditionOperator::LessThan => compare(field, expected, |a, b| a < b),
        ConditionOperator::IsEmpty => is_empty(field),
        ConditionOperator::IsNotEmpty => !is_empty(field),
        ConditionOperator::In => in_list(field, expected),
        ConditionOperator::NotIn => !in_list(field, expected),
        ConditionOperator::Unknown => false,
    }
}

/// Walk a dot-separated path through the data. Any blocked segment or
/// missing step yields None.
pub fn resolve_path<'a>(data: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    if BLOCKED_SEGMENTS.contains(&first) {
        return None;
    }
    let mut current = data.get(first)?;
    for segment in segments {
        if BLOCKED_SEGMENTS.contains(&segment) {
            return None;
        }
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Scalar string coercion: null and non-scalars have no coerced form.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_eq(field: Option<&Value>, expected: &Value) -> bool {
    match (field.and_then(coerce_string), coerce_string(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn contains(field: Option<&Value>, needle: &Value) -> bool {
    match field {
        Some(Value::String(haystack)) => match needle {
            Value::String(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
            _ => false,
        },
        Some(Value::Array(items)) => items.iter().any(|item| {
            match (coerce_string(item), coerce_string(needle)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }),
        _ => false,
    }
}

fn compare(field: Option<&Value>, expected: &Value, op: fn(f64, f64) -> bool) -> bool {
    match (field.and_then(coerce_number), coerce_number(expected)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

fn is_empty(field: Option<&Value>) -> bool {
    match field {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

fn in_list(field: Option<&Value>, list: &Value) -> bool {
    let (Some(field), Value::Array(items)) = (field, list) else {
        return false;
    };
    items.iter().any(|item| {
        match (coerce_string(item), coerce_string(field)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    })
}
