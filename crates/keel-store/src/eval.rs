//! Filter matching and update application against stored documents.

use std::cmp::Ordering;

use serde_json::Value;

use keel_core::constants::{codes, ID_FIELD};
use keel_core::{Condition, DriverError, DriverResult, Document, Filter, Update, UpdateOp};

/// Whether `doc` satisfies every part of `filter`.
pub fn matches(filter: &Filter, doc: &Document) -> bool {
    if let Some(id) = &filter.id {
        if doc.id() != Some(id) {
            return false;
        }
    }
    filter.conditions.iter().all(|c| condition_holds(c, doc))
}

fn condition_holds(condition: &Condition, doc: &Document) -> bool {
    match condition {
        Condition::Eq { field, value } => field_value(doc, field)
            .map(|v| values_equal(&v, value))
            .unwrap_or(false),
        Condition::Ne { field, value } => field_value(doc, field)
            .map(|v| !values_equal(&v, value))
            .unwrap_or(true),
        Condition::NotContains { field, value } => match field_value(doc, field) {
            Some(Value::Array(items)) => !items.iter().any(|item| values_equal(item, value)),
            Some(other) => !values_equal(&other, value),
            None => true,
        },
        Condition::Gte { field, value } => field_value(doc, field)
            .and_then(|v| compare(&v, value))
            .map(|ord| ord != Ordering::Less)
            .unwrap_or(false),
    }
}

fn field_value(doc: &Document, field: &str) -> Option<Value> {
    if field == ID_FIELD {
        return doc.id().map(|id| Value::String(id.to_string()));
    }
    doc.get(field).cloned()
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Apply `update` to `doc` in place. On error `doc` may be partially
/// modified, so callers apply to a scratch copy.
pub fn apply(update: &Update, doc: &mut Document) -> DriverResult<()> {
    for op in &update.ops {
        match op {
            UpdateOp::Inc { field, by } => {
                guard_id(field)?;
                let current = match doc.get(field) {
                    None => 0,
                    Some(v) => v.as_i64().ok_or_else(|| {
                        DriverError::new(
                            codes::TYPE_MISMATCH,
                            format!("cannot increment non-integer field '{field}'"),
                        )
                    })?,
                };
                let next = current.checked_add(*by).ok_or_else(|| {
                    DriverError::new(codes::BAD_VALUE, format!("integer overflow on '{field}'"))
                })?;
                doc.set(field.clone(), next);
            }
            UpdateOp::Set { field, value } => {
                guard_id(field)?;
                doc.set(field.clone(), value.clone());
            }
            UpdateOp::PushCapped { field, value, cap } => {
                guard_id(field)?;
                if *cap == 0 {
                    return Err(DriverError::new(
                        codes::BAD_VALUE,
                        format!("push cap for '{field}' must be positive"),
                    ));
                }
                let mut items = match doc.get(field) {
                    None => Vec::new(),
                    Some(Value::Array(items)) => items.clone(),
                    Some(_) => {
                        return Err(DriverError::new(
                            codes::TYPE_MISMATCH,
                            format!("cannot push to non-array field '{field}'"),
                        ))
                    }
                };
                items.push(value.clone());
                if items.len() > *cap {
                    let excess = items.len() - cap;
                    items.drain(..excess);
                }
                doc.set(field.clone(), Value::Array(items));
            }
        }
    }
    Ok(())
}

fn guard_id(field: &str) -> DriverResult<()> {
    if field == ID_FIELD {
        return Err(DriverError::new(
            codes::BAD_VALUE,
            "the document id is immutable",
        ));
    }
    Ok(())
}
