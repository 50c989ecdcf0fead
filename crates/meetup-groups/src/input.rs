//! Normalize raw backing-store JSON into [`UserRecord`]s.
//!
//! The store has served several shapes over time. Precedence, first match wins:
//!
//! 1. a non-empty `traits` object of `name -> weight`
//! 2. a non-empty `topTraits` object of `name -> weight`
//! 3. a non-empty `topTraits` array of names, each weighted 1.0
//! 4. no traits
//!
//! Ids come from `userId`, falling back to `id`. Coordinates come from
//! `latitude`/`longitude`, falling back to `lat`/`lon`; `null` means absent.
//! Weights and coordinates must be JSON numbers; nothing is coerced.

use crate::error::{GroupingError, Result};
use crate::types::{UserId, UserRecord};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Weight given to every name in list-form `topTraits`.
pub const LIST_TRAIT_WEIGHT: f64 = 1.0;

/// Parse an ordered list of raw records, preserving order.
pub fn parse_records(raw: &[Value]) -> Result<Vec<UserRecord>> {
    raw.iter()
        .enumerate()
        .map(|(index, value)| parse_record(index, value))
        .collect()
}

/// Parse a JSON document that must be an array of records.
pub fn parse_document(doc: &Value) -> Result<Vec<UserRecord>> {
    match doc {
        Value::Array(items) => parse_records(items),
        other => Err(GroupingError::MalformedRecord {
            index: 0,
            kind: kind_of(other),
        }),
    }
}

/// Parse one raw record. `index` is only used in diagnostics.
pub fn parse_record(index: usize, value: &Value) -> Result<UserRecord> {
    let obj = value.as_object().ok_or(GroupingError::MalformedRecord {
        index,
        kind: kind_of(value),
    })?;

    let id = user_id(obj).ok_or(GroupingError::MissingUserId { index })?;
    let traits = extract_traits(id, obj)?;
    let lat = coordinate(id, obj, "latitude", "lat")?;
    let lon = coordinate(id, obj, "longitude", "lon")?;

    Ok(UserRecord {
        id,
        traits,
        lat,
        lon,
    })
}

fn user_id(obj: &Map<String, Value>) -> Option<UserId> {
    obj.get("userId")
        .filter(|v| !v.is_null())
        .or_else(|| obj.get("id"))
        .and_then(Value::as_i64)
}

fn extract_traits(id: UserId, obj: &Map<String, Value>) -> Result<BTreeMap<String, f64>> {
    if let Some(Value::Object(map)) = obj.get("traits") {
        if !map.is_empty() {
            return weighted_map(id, map);
        }
    }

    match obj.get("topTraits") {
        Some(Value::Object(map)) if !map.is_empty() => weighted_map(id, map),
        Some(Value::Array(names)) if !names.is_empty() => names
            .iter()
            .map(|name| match name {
                Value::String(s) => Ok((s.clone(), LIST_TRAIT_WEIGHT)),
                other => Err(GroupingError::InvalidTraitName {
                    user_id: id,
                    found: other.to_string(),
                }),
            })
            .collect(),
        _ => Ok(BTreeMap::new()),
    }
}

fn weighted_map(id: UserId, map: &Map<String, Value>) -> Result<BTreeMap<String, f64>> {
    map.iter()
        .map(|(name, value)| {
            let weight = value
                .as_f64()
                .ok_or_else(|| GroupingError::NonNumericWeight {
                    user_id: id,
                    name: name.clone(),
                    found: value.to_string(),
                })?;
            Ok((name.clone(), weight))
        })
        .collect()
}

fn coordinate(
    id: UserId,
    obj: &Map<String, Value>,
    field: &'static str,
    short: &str,
) -> Result<Option<f64>> {
    let value = match obj.get(field) {
        Some(v) if !v.is_null() => v,
        _ => match obj.get(short) {
            Some(v) if !v.is_null() => v,
            _ => return Ok(None),
        },
    };
    value
        .as_f64()
        .map(Some)
        .ok_or_else(|| GroupingError::InvalidCoordinate {
            user_id: id,
            field,
            found: value.to_string(),
        })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
