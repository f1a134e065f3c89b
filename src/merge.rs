//! Deep merge of desired fields into an existing entity
//!
//! Updates are built by merging the desired document into the entity the
//! remote store currently holds, so fields the desired document does not
//! mention survive the round-trip.
//!
//! ## Rules
//!
//! - Objects: recursively merge keys, desired values win on conflict
//! - `null` in the desired document is kept as an explicit `null`
//! - Arrays: replaced wholesale, never appended
//! - Scalars and type conflicts: the desired value replaces the current one

use serde_json::{Map, Value as JsonValue};

use crate::entity::Entity;

/// Recursively merge `source` into `target` in place.
pub fn merge_values(target: &mut JsonValue, source: &JsonValue) {
    match (target, source) {
        (JsonValue::Object(target_map), JsonValue::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value);
                    }
                    Some(existing) => *existing = value.clone(),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Merge a desired entity over the current one, returning the combined
/// entity. Neither input is modified.
pub fn merge_entities(current: &Entity, desired: &Entity) -> Entity {
    let mut merged = current.to_value();
    merge_values(&mut merged, &desired.to_value());
    match merged {
        JsonValue::Object(fields) => Entity::new(fields),
        _ => Entity::new(Map::new()),
    }
}
