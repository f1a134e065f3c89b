//! Canonical form for comparing remote entities
//!
//! Two entities are considered equal when their canonical forms are equal.
//! Canonicalization:
//!
//! - drops server-managed keys (ids, path, fingerprint, display URL, scope
//!   ids) at every depth,
//! - orders mapping keys lexicographically,
//! - sorts sequences whose elements are all mappings, since the remote API
//!   and configuration authors list parameter maps in arbitrary order,
//! - leaves scalar-only and mixed sequences in their original order.
//!
//! No type coercion happens: `1` and `"1"` stay different values.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::entity::{Entity, EntityKind};

/// Keys starting with this prefix are author annotations, never sent or
/// compared.
pub const PRIVATE_KEY_PREFIX: &str = "__";

/// The set of mapping keys removed during canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropFields {
    names: BTreeSet<String>,
    private_keys: bool,
}

impl DropFields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            private_keys: false,
        }
    }

    /// Nothing is dropped.
    pub fn none() -> Self {
        Self::default()
    }

    /// Also drop keys starting with [`PRIVATE_KEY_PREFIX`].
    pub fn with_private_keys(mut self) -> Self {
        self.private_keys = true;
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.names.contains(key) || (self.private_keys && key.starts_with(PRIVATE_KEY_PREFIX))
    }
}

/// An entity-shaped value in canonical form.
///
/// Mapping keys are held in a `BTreeMap`, so equality and serialization never
/// depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Canonical {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Seq(Vec<Canonical>),
    Map(BTreeMap<String, Canonical>),
}

impl Canonical {
    pub fn is_map(&self) -> bool {
        matches!(self, Canonical::Map(_))
    }

    /// Compact, deterministic rendering used to order sequences of mappings.
    pub fn sort_key(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    fn render(&self, out: &mut String) {
        match self {
            Canonical::Null => out.push_str("null"),
            Canonical::Bool(b) => {
                let _ = write!(out, "{}", b);
            }
            Canonical::Number(n) => {
                let _ = write!(out, "{}", n);
            }
            Canonical::String(s) => {
                let _ = write!(out, "{:?}", s);
            }
            Canonical::Seq(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.render(out);
                }
                out.push(']');
            }
            Canonical::Map(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{:?}:", key);
                    value.render(out);
                }
                out.push('}');
            }
        }
    }

    /// Convert back into a plain JSON value.
    pub fn into_value(self) -> Value {
        match self {
            Canonical::Null => Value::Null,
            Canonical::Bool(b) => Value::Bool(b),
            Canonical::Number(n) => Value::Number(n),
            Canonical::String(s) => Value::String(s),
            Canonical::Seq(items) => {
                Value::Array(items.into_iter().map(Canonical::into_value).collect())
            }
            Canonical::Map(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, v.into_value()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// Canonicalize a value, dropping every key in `drop` at any depth.
pub fn canonicalize(value: &Value, drop: &DropFields) -> Canonical {
    match value {
        Value::Null => Canonical::Null,
        Value::Bool(b) => Canonical::Bool(*b),
        Value::Number(n) => Canonical::Number(n.clone()),
        Value::String(s) => Canonical::String(s.clone()),
        Value::Array(items) => {
            let mut canon: Vec<Canonical> =
                items.iter().map(|item| canonicalize(item, drop)).collect();
            if canon.iter().all(Canonical::is_map) {
                canon.sort_by_cached_key(Canonical::sort_key);
            }
            Canonical::Seq(canon)
        }
        Value::Object(map) => Canonical::Map(
            map.iter()
                .filter(|(key, _)| !drop.contains(key))
                .map(|(key, value)| (key.clone(), canonicalize(value, drop)))
                .collect(),
        ),
    }
}

/// Canonical form of an entity, ignoring the server-managed fields of `kind`.
pub fn canonical_entity(entity: &Entity, kind: EntityKind) -> Canonical {
    canonicalize(&entity.to_value(), &kind.read_only_fields())
}

/// Structural equality of two entities of the same kind.
pub fn entities_equal(a: &Entity, b: &Entity, kind: EntityKind) -> bool {
    let drop = kind.read_only_fields();
    canonicalize(&a.to_value(), &drop) == canonicalize(&b.to_value(), &drop)
}

/// Remove every key in `drop` at any depth, preserving order otherwise.
pub fn strip_fields(value: &Value, drop: &DropFields) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|v| strip_fields(v, drop)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !drop.contains(key))
                .map(|(key, value)| (key.clone(), strip_fields(value, drop)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::entity;
    use serde_json::json;

    #[test]
    fn test_key_order_is_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": {"y": 2, "x": 3}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": {"x": 3, "y": 2}, "b": 1}"#).unwrap();
        assert_eq!(
            canonicalize(&a, &DropFields::none()),
            canonicalize(&b, &DropFields::none())
        );
    }

    #[test]
    fn test_list_of_maps_is_sorted() {
        let a = json!({"parameter": [
            {"key": "b", "value": "2"},
            {"key": "a", "value": "1"}
        ]});
        let b = json!({"parameter": [
            {"key": "a", "value": "1"},
            {"key": "b", "value": "2"}
        ]});
        assert_eq!(
            canonicalize(&a, &DropFields::none()),
            canonicalize(&b, &DropFields::none())
        );
    }

    #[test]
    fn test_scalar_list_order_matters() {
        let a = json!({"firingTriggerId": ["1", "2"]});
        let b = json!({"firingTriggerId": ["2", "1"]});
        assert_ne!(
            canonicalize(&a, &DropFields::none()),
            canonicalize(&b, &DropFields::none())
        );
    }

    #[test]
    fn test_mixed_list_order_matters() {
        let a = json!([{"k": 1}, "x"]);
        let b = json!(["x", {"k": 1}]);
        assert_ne!(
            canonicalize(&a, &DropFields::none()),
            canonicalize(&b, &DropFields::none())
        );
    }

    #[test]
    fn test_drop_fields_applies_at_depth() {
        let drop = DropFields::new(["fingerprint"]);
        let value = json!({"name": "x", "nested": [{"fingerprint": "f", "k": 1}]});
        let canon = canonicalize(&value, &drop).into_value();
        assert_eq!(canon, json!({"name": "x", "nested": [{"k": 1}]}));
    }

    #[test]
    fn test_private_keys_only_when_enabled() {
        let value = json!({"__note": "x", "name": "n"});
        let plain = canonicalize(&value, &DropFields::none()).into_value();
        assert!(plain.get("__note").is_some());
        let private = canonicalize(&value, &DropFields::none().with_private_keys()).into_value();
        assert!(private.get("__note").is_none());
    }

    #[test]
    fn test_no_type_coercion() {
        assert_ne!(
            canonicalize(&json!({"v": 1}), &DropFields::none()),
            canonicalize(&json!({"v": "1"}), &DropFields::none())
        );
    }

    #[test]
    fn test_entities_equal_ignores_server_fields() {
        let desired = entity(json!({"name": "Currency", "type": "v"}));
        let current = entity(json!({
            "name": "Currency",
            "type": "v",
            "variableId": "7",
            "path": "accounts/1/containers/2/workspaces/3/variables/7",
            "fingerprint": "1700000000",
            "accountId": "1"
        }));
        assert!(entities_equal(&desired, &current, EntityKind::Variable));
    }

    #[test]
    fn test_entities_differ_on_config() {
        let desired = entity(json!({"name": "All Pages", "type": "CLICK"}));
        let current = entity(json!({"name": "All Pages", "type": "PAGEVIEW"}));
        assert!(!entities_equal(&desired, &current, EntityKind::Trigger));
    }

    #[test]
    fn test_sort_key_is_compact_and_ordered() {
        let canon = canonicalize(&json!({"b": [1, null], "a": "s"}), &DropFields::none());
        assert_eq!(canon.sort_key(), r#"{"a":"s","b":[1,null]}"#);
    }

    #[test]
    fn test_strip_fields_preserves_list_order() {
        let drop = DropFields::new(["path"]);
        let value = json!({"items": [{"k": "b", "path": "x"}, {"k": "a"}]});
        assert_eq!(
            strip_fields(&value, &drop),
            json!({"items": [{"k": "b"}, {"k": "a"}]})
        );
    }
}
