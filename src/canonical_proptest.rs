//! Property-based tests for canonicalization and name matching.
//!
//! These tests use proptest to generate random entity-shaped values and
//! verify that comparison invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::canonical::{canonical_entity, canonicalize, DropFields};
    use crate::entity::{Entity, EntityKind};
    use crate::index::normalize_name;
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    fn arb_fields() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::btree_map("[a-z]{1,6}", arb_value(), 0..6)
            .prop_map(|map| map.into_iter().collect())
    }

    fn arb_kind() -> impl Strategy<Value = EntityKind> {
        prop_oneof![
            Just(EntityKind::Variable),
            Just(EntityKind::Trigger),
            Just(EntityKind::Tag),
        ]
    }

    /// Reverse every sequence whose elements are all mappings, at any depth.
    fn reverse_map_sequences(value: &Value) -> Value {
        match value {
            Value::Array(items) => {
                let mut items: Vec<Value> = items.iter().map(reverse_map_sequences).collect();
                if items.iter().all(Value::is_object) {
                    items.reverse();
                }
                Value::Array(items)
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), reverse_map_sequences(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    // ============================================================================
    // canonicalize property tests
    // ============================================================================

    proptest! {
        /// Property: canonicalizing a canonical value changes nothing
        #[test]
        fn canonicalize_is_idempotent(value in arb_value()) {
            let drop = DropFields::none();
            let once = canonicalize(&value, &drop);
            let twice = canonicalize(&once.clone().into_value(), &drop);
            prop_assert_eq!(once, twice);
        }

        /// Property: the order of mapping sequences does not affect the result
        #[test]
        fn canonicalize_ignores_map_sequence_order(value in arb_value()) {
            let drop = DropFields::none();
            let reversed = reverse_map_sequences(&value);
            prop_assert_eq!(canonicalize(&value, &drop), canonicalize(&reversed, &drop));
        }

        /// Property: canonicalization is deterministic
        #[test]
        fn canonicalize_is_deterministic(value in arb_value()) {
            let drop = DropFields::none().with_private_keys();
            prop_assert_eq!(
                canonicalize(&value, &drop).sort_key(),
                canonicalize(&value, &drop).sort_key()
            );
        }
    }

    // ============================================================================
    // canonical_entity property tests
    // ============================================================================

    proptest! {
        /// Property: server-managed and private fields never affect comparison
        #[test]
        fn server_fields_are_ignored(
            fields in arb_fields(),
            kind in arb_kind(),
            id in "[0-9]{1,4}",
            fingerprint in "[0-9]{1,12}",
        ) {
            let plain = Entity::new(fields.clone());
            let mut stamped = Entity::new(fields);
            stamped.insert("accountId", Value::from("1"));
            stamped.insert("containerId", Value::from("2"));
            stamped.insert("workspaceId", Value::from("3"));
            stamped.insert(kind.id_field(), Value::from(id.clone()));
            stamped.insert("path", Value::from(format!("accounts/1/containers/2/workspaces/3/{}/{}", kind.collection(), id)));
            stamped.insert("fingerprint", Value::from(fingerprint));
            stamped.insert("tagManagerUrl", Value::from("https://tagmanager.google.com/"));
            stamped.insert("__source", Value::from("desired.yaml"));

            prop_assert_eq!(canonical_entity(&plain, kind), canonical_entity(&stamped, kind));
        }
    }

    // ============================================================================
    // normalize_name property tests
    // ============================================================================

    proptest! {
        /// Property: normalizing a normalized name changes nothing
        #[test]
        fn normalize_name_is_idempotent(name in "[a-zA-Z0-9 _-]{0,16}") {
            let once = normalize_name(&name);
            prop_assert_eq!(normalize_name(&once), once.clone());
        }

        /// Property: case and surrounding whitespace never distinguish names
        #[test]
        fn normalize_name_ignores_case_and_padding(name in "[a-zA-Z0-9 ]{0,12}", pad in " {0,3}") {
            let padded = format!("{}{}{}", pad, name.to_uppercase(), pad);
            prop_assert_eq!(normalize_name(&padded), normalize_name(&name));
        }
    }
}
