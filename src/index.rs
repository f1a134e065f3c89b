//! Name-keyed lookup over an entity collection.
//!
//! Entities are matched across desired and current state by name, compared
//! case-insensitively after trimming. Entities without a usable name cannot
//! be addressed and are left out of the index.

use std::collections::BTreeMap;

use crate::entity::Entity;

/// Normalize a display name into its matching key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lookup from normalized name to entity.
///
/// When two entities share a normalized name the later one wins; the key is
/// remembered in [`EntityIndex::duplicates`] so callers can report it.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex<'a> {
    by_name: BTreeMap<String, &'a Entity>,
    duplicates: Vec<String>,
}

impl<'a> EntityIndex<'a> {
    pub fn build(entities: &'a [Entity]) -> Self {
        let mut index = Self::default();
        for entity in entities {
            let Some(name) = entity.name() else {
                continue;
            };
            let key = normalize_name(name);
            if index.by_name.insert(key.clone(), entity).is_some() {
                index.duplicates.push(key);
            }
        }
        index
    }

    /// Look up by display name (normalized before lookup).
    pub fn get(&self, name: &str) -> Option<&'a Entity> {
        self.by_name.get(&normalize_name(name)).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_name.contains_key(key)
    }

    /// Entries ordered by normalized name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a Entity)> + '_ {
        self.by_name.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Normalized names that occurred more than once in the input.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }
}

/// Index a collection by normalized name.
pub fn index_by_name(entities: &[Entity]) -> EntityIndex<'_> {
    EntityIndex::build(entities)
}
