//! Name-based diff between desired and current entity collections
//!
//! The diff is a pure function of two collections: entities are matched by
//! normalized name and compared in canonical form. Each entity type is
//! diffed independently; whether a tag's trigger references resolve is not
//! checked here, that happens during sync.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::canonical::entities_equal;
use crate::entity::{Entity, EntityKind};
use crate::index::index_by_name;
use crate::snapshot::Snapshot;

/// Create/update/delete name lists for one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDiff {
    pub create: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,
}

impl EntityDiff {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    /// Total number of pending changes.
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }
}

/// Diff across the three entity types of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceDiff {
    pub tags: EntityDiff,
    pub triggers: EntityDiff,
    pub variables: EntityDiff,
}

impl WorkspaceDiff {
    pub fn get(&self, kind: EntityKind) -> &EntityDiff {
        match kind {
            EntityKind::Tag => &self.tags,
            EntityKind::Trigger => &self.triggers,
            EntityKind::Variable => &self.variables,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.triggers.is_empty() && self.variables.is_empty()
    }
}

/// Sort display names case-insensitively and drop repeats.
pub fn sort_names(names: &mut Vec<String>) {
    names.retain(|name| !name.trim().is_empty());
    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    names.dedup();
}

/// Diff two collections of one entity type by name.
pub fn diff_by_name(desired: &[Entity], current: &[Entity], kind: EntityKind) -> EntityDiff {
    let desired_by_name = index_by_name(desired);
    let current_by_name = index_by_name(current);
    for key in desired_by_name.duplicates() {
        warn!("Desired {} name '{}' appears more than once; the last entry wins", kind, key);
    }

    let mut diff = EntityDiff::default();
    for (key, desired_entity) in desired_by_name.iter() {
        let display = desired_entity.name().unwrap_or(key).to_string();
        match current_by_name.get(key) {
            None => diff.create.push(display),
            Some(current_entity) => {
                if !entities_equal(desired_entity, current_entity, kind) {
                    diff.update.push(display);
                }
            }
        }
    }

    for (key, current_entity) in current_by_name.iter() {
        if !desired_by_name.contains_key(key) {
            diff.delete.push(current_entity.name().unwrap_or(key).to_string());
        }
    }

    sort_names(&mut diff.create);
    sort_names(&mut diff.update);
    sort_names(&mut diff.delete);
    diff
}

/// Diff every entity type of two snapshots.
pub fn diff_workspace(desired: &Snapshot, current: &Snapshot) -> WorkspaceDiff {
    WorkspaceDiff {
        tags: diff_by_name(&desired.tags, &current.tags, EntityKind::Tag),
        triggers: diff_by_name(&desired.triggers, &current.triggers, EntityKind::Trigger),
        variables: diff_by_name(&desired.variables, &current.variables, EntityKind::Variable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::entity;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_diff_reports_create_update_delete() {
        let desired = snapshot(json!({
            "tags": [{"name": "Main Tag", "type": "html", "notes": "new"}],
            "triggers": [{"name": "All Pages", "type": "PAGEVIEW"}],
            "variables": [{"name": "Env Var", "type": "v"}]
        }));
        let current = snapshot(json!({
            "tags": [
                {"name": "Main Tag", "type": "html", "notes": "old"},
                {"name": "Old Tag", "type": "html"}
            ],
            "triggers": [{"name": "All Pages", "type": "PAGEVIEW"}],
            "variables": []
        }));

        let diff = diff_workspace(&desired, &current);
        assert!(diff.tags.create.is_empty());
        assert_eq!(diff.tags.update, vec!["Main Tag"]);
        assert_eq!(diff.tags.delete, vec!["Old Tag"]);
        assert!(diff.triggers.is_empty());
        assert_eq!(diff.variables.create, vec!["Env Var"]);
    }

    #[test]
    fn test_ga4_scenario() {
        let desired = snapshot(json!({
            "variables": [{"name": "Currency", "type": "v"}],
            "triggers": [{"name": "All Pages", "type": "CLICK"}],
            "tags": [
                {"name": "GA4 Config", "type": "gaawc"},
                {"name": "GA4 Event", "type": "gaawe"}
            ]
        }));
        let current = snapshot(json!({
            "variables": [{"name": "Currency", "type": "v"}],
            "triggers": [{"name": "All Pages", "type": "PAGEVIEW"}],
            "tags": [{"name": "GA4 Config", "type": "gaawc"}]
        }));

        let diff = diff_workspace(&desired, &current);
        assert!(diff.variables.is_empty());
        assert_eq!(diff.triggers.update, vec!["All Pages"]);
        assert_eq!(diff.tags.create, vec!["GA4 Event"]);
        assert!(diff.tags.update.is_empty());
        assert!(diff.tags.delete.is_empty());
    }

    #[test]
    fn test_matching_ignores_case_and_server_fields() {
        let desired = vec![entity(json!({"name": "currency", "type": "v"}))];
        let current = vec![entity(json!({
            "name": " Currency",
            "type": "v",
            "variableId": "3",
            "fingerprint": "99"
        }))];
        assert!(diff_by_name(&desired, &current, EntityKind::Variable).is_empty());
    }

    #[test]
    fn test_names_sorted_case_insensitively() {
        let desired = vec![
            entity(json!({"name": "beta"})),
            entity(json!({"name": "Alpha"})),
            entity(json!({"name": "gamma"})),
        ];
        let diff = diff_by_name(&desired, &[], EntityKind::Tag);
        assert_eq!(diff.create, vec!["Alpha", "beta", "gamma"]);
        assert_eq!(diff.len(), 3);
    }

    #[test]
    fn test_sets_are_disjoint() {
        let desired = vec![
            entity(json!({"name": "keep", "v": 1})),
            entity(json!({"name": "change", "v": 2})),
            entity(json!({"name": "new"})),
        ];
        let current = vec![
            entity(json!({"name": "keep", "v": 1})),
            entity(json!({"name": "change", "v": 1})),
            entity(json!({"name": "gone"})),
        ];
        let diff = diff_by_name(&desired, &current, EntityKind::Variable);
        assert_eq!(diff.create, vec!["new"]);
        assert_eq!(diff.update, vec!["change"]);
        assert_eq!(diff.delete, vec!["gone"]);
    }

    #[test]
    fn test_sort_names_dedups() {
        let mut names = vec!["b".to_string(), "A".to_string(), "b".to_string(), " ".to_string()];
        sort_names(&mut names);
        assert_eq!(names, vec!["A", "b"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let diff = WorkspaceDiff::default();
        let value = serde_json::to_value(&diff).unwrap();
        assert!(value["tags"]["create"].is_array());
        assert!(value["variables"]["delete"].is_array());
    }
}
