//! Tag → trigger reference resolution
//!
//! Desired tags may name their triggers (`firingTriggerNames`,
//! `blockingTriggerNames`) instead of carrying the server-assigned ids the
//! remote store expects (`firingTriggerId`, `blockingTriggerId`). Resolution
//! swaps each name list for the matching id list using a name→id map that
//! sync builds from the current triggers and extends as it creates new ones.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::entity::{Entity, EntityKind};
use crate::error::{Error, Result};
use crate::index::normalize_name;

/// Prefix of the placeholder id recorded for triggers a dry run would create.
pub const PLANNED_ID_PREFIX: &str = "planned:";

/// The two ways a tag references triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRole {
    Firing,
    Blocking,
}

impl TriggerRole {
    pub const ALL: [TriggerRole; 2] = [TriggerRole::Firing, TriggerRole::Blocking];

    /// Field holding human-readable trigger names.
    pub fn names_field(self) -> &'static str {
        match self {
            TriggerRole::Firing => "firingTriggerNames",
            TriggerRole::Blocking => "blockingTriggerNames",
        }
    }

    /// Field holding resolved trigger ids.
    pub fn ids_field(self) -> &'static str {
        match self {
            TriggerRole::Firing => "firingTriggerId",
            TriggerRole::Blocking => "blockingTriggerId",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TriggerRole::Firing => "trigger",
            TriggerRole::Blocking => "blocking trigger",
        }
    }
}

/// Normalized trigger name → trigger id, local to one sync call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerIdMap {
    ids: BTreeMap<String, String>,
}

impl TriggerIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the map from triggers that carry both a name and an id.
    pub fn from_triggers(triggers: &[Entity]) -> Self {
        let mut map = Self::new();
        for trigger in triggers {
            if let (Some(name), Some(id)) = (trigger.name(), trigger.id(EntityKind::Trigger)) {
                map.record(name, id);
            }
        }
        map
    }

    pub fn record(&mut self, name: &str, id: impl Into<String>) {
        self.ids.insert(normalize_name(name), id.into());
    }

    /// Record a trigger that does not exist yet under a placeholder id.
    pub fn record_planned(&mut self, name: &str) {
        let id = format!("{}{}", PLANNED_ID_PREFIX, name.trim());
        self.record(name, id);
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.ids.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn tag_label(tag: &Entity) -> &str {
    tag.name().unwrap_or("?")
}

/// Check a tag's reference fields without resolving them.
///
/// Fails when a role carries both the name list and the id list, or when a
/// name list is not a list of strings.
pub fn check_reference_shape(tag: &Entity) -> Result<()> {
    for role in TriggerRole::ALL {
        trigger_names(tag, role)?;
    }
    Ok(())
}

/// Trigger names listed for `role`, or `None` when the tag uses ids or
/// omits the role. Blank names are skipped.
fn trigger_names(tag: &Entity, role: TriggerRole) -> Result<Option<Vec<String>>> {
    if !tag.contains(role.names_field()) {
        return Ok(None);
    }
    if tag.contains(role.ids_field()) {
        return Err(Error::Configuration {
            message: format!(
                "Tag '{}' cannot specify both {} and {}.",
                tag_label(tag),
                role.names_field(),
                role.ids_field()
            ),
            hint: Some(format!("Keep only {}", role.names_field())),
        });
    }

    let not_a_list = || {
        Error::configuration(format!(
            "Tag '{}': {} must be a list of trigger names.",
            tag_label(tag),
            role.names_field()
        ))
    };
    let Some(Value::Array(raw)) = tag.get(role.names_field()) else {
        return Err(not_a_list());
    };
    let mut names = Vec::with_capacity(raw.len());
    for item in raw {
        let name = item.as_str().ok_or_else(not_a_list)?;
        if !name.trim().is_empty() {
            names.push(name.to_string());
        }
    }
    Ok(Some(names))
}

/// Replace trigger-name references with resolved trigger ids.
///
/// Roles the tag does not mention are left exactly as they are; an absent id
/// field stays absent.
pub fn resolve_tag_references(tag: &Entity, triggers: &TriggerIdMap) -> Result<Entity> {
    let mut resolved = tag.clone();
    for role in TriggerRole::ALL {
        let Some(names) = trigger_names(tag, role)? else {
            continue;
        };
        let mut ids = Vec::with_capacity(names.len());
        for name in &names {
            let id = triggers.resolve(name).ok_or_else(|| Error::Reference {
                tag: tag_label(tag).to_string(),
                trigger: name.clone(),
                role: role.label().to_string(),
            })?;
            ids.push(Value::String(id.to_string()));
        }
        resolved.remove(role.names_field());
        resolved.insert(role.ids_field(), Value::Array(ids));
    }
    Ok(resolved)
}

/// Whether the tag carries at least one firing trigger id, which the remote
/// store requires before a tag can be created.
pub fn has_firing_triggers(tag: &Entity) -> bool {
    tag.get(TriggerRole::Firing.ids_field())
        .and_then(Value::as_array)
        .is_some_and(|ids| !ids.is_empty())
}
