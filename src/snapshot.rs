//! Desired and exported workspace snapshots
//!
//! A snapshot is the three-collection document `{variables, triggers, tags}`.
//! Desired snapshots are read from JSON or YAML files; exported snapshots add
//! the workspace name and path and are written back out as JSON, so an export
//! can be fed straight back in as desired state.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::canonical::canonical_entity;
use crate::entity::{Entity, EntityKind};
use crate::error::{Error, Result};
use crate::index::normalize_name;
use crate::remote::ContainerRef;

/// Tags, triggers and variables of one workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub variables: Vec<Entity>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub triggers: Vec<Entity>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<Entity>,
}

/// `variables: null` (or an empty YAML key) reads as an empty collection.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Entity>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Entity>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Snapshot {
    /// Load a snapshot, choosing YAML for `.yaml`/`.yml` and JSON otherwise.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty YAML document deserializes as unit, not as a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn entities(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Variable => &self.variables,
            EntityKind::Trigger => &self.triggers,
            EntityKind::Tag => &self.tags,
        }
    }

    pub fn entities_mut(&mut self, kind: EntityKind) -> &mut Vec<Entity> {
        match kind {
            EntityKind::Variable => &mut self.variables,
            EntityKind::Trigger => &mut self.triggers,
            EntityKind::Tag => &mut self.tags,
        }
    }

    /// Every entity must carry a non-empty `name`.
    pub fn validate_names(&self) -> Result<()> {
        for kind in EntityKind::UPSERT_ORDER {
            for (position, entity) in self.entities(kind).iter().enumerate() {
                if entity.name().is_none() {
                    return Err(Error::Configuration {
                        message: format!(
                            "{} #{} is missing a non-empty 'name'.",
                            capitalize(kind.label()),
                            position + 1
                        ),
                        hint: Some(format!(
                            "Every entry under '{}' needs a name; it is the matching key",
                            kind.collection()
                        )),
                    });
                }
            }
        }
        Ok(())
    }

    /// Total number of entities across all collections.
    pub fn len(&self) -> usize {
        self.variables.len() + self.triggers.len() + self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A snapshot exported from a named workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub workspace_name: String,
    pub workspace_path: String,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

impl WorkspaceSnapshot {
    /// Pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

/// Where a version export was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

/// Identity of the exported container version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionHeader {
    pub name: Option<String>,
    pub container_version_id: Option<String>,
    pub path: Option<String>,
}

/// A snapshot exported from the latest container version.
///
/// Like [`WorkspaceSnapshot`], the document doubles as desired state: the
/// header fields are ignored when it is read back as a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub source: SnapshotSource,
    pub container_version: VersionHeader,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

impl VersionSnapshot {
    /// Build the export from a container version resource.
    ///
    /// Collection entries that are not objects are skipped.
    pub fn from_version(container: &ContainerRef, version: &Value) -> Result<Self> {
        if !version.is_object() {
            return Err(Error::protocol("Latest version response is not an object."));
        }
        let text = |key: &str| version.get(key).and_then(Value::as_str).map(str::to_string);

        let mut snapshot = Snapshot::default();
        for kind in EntityKind::UPSERT_ORDER {
            let entities: Vec<Entity> = version
                .get(kind.version_field())
                .and_then(Value::as_array)
                .map(|items| items.iter().cloned().filter_map(Entity::from_value).collect())
                .unwrap_or_default();
            *snapshot.entities_mut(kind) = normalize_for_export(&entities, kind);
        }

        Ok(Self {
            source: SnapshotSource {
                kind: "containerVersionLatest".to_string(),
                path: format!("{}/versions/latest", container.path()),
            },
            container_version: VersionHeader {
                name: text("name"),
                container_version_id: text("containerVersionId"),
                path: text("path"),
            },
            snapshot,
        })
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

/// Strip server-managed fields, canonicalize, and order by normalized name.
pub fn normalize_for_export(entities: &[Entity], kind: EntityKind) -> Vec<Entity> {
    let mut normalized: Vec<Entity> = entities
        .iter()
        .filter_map(|entity| Entity::from_value(canonical_entity(entity, kind).into_value()))
        .collect();
    normalized.sort_by_cached_key(|entity| entity.name().map(normalize_name).unwrap_or_default());
    normalized
}
