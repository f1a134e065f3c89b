//! Tag, trigger and variable records.
//!
//! Remote entities are loosely typed: beyond `name` and a handful of
//! server-managed fields, a tag or trigger carries arbitrary nested parameter
//! data. `Entity` keeps that payload as a JSON object and exposes typed
//! accessors for the fields the reconciliation engine relies on.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::DropFields;

/// Scope-parent identifiers the remote store stamps on every entity.
pub const SCOPE_FIELDS: [&str; 3] = ["accountId", "containerId", "workspaceId"];

/// Addressable API path of an entity.
pub const PATH_FIELD: &str = "path";

/// Optimistic-concurrency token of an entity.
pub const FINGERPRINT_FIELD: &str = "fingerprint";

/// Display URL of an entity in the remote UI.
pub const URL_FIELD: &str = "tagManagerUrl";

/// The three entity collections of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Variable,
    Trigger,
    Tag,
}

impl EntityKind {
    /// Creation/update order: nothing depends on tags, tags depend on triggers.
    pub const UPSERT_ORDER: [EntityKind; 3] =
        [EntityKind::Variable, EntityKind::Trigger, EntityKind::Tag];

    /// Deletion order, the reverse of [`EntityKind::UPSERT_ORDER`].
    pub const DELETE_ORDER: [EntityKind; 3] =
        [EntityKind::Tag, EntityKind::Trigger, EntityKind::Variable];

    /// Collection segment used in API paths (`.../workspaces/1/tags/7`).
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Variable => "variables",
            EntityKind::Trigger => "triggers",
            EntityKind::Tag => "tags",
        }
    }

    /// Name of the server-assigned identifier field.
    pub fn id_field(self) -> &'static str {
        match self {
            EntityKind::Variable => "variableId",
            EntityKind::Trigger => "triggerId",
            EntityKind::Tag => "tagId",
        }
    }

    /// Key holding this collection in a container version resource.
    pub fn version_field(self) -> &'static str {
        match self {
            EntityKind::Variable => "variable",
            EntityKind::Trigger => "trigger",
            EntityKind::Tag => "tag",
        }
    }

    /// Singular, human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Variable => "variable",
            EntityKind::Trigger => "trigger",
            EntityKind::Tag => "tag",
        }
    }

    /// Server-managed fields ignored by comparisons and stripped from
    /// request bodies.
    pub fn read_only_fields(self) -> DropFields {
        DropFields::new(
            SCOPE_FIELDS
                .iter()
                .copied()
                .chain([self.id_field(), PATH_FIELD, FINGERPRINT_FIELD, URL_FIELD]),
        )
        .with_private_keys()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named tag, trigger, or variable record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    fields: Map<String, Value>,
}

impl Entity {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Trimmed `name`, or `None` when missing, blank, or not a string.
    pub fn name(&self) -> Option<&str> {
        self.non_blank_str("name")
    }

    /// The field as a trimmed string, ignoring blank and non-string values.
    pub fn non_blank_str(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn path(&self) -> Option<&str> {
        self.non_blank_str(PATH_FIELD)
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.non_blank_str(FINGERPRINT_FIELD)
    }

    /// The server-assigned identifier for an entity of `kind`.
    pub fn id(&self, kind: EntityKind) -> Option<&str> {
        self.non_blank_str(kind.id_field())
    }

    /// API path of this entity: its `path` field, else built from the
    /// workspace path and the type-specific id.
    pub fn resolve_path(&self, workspace_path: &str, kind: EntityKind) -> Option<String> {
        if let Some(path) = self.path() {
            return Some(path.to_string());
        }
        self.id(kind)
            .map(|id| format!("{}/{}/{}", workspace_path, kind.collection(), id))
    }

    /// Copy of this entity with every server-managed field removed, at any
    /// depth. This is the shape sent as a create/update body.
    pub fn without_read_only(&self, kind: EntityKind) -> Entity {
        let stripped = crate::canonical::strip_fields(&self.to_value(), &kind.read_only_fields());
        Entity::from_value(stripped).unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Build an entity from a `serde_json::json!` object literal.
///
/// Non-object values yield an empty entity.
#[cfg(test)]
pub(crate) fn entity(value: Value) -> Entity {
    Entity::from_value(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_is_trimmed() {
        let e = entity(json!({"name": "  All Pages  "}));
        assert_eq!(e.name(), Some("All Pages"));
    }

    #[test]
    fn test_blank_or_missing_name() {
        assert_eq!(entity(json!({"name": "   "})).name(), None);
        assert_eq!(entity(json!({"type": "html"})).name(), None);
        assert_eq!(entity(json!({"name": 42})).name(), None);
    }

    #[test]
    fn test_resolve_path_prefers_path_field() {
        let e = entity(json!({
            "name": "T",
            "path": "accounts/1/containers/2/workspaces/3/triggers/9",
            "triggerId": "4"
        }));
        assert_eq!(
            e.resolve_path("ignored", EntityKind::Trigger).as_deref(),
            Some("accounts/1/containers/2/workspaces/3/triggers/9")
        );
    }

    #[test]
    fn test_resolve_path_from_id() {
        let e = entity(json!({"name": "T", "tagId": "12"}));
        assert_eq!(
            e.resolve_path("accounts/1/containers/2/workspaces/3", EntityKind::Tag)
                .as_deref(),
            Some("accounts/1/containers/2/workspaces/3/tags/12")
        );
        assert_eq!(e.resolve_path("ws", EntityKind::Trigger), None);
    }

    #[test]
    fn test_without_read_only_strips_server_fields() {
        let e = entity(json!({
            "name": "Env",
            "type": "v",
            "accountId": "1",
            "containerId": "2",
            "workspaceId": "3",
            "variableId": "4",
            "path": "p",
            "fingerprint": "f",
            "tagManagerUrl": "https://example.test",
            "__comment": "local note"
        }));
        let body = e.without_read_only(EntityKind::Variable);
        assert_eq!(body.to_value(), json!({"name": "Env", "type": "v"}));
    }

    #[test]
    fn test_read_only_fields_are_kind_specific() {
        let e = entity(json!({"name": "Tag", "triggerId": "1", "tagId": "2"}));
        let body = e.without_read_only(EntityKind::Tag);
        assert!(body.contains("triggerId"));
        assert!(!body.contains("tagId"));
    }

    #[test]
    fn test_kind_orders() {
        assert_eq!(EntityKind::UPSERT_ORDER[0], EntityKind::Variable);
        assert_eq!(EntityKind::DELETE_ORDER[0], EntityKind::Tag);
        assert_eq!(EntityKind::Trigger.to_string(), "trigger");
        assert_eq!(EntityKind::Tag.collection(), "tags");
    }
}
