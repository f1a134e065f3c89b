//! # In-Memory Workspace Store
//!
//! `MemoryStore` implements [`RemoteStore`] and [`WorkspaceStore`] over plain
//! data held in memory. It behaves like the tag-management API where the
//! reconciliation engine can observe the difference:
//!
//! - entities get numeric ids, an API path, the scope ids of
//!   their workspace, a display URL and a fresh fingerprint on every write;
//! - names are unique per collection (case-insensitive, trimmed);
//! - a tag cannot be created without a firing trigger;
//! - an update carrying a stale fingerprint is refused;
//! - listings are paginated when a page size is configured.
//!
//! Every call is recorded in order, so tests can assert not only on the end
//! state but on the sequence of remote operations. Transient failures can be
//! injected to exercise retry handling.
//!
//! The store state serializes to JSON; the CLI persists it to a state file
//! between invocations.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::entity::{Entity, EntityKind, FINGERPRINT_FIELD, PATH_FIELD, URL_FIELD};
use crate::error::{Error, Result};
use crate::index::normalize_name;
use crate::reference::has_firing_triggers;
use crate::remote::{ContainerRef, RemoteStore, Workspace, WorkspaceRef, WorkspaceStore};
use crate::snapshot::Snapshot;
use crate::transport::{drain_pages, Page};

const UI_BASE_URL: &str = "https://tagmanager.google.com/#/container";

/// A remote operation as observed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { kind: EntityKind, workspace_path: String },
    Create { kind: EntityKind, name: String },
    Update { kind: EntityKind, path: String, fingerprint: Option<String> },
    Delete { kind: EntityKind, path: String },
    ListWorkspaces { container: String },
    CreateWorkspace { name: String },
    CreateVersion { workspace_path: String },
    PublishVersion { path: String },
    LatestVersion { container: String },
}

impl Call {
    /// Whether the call changes remote state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::List { .. } | Call::ListWorkspaces { .. } | Call::LatestVersion { .. }
        )
    }

    /// Whether the call creates, updates or deletes an entity.
    pub fn is_entity_mutation(&self) -> bool {
        matches!(
            self,
            Call::Create { .. } | Call::Update { .. } | Call::Delete { .. }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkspace {
    account_id: String,
    container_id: String,
    workspace_id: String,
    name: String,
    #[serde(flatten)]
    entities: Snapshot,
}

impl StoredWorkspace {
    fn container(&self) -> ContainerRef {
        ContainerRef::new(&self.account_id, &self.container_id)
    }

    fn path(&self) -> String {
        self.container().workspace_path(&self.workspace_id)
    }
}

/// A captured workspace version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredVersion {
    pub container_version_id: String,
    pub path: String,
    pub workspace_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub entities: Snapshot,
}

/// Serializable contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    #[serde(default)]
    workspaces: Vec<StoredWorkspace>,
    #[serde(default)]
    versions: Vec<StoredVersion>,
    /// Paths of published versions, oldest first.
    #[serde(default)]
    published: Vec<String>,
    #[serde(default)]
    workspace_counter: u64,
    #[serde(default)]
    version_counter: u64,
    #[serde(default)]
    entity_counter: u64,
    #[serde(default)]
    revision: u64,
}

/// In-memory [`RemoteStore`] and [`WorkspaceStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: StoreState,
    calls: Vec<Call>,
    page_size: Option<usize>,
    pending_failures: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: StoreState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    /// Load store state from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let state: StoreState = serde_json::from_str(&content)?;
        Ok(Self::from_state(state))
    }

    /// Write store state to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.state)?;
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Serve listings `size` entities at a time.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Make the next `count` calls fail with a transient error.
    pub fn fail_transient(&mut self, count: u32) {
        self.pending_failures = count;
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Calls that create, update or delete entities.
    pub fn entity_mutations(&self) -> Vec<&Call> {
        self.calls.iter().filter(|c| c.is_entity_mutation()).collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Add a workspace without recording a call.
    pub fn add_workspace(&mut self, container: &ContainerRef, name: &str) -> WorkspaceRef {
        let workspace = self.insert_workspace(container, name);
        WorkspaceRef {
            name: workspace.name,
            path: workspace.path.unwrap_or_default(),
        }
    }

    /// Add an entity without recording a call. Tags may be seeded without
    /// firing triggers.
    pub fn seed(&mut self, workspace_path: &str, kind: EntityKind, body: Entity) -> Result<Entity> {
        self.insert_entity(kind, workspace_path, &body)
    }

    /// Current entities of one collection, in insertion order.
    pub fn entities(&self, workspace_path: &str, kind: EntityKind) -> Vec<Entity> {
        self.workspace_by_path(workspace_path)
            .map(|ws| ws.entities.entities(kind).to_vec())
            .unwrap_or_default()
    }

    pub fn versions(&self) -> &[StoredVersion] {
        &self.state.versions
    }

    pub fn published(&self) -> &[String] {
        &self.state.published
    }

    fn record(&mut self, call: Call) -> Result<()> {
        let operation = format!("{:?}", call);
        self.calls.push(call);
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(Error::TransientRemote {
                operation,
                message: "503 Service Unavailable (injected)".to_string(),
            });
        }
        Ok(())
    }

    fn next_fingerprint(&mut self) -> String {
        self.state.revision += 1;
        self.state.revision.to_string()
    }

    fn workspace_by_path(&self, path: &str) -> Option<&StoredWorkspace> {
        self.state.workspaces.iter().find(|ws| ws.path() == path)
    }

    fn workspace_index(&self, path: &str, operation: &str) -> Result<usize> {
        self.state
            .workspaces
            .iter()
            .position(|ws| ws.path() == path)
            .ok_or_else(|| not_found(operation, path))
    }

    /// Locate the workspace and position of the entity at `path`.
    fn locate(&self, kind: EntityKind, path: &str, operation: &str) -> Result<(usize, usize)> {
        for (ws_index, ws) in self.state.workspaces.iter().enumerate() {
            if let Some(position) = ws
                .entities
                .entities(kind)
                .iter()
                .position(|e| e.path() == Some(path))
            {
                return Ok((ws_index, position));
            }
        }
        Err(not_found(operation, path))
    }

    fn next_entity_id(&mut self, kind: EntityKind) -> String {
        loop {
            self.state.entity_counter += 1;
            let id = self.state.entity_counter.to_string();
            let taken = self
                .state
                .workspaces
                .iter()
                .flat_map(|ws| ws.entities.entities(kind))
                .any(|e| e.id(kind) == Some(id.as_str()));
            if !taken {
                return id;
            }
        }
    }

    fn insert_workspace(&mut self, container: &ContainerRef, name: &str) -> Workspace {
        let workspace_id = loop {
            self.state.workspace_counter += 1;
            let id = self.state.workspace_counter.to_string();
            if !self.state.workspaces.iter().any(|ws| ws.workspace_id == id) {
                break id;
            }
        };
        let stored = StoredWorkspace {
            account_id: container.account_id.clone(),
            container_id: container.container_id.clone(),
            workspace_id,
            name: name.to_string(),
            entities: Snapshot::default(),
        };
        let workspace = Workspace {
            name: stored.name.clone(),
            workspace_id: Some(stored.workspace_id.clone()),
            path: Some(stored.path()),
        };
        self.state.workspaces.push(stored);
        workspace
    }

    fn insert_entity(&mut self, kind: EntityKind, workspace_path: &str, body: &Entity) -> Result<Entity> {
        let operation = format!("create {}", kind);
        let ws_index = self.workspace_index(workspace_path, &operation)?;
        let name = body
            .name()
            .ok_or_else(|| rejected(&operation, "name is required"))?
            .to_string();
        self.check_unique_name(ws_index, kind, &name, None, &operation)?;

        let id = self.next_entity_id(kind);
        let mut stored = body.without_read_only(kind);
        self.stamp(ws_index, kind, &id, &mut stored);
        self.state.workspaces[ws_index]
            .entities
            .entities_mut(kind)
            .push(stored.clone());
        Ok(stored)
    }

    fn check_unique_name(
        &self,
        ws_index: usize,
        kind: EntityKind,
        name: &str,
        skip_position: Option<usize>,
        operation: &str,
    ) -> Result<()> {
        let wanted = normalize_name(name);
        let clash = self.state.workspaces[ws_index]
            .entities
            .entities(kind)
            .iter()
            .enumerate()
            .filter(|(position, _)| Some(*position) != skip_position)
            .any(|(_, e)| e.name().map(normalize_name).as_deref() == Some(wanted.as_str()));
        if clash {
            return Err(rejected(
                operation,
                &format!("a {} named '{}' already exists", kind, name),
            ));
        }
        Ok(())
    }

    /// Apply the server-managed fields of a freshly written entity.
    fn stamp(&mut self, ws_index: usize, kind: EntityKind, id: &str, entity: &mut Entity) {
        let fingerprint = self.next_fingerprint();
        let ws = &self.state.workspaces[ws_index];
        let path = format!("{}/{}/{}", ws.path(), kind.collection(), id);
        let url = format!("{}/{}", UI_BASE_URL, path);
        entity.insert("accountId", Value::String(ws.account_id.clone()));
        entity.insert("containerId", Value::String(ws.container_id.clone()));
        entity.insert("workspaceId", Value::String(ws.workspace_id.clone()));
        entity.insert(kind.id_field(), Value::String(id.to_string()));
        entity.insert(PATH_FIELD, Value::String(path));
        entity.insert(FINGERPRINT_FIELD, Value::String(fingerprint));
        entity.insert(URL_FIELD, Value::String(url));
    }

    fn list_page(&self, kind: EntityKind, workspace_path: &str, token: Option<&str>) -> Result<Page<Entity>> {
        let operation = format!("list {}", kind.collection());
        let ws = self
            .workspace_by_path(workspace_path)
            .ok_or_else(|| not_found(&operation, workspace_path))?;
        let all = ws.entities.entities(kind);
        let Some(size) = self.page_size else {
            return Ok(Page::last(all.to_vec()));
        };
        let start = match token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| rejected(&operation, &format!("invalid page token '{}'", token)))?,
            None => 0,
        };
        let end = (start + size).min(all.len());
        let items = all.get(start..end).map(<[Entity]>::to_vec).unwrap_or_default();
        let next_page_token = (end < all.len()).then(|| end.to_string());
        Ok(Page {
            items,
            next_page_token,
        })
    }
}

fn not_found(operation: &str, path: &str) -> Error {
    Error::Remote {
        operation: operation.to_string(),
        message: format!("404 Not Found: {}", path),
    }
}

fn rejected(operation: &str, reason: &str) -> Error {
    Error::Remote {
        operation: operation.to_string(),
        message: format!("400 Bad Request: {}", reason),
    }
}

impl RemoteStore for MemoryStore {
    fn list(&mut self, kind: EntityKind, workspace_path: &str) -> Result<Vec<Entity>> {
        self.record(Call::List {
            kind,
            workspace_path: workspace_path.to_string(),
        })?;
        drain_pages(|token| self.list_page(kind, workspace_path, token))
    }

    fn create(&mut self, kind: EntityKind, workspace_path: &str, body: &Entity) -> Result<Entity> {
        self.record(Call::Create {
            kind,
            name: body.name().unwrap_or_default().to_string(),
        })?;
        if kind == EntityKind::Tag && !has_firing_triggers(body) {
            return Err(rejected(
                &format!("create {}", kind),
                "a tag needs at least one firing trigger",
            ));
        }
        self.insert_entity(kind, workspace_path, body)
    }

    fn update(
        &mut self,
        kind: EntityKind,
        path: &str,
        body: &Entity,
        fingerprint: Option<&str>,
    ) -> Result<Entity> {
        self.record(Call::Update {
            kind,
            path: path.to_string(),
            fingerprint: fingerprint.map(str::to_string),
        })?;
        let operation = format!("update {}", kind);
        let (ws_index, position) = self.locate(kind, path, &operation)?;
        let current = &self.state.workspaces[ws_index].entities.entities(kind)[position];
        if let Some(expected) = fingerprint {
            if current.fingerprint() != Some(expected) {
                return Err(Error::Remote {
                    operation,
                    message: format!(
                        "409 Conflict: fingerprint mismatch (sent {}, current {})",
                        expected,
                        current.fingerprint().unwrap_or("none")
                    ),
                });
            }
        }
        let id = current
            .id(kind)
            .map(str::to_string)
            .ok_or_else(|| rejected(&operation, "stored entity has no id"))?;
        let name = body
            .name()
            .ok_or_else(|| rejected(&operation, "name is required"))?
            .to_string();
        self.check_unique_name(ws_index, kind, &name, Some(position), &operation)?;

        let mut stored = body.without_read_only(kind);
        self.stamp(ws_index, kind, &id, &mut stored);
        self.state.workspaces[ws_index].entities.entities_mut(kind)[position] = stored.clone();
        Ok(stored)
    }

    fn delete(&mut self, kind: EntityKind, path: &str) -> Result<()> {
        self.record(Call::Delete {
            kind,
            path: path.to_string(),
        })?;
        let (ws_index, position) = self.locate(kind, path, &format!("delete {}", kind))?;
        self.state.workspaces[ws_index]
            .entities
            .entities_mut(kind)
            .remove(position);
        Ok(())
    }
}

impl WorkspaceStore for MemoryStore {
    fn list_workspaces(&mut self, container: &ContainerRef) -> Result<Vec<Workspace>> {
        self.record(Call::ListWorkspaces {
            container: container.path(),
        })?;
        Ok(self
            .state
            .workspaces
            .iter()
            .filter(|ws| ws.container() == *container)
            .map(|ws| Workspace {
                name: ws.name.clone(),
                workspace_id: Some(ws.workspace_id.clone()),
                path: Some(ws.path()),
            })
            .collect())
    }

    fn create_workspace(&mut self, container: &ContainerRef, name: &str) -> Result<Workspace> {
        self.record(Call::CreateWorkspace {
            name: name.to_string(),
        })?;
        let wanted = normalize_name(name);
        let clash = self
            .state
            .workspaces
            .iter()
            .any(|ws| ws.container() == *container && normalize_name(&ws.name) == wanted);
        if clash {
            return Err(rejected(
                "create workspace",
                &format!("a workspace named '{}' already exists", name),
            ));
        }
        Ok(self.insert_workspace(container, name))
    }

    fn create_version(
        &mut self,
        workspace_path: &str,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Value> {
        self.record(Call::CreateVersion {
            workspace_path: workspace_path.to_string(),
        })?;
        let ws_index = self.workspace_index(workspace_path, "create version")?;
        self.state.version_counter += 1;
        let ws = &self.state.workspaces[ws_index];
        let id = self.state.version_counter.to_string();
        let version = StoredVersion {
            container_version_id: id.clone(),
            path: format!("{}/versions/{}", ws.container().path(), id),
            workspace_path: workspace_path.to_string(),
            name: name.map(str::to_string),
            notes: notes.map(str::to_string),
            entities: ws.entities.clone(),
        };
        let response = json!({
            "containerVersion": {
                "path": version.path,
                "containerVersionId": version.container_version_id,
                "name": version.name,
                "notes": version.notes,
            },
            "compilerError": false,
        });
        self.state.versions.push(version);
        Ok(response)
    }

    fn publish_version(&mut self, version_path: &str) -> Result<Value> {
        self.record(Call::PublishVersion {
            path: version_path.to_string(),
        })?;
        let version = self
            .state
            .versions
            .iter()
            .find(|v| v.path == version_path)
            .ok_or_else(|| not_found("publish version", version_path))?;
        let response = json!({
            "containerVersion": {
                "path": version.path,
                "containerVersionId": version.container_version_id,
                "name": version.name,
            },
            "compilerError": false,
        });
        self.state.published.push(version_path.to_string());
        Ok(response)
    }

    fn latest_version(&mut self, container: &ContainerRef) -> Result<Value> {
        let container_path = container.path();
        self.record(Call::LatestVersion {
            container: container_path.clone(),
        })?;
        let prefix = format!("{}/versions/", container_path);
        let version = self
            .state
            .versions
            .iter()
            .rev()
            .find(|v| v.path.starts_with(&prefix))
            .ok_or_else(|| not_found("latest version", &format!("{}latest", prefix)))?;

        let mut resource = Map::new();
        resource.insert("path".to_string(), Value::String(version.path.clone()));
        resource.insert(
            "containerVersionId".to_string(),
            Value::String(version.container_version_id.clone()),
        );
        if let Some(name) = &version.name {
            resource.insert("name".to_string(), Value::String(name.clone()));
        }
        for kind in EntityKind::UPSERT_ORDER {
            let entities = version.entities.entities(kind).iter().map(Entity::to_value).collect();
            resource.insert(kind.version_field().to_string(), Value::Array(entities));
        }
        Ok(Value::Object(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::entity;
    use serde_json::json;

    fn store_with_workspace() -> (MemoryStore, String) {
        let mut store = MemoryStore::new();
        let ws = store.add_workspace(&ContainerRef::new("1", "2"), "iac");
        (store, ws.path)
    }

    #[test]
    fn test_create_stamps_server_fields() {
        let (mut store, ws) = store_with_workspace();
        let created = store
            .create(EntityKind::Trigger, &ws, &entity(json!({"name": "All Pages", "type": "PAGEVIEW"})))
            .unwrap();
        assert_eq!(created.id(EntityKind::Trigger), Some("1"));
        assert_eq!(
            created.path(),
            Some("accounts/1/containers/2/workspaces/1/triggers/1")
        );
        assert_eq!(created.get("accountId"), Some(&json!("1")));
        assert!(created.fingerprint().is_some());
        assert!(created.contains("tagManagerUrl"));
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let (mut store, ws) = store_with_workspace();
        store
            .create(EntityKind::Variable, &ws, &entity(json!({"name": "Env"})))
            .unwrap();
        let err = store
            .create(EntityKind::Variable, &ws, &entity(json!({"name": " env "})))
            .unwrap_err();
        assert!(matches!(err, Error::Remote { .. }));
    }

    #[test]
    fn test_tag_create_requires_firing_trigger() {
        let (mut store, ws) = store_with_workspace();
        let err = store
            .create(EntityKind::Tag, &ws, &entity(json!({"name": "T", "type": "html"})))
            .unwrap_err();
        assert!(err.to_string().contains("firing trigger"));
        assert!(store.entities(&ws, EntityKind::Tag).is_empty());
    }

    #[test]
    fn test_update_checks_fingerprint() {
        let (mut store, ws) = store_with_workspace();
        let created = store
            .create(EntityKind::Variable, &ws, &entity(json!({"name": "Env", "type": "v"})))
            .unwrap();
        let path = created.path().unwrap().to_string();

        let err = store
            .update(EntityKind::Variable, &path, &entity(json!({"name": "Env", "type": "c"})), Some("stale"))
            .unwrap_err();
        assert!(err.to_string().contains("fingerprint mismatch"));

        let updated = store
            .update(
                EntityKind::Variable,
                &path,
                &entity(json!({"name": "Env", "type": "c"})),
                created.fingerprint(),
            )
            .unwrap();
        assert_eq!(updated.get("type"), Some(&json!("c")));
        assert_eq!(updated.id(EntityKind::Variable), Some("1"));
        assert_ne!(updated.fingerprint(), created.fingerprint());
    }

    #[test]
    fn test_delete_unknown_path_is_not_found() {
        let (mut store, _) = store_with_workspace();
        let err = store.delete(EntityKind::Tag, "nope").unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_pagination_returns_everything() {
        let (store, ws) = store_with_workspace();
        let mut store = store.with_page_size(2);
        for name in ["a", "b", "c", "d", "e"] {
            store
                .seed(&ws, EntityKind::Variable, entity(json!({"name": name})))
                .unwrap();
        }
        let page = store.list_page(EntityKind::Variable, &ws, None).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("2"));

        let all = store.list(EntityKind::Variable, &ws).unwrap();
        let names: Vec<_> = all.iter().filter_map(Entity::name).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_injected_failures_are_transient() {
        let (mut store, ws) = store_with_workspace();
        store.fail_transient(1);
        assert!(store.list(EntityKind::Tag, &ws).unwrap_err().is_transient());
        assert!(store.list(EntityKind::Tag, &ws).is_ok());
        assert_eq!(store.calls().len(), 2);
    }

    #[test]
    fn test_versions_and_publish() {
        let (mut store, ws) = store_with_workspace();
        let response = store.create_version(&ws, Some("v1"), None).unwrap();
        let path = response["containerVersion"]["path"].as_str().unwrap().to_string();
        assert_eq!(path, "accounts/1/containers/2/versions/1");
        store.publish_version(&path).unwrap();
        assert_eq!(store.published(), &[path]);
        assert_eq!(store.versions()[0].name.as_deref(), Some("v1"));
    }

    #[test]
    fn test_latest_version_carries_entities() {
        let (mut store, ws) = store_with_workspace();
        let container = ContainerRef::new("1", "2");
        let err = store.latest_version(&container).unwrap_err();
        assert!(err.to_string().contains("404 Not Found"));

        store
            .seed(&ws, EntityKind::Variable, entity(json!({"name": "Env", "type": "c"})))
            .unwrap();
        store.create_version(&ws, Some("v1"), None).unwrap();
        store.create_version(&ws, Some("v2"), None).unwrap();

        let latest = store.latest_version(&container).unwrap();
        assert_eq!(latest["path"], json!("accounts/1/containers/2/versions/2"));
        assert_eq!(latest["name"], json!("v2"));
        assert_eq!(latest["variable"][0]["name"], json!("Env"));
        assert_eq!(latest["tag"], json!([]));
        assert!(!store.calls().last().unwrap().is_mutation());
    }

    #[test]
    fn test_state_round_trips_through_file() {
        let (mut store, ws) = store_with_workspace();
        store
            .seed(&ws, EntityKind::Variable, entity(json!({"name": "Env"})))
            .unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        store.save(file.path()).unwrap();

        let mut loaded = MemoryStore::load(file.path()).unwrap();
        assert_eq!(loaded.state(), store.state());
        assert!(loaded.calls().is_empty());
        // Counters survive, so new ids do not collide
        let created = loaded
            .create(EntityKind::Variable, &ws, &entity(json!({"name": "Other"})))
            .unwrap();
        assert_eq!(created.id(EntityKind::Variable), Some("2"));
    }

    #[test]
    fn test_hand_written_ids_are_not_reused() {
        let state: StoreState = serde_json::from_value(json!({
            "workspaces": [{
                "accountId": "1",
                "containerId": "2",
                "workspaceId": "3",
                "name": "iac",
                "triggers": [{
                    "name": "All Pages",
                    "triggerId": "1",
                    "path": "accounts/1/containers/2/workspaces/3/triggers/1"
                }]
            }]
        }))
        .unwrap();
        let mut store = MemoryStore::from_state(state);
        let created = store
            .create(
                EntityKind::Trigger,
                "accounts/1/containers/2/workspaces/3",
                &entity(json!({"name": "Clicks"})),
            )
            .unwrap();
        assert_eq!(created.id(EntityKind::Trigger), Some("2"));
    }
}
