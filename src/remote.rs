//! # Remote Store Collaborators
//!
//! The reconciliation engine never talks to a tag-management API directly.
//! It drives two collaborator traits instead:
//!
//! - **`RemoteStore`**: list/create/update/delete for one entity collection
//!   under a workspace path. `list` must return every entity, draining any
//!   pagination before it returns.
//!
//! - **`WorkspaceStore`**: workspace lookup and creation, version snapshots,
//!   and publishing.
//!
//! Both traits are implemented by [`crate::store::MemoryStore`], which backs
//! the CLI and the test-suite, and by the [`crate::transport::Retrying`]
//! decorator, which adds backoff on transient failures to any store. A real
//! API client plugs in by implementing the same two traits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{Entity, EntityKind};
use crate::error::{Error, Result};
use crate::index::normalize_name;

/// Account/container pair that owns workspaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub account_id: String,
    pub container_id: String,
}

impl ContainerRef {
    pub fn new(account_id: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            container_id: container_id.into(),
        }
    }

    /// `accounts/{account}/containers/{container}`
    pub fn path(&self) -> String {
        format!(
            "accounts/{}/containers/{}",
            self.account_id, self.container_id
        )
    }

    pub fn workspace_path(&self, workspace_id: &str) -> String {
        format!("{}/workspaces/{}", self.path(), workspace_id)
    }
}

/// A workspace record as listed by the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Workspace {
    /// The workspace's API path, falling back to one built from its id.
    pub fn resolve_path(&self, container: &ContainerRef) -> Result<String> {
        if let Some(path) = self.path.as_deref().filter(|p| !p.trim().is_empty()) {
            return Ok(path.to_string());
        }
        match self.workspace_id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(id) => Ok(container.workspace_path(id)),
            None => Err(Error::protocol(format!(
                "Workspace '{}' has neither a path nor a workspaceId.",
                self.name
            ))),
        }
    }
}

/// A workspace resolved to its addressable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRef {
    pub name: String,
    pub path: String,
}

/// Entity collection operations scoped to a workspace.
pub trait RemoteStore {
    /// Every entity of `kind` under `workspace_path`.
    fn list(&mut self, kind: EntityKind, workspace_path: &str) -> Result<Vec<Entity>>;

    /// Create an entity; `body` carries no server-managed fields.
    fn create(&mut self, kind: EntityKind, workspace_path: &str, body: &Entity) -> Result<Entity>;

    /// Replace the entity at `path`. When `fingerprint` is given the store
    /// must reject the update if the entity changed since it was read.
    fn update(
        &mut self,
        kind: EntityKind,
        path: &str,
        body: &Entity,
        fingerprint: Option<&str>,
    ) -> Result<Entity>;

    fn delete(&mut self, kind: EntityKind, path: &str) -> Result<()>;
}

/// Workspace-level operations scoped to a container.
pub trait WorkspaceStore {
    fn list_workspaces(&mut self, container: &ContainerRef) -> Result<Vec<Workspace>>;

    fn create_workspace(&mut self, container: &ContainerRef, name: &str) -> Result<Workspace>;

    /// Capture the workspace as a version. The response carries the version
    /// under `containerVersion`.
    fn create_version(
        &mut self,
        workspace_path: &str,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Value>;

    fn publish_version(&mut self, version_path: &str) -> Result<Value>;

    /// The most recently created version of the container, with its tags,
    /// triggers and variables under `tag`, `trigger` and `variable`.
    fn latest_version(&mut self, container: &ContainerRef) -> Result<Value>;

    /// Find a workspace by case-insensitive trimmed name, creating it when
    /// `create` is set.
    fn get_or_create_workspace(
        &mut self,
        container: &ContainerRef,
        name: &str,
        create: bool,
    ) -> Result<WorkspaceRef> {
        let wanted = normalize_name(name);
        let existing = self
            .list_workspaces(container)?
            .into_iter()
            .find(|ws| normalize_name(&ws.name) == wanted);

        let workspace = match existing {
            Some(ws) => ws,
            None if create => self.create_workspace(container, name.trim())?,
            None => {
                return Err(Error::WorkspaceNotFound {
                    name: name.to_string(),
                    container: container.path(),
                })
            }
        };
        let path = workspace.resolve_path(container)?;
        Ok(WorkspaceRef {
            name: workspace.name,
            path,
        })
    }
}
