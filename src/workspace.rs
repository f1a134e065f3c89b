//! # Workspace Manager
//!
//! `WorkspaceManager` is the entry point the CLI drives. It owns a store
//! implementing both [`RemoteStore`] and [`WorkspaceStore`], resolves a
//! workspace by name inside a container, and runs the snapshot, diff, sync
//! and publish operations against it.
//!
//! Only sync may create a missing workspace, and only when it is not a dry
//! run. Snapshot, diff and publish require the workspace to exist.

use log::debug;

use crate::diff::{diff_workspace, WorkspaceDiff};
use crate::entity::EntityKind;
use crate::error::Result;
use crate::publish::{publish_from_workspace, PublishOutcome};
use crate::remote::{ContainerRef, RemoteStore, WorkspaceRef, WorkspaceStore};
use crate::snapshot::{normalize_for_export, Snapshot, VersionSnapshot, WorkspaceSnapshot};
use crate::sync::{preflight, sync_workspace, SyncOptions, SyncSummary};

/// High-level operations on the workspaces of one container.
pub struct WorkspaceManager<S> {
    store: S,
    container: ContainerRef,
}

impl<S> WorkspaceManager<S>
where
    S: RemoteStore + WorkspaceStore,
{
    pub fn new(store: S, container: ContainerRef) -> Self {
        Self { store, container }
    }

    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Look up a workspace by name, creating it when `create` is set.
    pub fn resolve_workspace(&mut self, name: &str, create: bool) -> Result<WorkspaceRef> {
        let workspace = self
            .store
            .get_or_create_workspace(&self.container, name, create)?;
        debug!("Workspace '{}' resolved to {}", workspace.name, workspace.path);
        Ok(workspace)
    }

    /// Current workspace contents, stripped of server-managed fields and
    /// canonicalized.
    pub fn export_snapshot(&mut self, workspace_name: &str) -> Result<WorkspaceSnapshot> {
        let workspace = self.resolve_workspace(workspace_name, false)?;
        let mut snapshot = Snapshot::default();
        for kind in [EntityKind::Tag, EntityKind::Trigger, EntityKind::Variable] {
            let current = self.store.list(kind, &workspace.path)?;
            *snapshot.entities_mut(kind) = normalize_for_export(&current, kind);
        }
        Ok(WorkspaceSnapshot {
            workspace_name: workspace.name,
            workspace_path: workspace.path,
            snapshot,
        })
    }

    /// Contents of the container's most recently created version.
    ///
    /// Fails with a remote error when the container has no versions yet.
    pub fn export_latest_version(&mut self) -> Result<VersionSnapshot> {
        let version = self.store.latest_version(&self.container)?;
        debug!(
            "Latest version of {} is {}",
            self.container.path(),
            version.get("path").and_then(|p| p.as_str()).unwrap_or("<unknown>")
        );
        VersionSnapshot::from_version(&self.container, &version)
    }

    /// Diff the desired snapshot against the workspace's current contents.
    pub fn diff_against(&mut self, desired: &Snapshot, workspace_name: &str) -> Result<WorkspaceDiff> {
        let current = self.export_snapshot(workspace_name)?;
        Ok(diff_workspace(desired, &current.snapshot))
    }

    /// Apply the desired snapshot to the workspace.
    ///
    /// The snapshot is validated before the workspace is looked up, so a
    /// malformed document never creates a workspace.
    pub fn sync(
        &mut self,
        desired: &Snapshot,
        workspace_name: &str,
        options: SyncOptions,
    ) -> Result<SyncSummary> {
        preflight(desired)?;
        let workspace = self.resolve_workspace(workspace_name, !options.dry_run)?;
        sync_workspace(&mut self.store, &workspace.path, desired, options)
    }

    /// Create a version from the workspace and publish it.
    pub fn publish(
        &mut self,
        workspace_name: &str,
        version_name: Option<&str>,
        notes: Option<&str>,
        dry_run: bool,
    ) -> Result<PublishOutcome> {
        let workspace = self.resolve_workspace(workspace_name, false)?;
        publish_from_workspace(&mut self.store, &workspace.path, version_name, notes, dry_run)
    }
}
