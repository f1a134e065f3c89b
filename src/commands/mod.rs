//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `tagsync`
//! command-line tool. Each subcommand is defined in its own file to keep the
//! logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! The options that select a container, a workspace and the state file are
//! global and shared through [`WorkspaceArgs`].

pub mod completions;
pub mod diff;
pub mod publish;
pub mod snapshot;
pub mod sync;
pub mod targets;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use tagsync::config::{load_target_mapping, resolve_container};
use tagsync::error::Error;
use tagsync::remote::ContainerRef;
use tagsync::snapshot::Snapshot;
use tagsync::store::MemoryStore;
use tagsync::suggestions;
use tagsync::transport::{RetryPolicy, Retrying};
use tagsync::workspace::WorkspaceManager;

/// Store type every command operates on.
pub type Manager = WorkspaceManager<Retrying<MemoryStore>>;

/// Container, workspace and state selection shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Account id of the container.
    #[arg(long, global = true, value_name = "ID", env = "GTM_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Container id.
    #[arg(long, global = true, value_name = "ID", env = "GTM_CONTAINER_ID")]
    pub container_id: Option<String>,

    /// Target key looked up in the target mapping to fill in missing ids.
    #[arg(long, global = true, value_name = "KEY")]
    pub target_key: Option<String>,

    /// Path to the target mapping YAML.
    ///
    /// Defaults to `config/targets.yaml`; the `GTM_TARGETS_JSON`
    /// environment variable is used when no file exists.
    #[arg(long, global = true, value_name = "FILE")]
    pub targets_config: Option<PathBuf>,

    /// Name of the workspace to operate on.
    #[arg(
        long,
        global = true,
        value_name = "NAME",
        env = "GTM_WORKSPACE_NAME",
        default_value = "tagsync"
    )]
    pub workspace_name: String,

    /// JSON file holding the workspace store state.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "TAGSYNC_STATE",
        default_value = "tagsync-state.json"
    )]
    pub state: PathBuf,
}

impl WorkspaceArgs {
    /// Resolve the container from direct ids or the target mapping.
    pub fn container(&self) -> Result<ContainerRef> {
        let ids_complete = self.account_id.is_some() && self.container_id.is_some();
        if let (Some(key), false) = (self.target_key.as_deref(), ids_complete) {
            // Unknown keys get a did-you-mean hint; other mapping errors
            // surface from resolve_container below
            if let Ok(mapping) = load_target_mapping(self.targets_config.as_deref()) {
                if !mapping.contains_key(key) {
                    let available: Vec<&str> = mapping.keys().map(String::as_str).collect();
                    return Err(suggestions::unknown_target_key(key, &available));
                }
            }
        }

        Ok(resolve_container(
            self.account_id.as_deref(),
            self.container_id.as_deref(),
            self.target_key.as_deref(),
            self.targets_config.as_deref(),
        )?)
    }

    /// Load the store state file.
    pub fn load_store(&self) -> Result<MemoryStore> {
        if !self.state.exists() {
            return Err(suggestions::state_not_found(&self.state));
        }
        MemoryStore::load(&self.state)
            .with_context(|| format!("Failed to load state from {}", self.state.display()))
    }

    /// Persist the store state after a mutating command.
    pub fn save_store(&self, store: &MemoryStore) -> Result<()> {
        store
            .save(&self.state)
            .with_context(|| format!("Failed to save state to {}", self.state.display()))
    }

    /// Build a manager over the state file for the selected container.
    pub fn manager(&self) -> Result<Manager> {
        let container = self.container()?;
        let store = Retrying::new(self.load_store()?, RetryPolicy::default());
        Ok(WorkspaceManager::new(store, container))
    }
}

/// Translate library errors, adding hints where the user can act on them.
pub fn command_error(err: Error) -> anyhow::Error {
    match err {
        Error::WorkspaceNotFound { name, container } => {
            suggestions::workspace_not_found(&name, &container)
        }
        other => other.into(),
    }
}

/// Read the desired snapshot from a JSON or YAML file.
pub fn load_desired(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Err(suggestions::desired_not_found(path));
    }
    Snapshot::from_file(path)
        .with_context(|| format!("Failed to load desired state from {}", path.display()))
}
