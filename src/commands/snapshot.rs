//! # Snapshot Command Implementation
//!
//! This module implements the `snapshot` subcommand, which exports the
//! current contents of a workspace as JSON. Server-managed fields are
//! stripped and collections are sorted by name, so the export is stable
//! across runs and can be used directly as a desired-state file.
//!
//! With `--from-latest-version` the export is read from the container's
//! most recently created version instead of the workspace, and carries a
//! `source`/`containerVersion` header in place of the workspace fields.
//!
//! This command is read-only.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::{command_error, WorkspaceArgs};

/// Export the workspace as a desired-state snapshot
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Write the snapshot to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Export the latest container version instead of the workspace.
    #[arg(long)]
    pub from_latest_version: bool,
}

/// Execute the `snapshot` command.
pub fn execute(args: SnapshotArgs, workspace: &WorkspaceArgs) -> Result<()> {
    let mut manager = workspace.manager()?;
    let (rendered, count, source) = if args.from_latest_version {
        let exported = manager.export_latest_version().map_err(command_error)?;
        let source = exported
            .container_version
            .path
            .clone()
            .unwrap_or_else(|| exported.source.path.clone());
        (exported.to_json_pretty()?, exported.snapshot.len(), source)
    } else {
        let exported = manager
            .export_snapshot(&workspace.workspace_name)
            .map_err(command_error)?;
        (exported.to_json_pretty()?, exported.snapshot.len(), exported.workspace_path)
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
            eprintln!("Wrote {} entities from {} to {}", count, source, path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
