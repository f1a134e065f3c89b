//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand, which applies a
//! desired-state file to a workspace: variables first, then triggers, then
//! tags, with optional deletion of entities the file no longer names.
//!
//! ## Safety
//!
//! - `--dry-run` lists planned changes without modifying anything,
//!   including configuration and reference errors a live run would hit.
//! - A failed live run leaves already-applied changes in place; the state
//!   file is saved either way so it matches what was applied.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use tagsync::output::{render_sync_summary, OutputConfig};
use tagsync::sync::SyncOptions;

use super::{command_error, load_desired, WorkspaceArgs};

/// Apply a desired-state file to the workspace
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Desired-state file (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(short, long, value_name = "FILE")]
    pub desired: PathBuf,

    /// Show what would change without applying anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Delete tags, triggers and variables missing from the desired file.
    #[arg(long)]
    pub delete_missing: bool,

    /// Only create missing entities; leave existing ones untouched.
    #[arg(long)]
    pub no_update: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run: self.dry_run,
            delete_missing: self.delete_missing,
            update_existing: !self.no_update,
        }
    }
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, workspace: &WorkspaceArgs, output: &OutputConfig) -> Result<()> {
    let desired = load_desired(&args.desired)?;
    let mut manager = workspace.manager()?;
    let result = manager.sync(&desired, &workspace.workspace_name, args.options());

    if !args.dry_run {
        workspace.save_store(manager.store().inner())?;
    }
    let summary = result.map_err(command_error)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render_sync_summary(&summary, output));
    }
    Ok(())
}
