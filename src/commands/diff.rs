//! # Diff Command Implementation
//!
//! This module implements the `diff` subcommand, which compares a
//! desired-state file with the current contents of a workspace and lists
//! the entities a sync would create, update and delete.
//!
//! Entities are matched by name (case-insensitive, trimmed) and compared
//! without their server-managed fields. Whether tag trigger references
//! resolve is not checked here; `sync --dry-run` does that.
//!
//! This command is read-only.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use tagsync::output::{render_diff, OutputConfig};

use super::{command_error, load_desired, WorkspaceArgs};

/// Show the differences between the desired state and the workspace
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Desired-state file (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(short, long, value_name = "FILE")]
    pub desired: PathBuf,

    /// Print the diff as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `diff` command.
pub fn execute(args: DiffArgs, workspace: &WorkspaceArgs, output: &OutputConfig) -> Result<()> {
    let desired = load_desired(&args.desired)?;
    let mut manager = workspace.manager()?;
    let diff = manager
        .diff_against(&desired, &workspace.workspace_name)
        .map_err(command_error)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        println!("{}", render_diff(&diff, output));
    }
    Ok(())
}
