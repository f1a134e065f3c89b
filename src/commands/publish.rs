//! # Publish Command Implementation
//!
//! This module implements the `publish` subcommand, which captures the
//! workspace as a new container version and publishes it.
//!
//! Publishing changes what is live, so the command asks for confirmation
//! unless `--yes` is given. With `--dry-run` it only reports what it would
//! do.

use anyhow::Result;
use clap::Args;
use std::io::Write;

use tagsync::output::{emoji, OutputConfig};
use tagsync::publish::PublishOutcome;

use super::{command_error, WorkspaceArgs};

/// Create a version from the workspace and publish it
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Name of the version to create.
    #[arg(long, value_name = "NAME")]
    pub version_name: Option<String>,

    /// Release notes for the version.
    #[arg(long, value_name = "TEXT")]
    pub notes: Option<String>,

    /// Report what would be published without doing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `publish` command.
pub fn execute(args: PublishArgs, workspace: &WorkspaceArgs, output: &OutputConfig) -> Result<()> {
    let mut manager = workspace.manager()?;
    // Resolve up front so a missing workspace fails before the prompt
    let target = manager
        .resolve_workspace(&workspace.workspace_name, false)
        .map_err(command_error)?;

    if !args.dry_run && !args.yes {
        print!("Publish a new version of {}? (y/N): ", target.path);
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("Publish cancelled.");
            return Ok(());
        }
    }

    let result = manager.publish(
        &workspace.workspace_name,
        args.version_name.as_deref(),
        args.notes.as_deref(),
        args.dry_run,
    );
    if !args.dry_run {
        workspace.save_store(manager.store().inner())?;
    }

    match result.map_err(command_error)? {
        PublishOutcome::DryRun(intent) => {
            println!(
                "{} Would publish {} as version '{}'",
                emoji(output, "🔍", "[PLAN]"),
                intent.workspace_path,
                intent.version_name.as_deref().unwrap_or("(unnamed)")
            );
        }
        PublishOutcome::Published { version_path, .. } => {
            println!("{} Published {}", emoji(output, "🚀", "[OK]"), version_path);
        }
    }
    Ok(())
}
