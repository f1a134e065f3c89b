//! # Targets Command Implementation
//!
//! This module implements the `targets` subcommand, which lists the target
//! keys defined in the target mapping together with the container each one
//! resolves to.

use anyhow::Result;
use clap::Args;

use tagsync::config::load_target_mapping;

use super::WorkspaceArgs;

/// List the configured target keys
#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Print the mapping as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `targets` command.
pub fn execute(args: TargetsArgs, workspace: &WorkspaceArgs) -> Result<()> {
    let mapping = load_target_mapping(workspace.targets_config.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&mapping)?);
        return Ok(());
    }
    if mapping.is_empty() {
        println!("No targets configured.");
        return Ok(());
    }
    let width = mapping.keys().map(String::len).max().unwrap_or(0);
    for (key, target) in &mapping {
        println!("{:width$}  {}", key, target.container().path(), width = width);
    }
    Ok(())
}
