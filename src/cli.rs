//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// tagsync - Reconcile tag-management workspaces with a desired state
#[derive(Parser, Debug)]
#[command(name = "tagsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    #[command(flatten)]
    workspace: commands::WorkspaceArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export the current workspace contents as a desired-state snapshot
    Snapshot(commands::snapshot::SnapshotArgs),

    /// Show what a sync would create, update and delete
    Diff(commands::diff::DiffArgs),

    /// Apply a desired-state snapshot to the workspace
    Sync(commands::sync::SyncArgs),

    /// Create a version from the workspace and publish it
    Publish(commands::publish::PublishArgs),

    /// List the configured target keys
    Targets(commands::targets::TargetsArgs),

    /// Print a shell completion script
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = tagsync::output::OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Snapshot(args) => commands::snapshot::execute(args, &self.workspace),
            Commands::Diff(args) => commands::diff::execute(args, &self.workspace, &output),
            Commands::Sync(args) => commands::sync::execute(args, &self.workspace, &output),
            Commands::Publish(args) => commands::publish::execute(args, &self.workspace, &output),
            Commands::Targets(args) => commands::targets::execute(args, &self.workspace),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Route `log` records to stderr, keeping stdout for command output.
///
/// `RUST_LOG` still wins when set, so module-level filters keep working.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level.to_lowercase());
    // A logger installed earlier (tests calling execute twice) is kept
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}
