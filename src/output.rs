//! # Output Rendering
//!
//! This module controls how results are shown on the terminal: whether
//! colors and emoji markers are used, and the plain-text rendering of sync
//! summaries and workspace diffs.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagsync::output::{OutputConfig, render_sync_summary};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! print!("{}", render_sync_summary(&summary, &config));
//! ```

use std::env;

use console::style;

use crate::diff::{EntityDiff, WorkspaceDiff};
use crate::entity::EntityKind;
use crate::sync::{KindSummary, SyncSummary};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if `NO_COLOR` is set, `CLICOLOR=0`,
    /// `TERM=dumb`, or stdout is not a TTY (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

#[derive(Clone, Copy)]
enum Change {
    Create,
    Update,
    Delete,
}

fn change_line(config: &OutputConfig, change: Change, name: &str) -> String {
    let (marker, line) = match change {
        Change::Create => ("+", format!("  + {}", name)),
        Change::Update => ("~", format!("  ~ {}", name)),
        Change::Delete => ("-", format!("  - {}", name)),
    };
    if !config.use_color {
        return line;
    }
    let marker = match change {
        Change::Create => style(marker).green(),
        Change::Update => style(marker).yellow(),
        Change::Delete => style(marker).red(),
    };
    format!("  {} {}", marker, name)
}

fn push_changes(out: &mut Vec<String>, config: &OutputConfig, change: Change, names: &[String]) {
    out.extend(names.iter().map(|name| change_line(config, change, name)));
}

fn kind_summary_lines(config: &OutputConfig, kind: EntityKind, summary: &KindSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {} created, {} updated, {} deleted, {} unchanged",
        kind.collection(),
        summary.created.len(),
        summary.updated.len(),
        summary.deleted.len(),
        summary.skipped.len()
    )];
    push_changes(&mut lines, config, Change::Create, &summary.created);
    push_changes(&mut lines, config, Change::Update, &summary.updated);
    push_changes(&mut lines, config, Change::Delete, &summary.deleted);
    lines
}

/// Render a sync summary as plain text, one line per change.
pub fn render_sync_summary(summary: &SyncSummary, config: &OutputConfig) -> String {
    let mut lines = Vec::new();
    if summary.dry_run {
        lines.push(format!(
            "{} Planned changes for {} (dry run, nothing applied)",
            emoji(config, "🔍", "[PLAN]"),
            summary.workspace_path
        ));
    } else {
        lines.push(format!(
            "{} Synced {}",
            emoji(config, "✅", "[OK]"),
            summary.workspace_path
        ));
    }
    for kind in EntityKind::UPSERT_ORDER {
        lines.extend(kind_summary_lines(config, kind, summary.get(kind)));
    }
    if !summary.delete_missing {
        lines.push("Entities missing from the desired state were kept (use --delete-missing to remove them)".to_string());
    }
    lines.join("\n")
}

fn diff_lines(config: &OutputConfig, kind: EntityKind, diff: &EntityDiff) -> Vec<String> {
    if diff.is_empty() {
        return vec![format!("{}: no changes", kind.collection())];
    }
    let mut lines = vec![format!("{}:", kind.collection())];
    push_changes(&mut lines, config, Change::Create, &diff.create);
    push_changes(&mut lines, config, Change::Update, &diff.update);
    push_changes(&mut lines, config, Change::Delete, &diff.delete);
    lines
}

/// Render a workspace diff as plain text.
pub fn render_diff(diff: &WorkspaceDiff, config: &OutputConfig) -> String {
    if diff.is_empty() {
        return "No changes detected.".to_string();
    }
    let mut lines = Vec::new();
    for kind in EntityKind::UPSERT_ORDER {
        lines.extend(diff_lines(config, kind, diff.get(kind)));
    }
    let (create, update, delete) = EntityKind::UPSERT_ORDER
        .iter()
        .map(|kind| diff.get(*kind))
        .fold((0, 0, 0), |(c, u, d), diff| {
            (c + diff.create.len(), u + diff.update.len(), d + diff.delete.len())
        });
    lines.push(format!(
        "Summary: {} to create, {} to update, {} to delete",
        create, update, delete
    ));
    lines.join("\n")
}
