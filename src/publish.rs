//! Version creation and publishing.
//!
//! A live publish is two remote calls: capture the workspace as a version,
//! then publish that version by path. If publishing fails, the captured
//! version stays behind unpublished; nothing is rolled back.

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::remote::WorkspaceStore;

/// What a dry-run publish would do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishIntent {
    pub dry_run: bool,
    pub action: String,
    pub workspace_path: String,
    pub version_name: Option<String>,
}

/// Result of [`publish_from_workspace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublishOutcome {
    DryRun(PublishIntent),
    #[serde(rename_all = "camelCase")]
    Published {
        version_path: String,
        created: Value,
        published: Value,
    },
}

impl PublishOutcome {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, PublishOutcome::DryRun(_))
    }
}

/// The `containerVersion.path` of a version-creation response.
pub fn version_path(response: &Value) -> Result<String> {
    response
        .get("containerVersion")
        .and_then(|version| version.get("path"))
        .and_then(Value::as_str)
        .filter(|path| !path.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::protocol("Version creation did not return containerVersion.path."))
}

/// Create a version from the workspace and publish it.
///
/// A dry run returns the intent without contacting the store.
pub fn publish_from_workspace<S: WorkspaceStore + ?Sized>(
    store: &mut S,
    workspace_path: &str,
    version_name: Option<&str>,
    notes: Option<&str>,
    dry_run: bool,
) -> Result<PublishOutcome> {
    if dry_run {
        return Ok(PublishOutcome::DryRun(PublishIntent {
            dry_run: true,
            action: "publish".to_string(),
            workspace_path: workspace_path.to_string(),
            version_name: version_name.map(str::to_string),
        }));
    }

    info!("Creating version from {}", workspace_path);
    let created = store.create_version(workspace_path, version_name, notes)?;
    let path = version_path(&created)?;
    info!("Publishing version {}", path);
    let published = store.publish_version(&path)?;
    Ok(PublishOutcome::Published {
        version_path: path,
        created,
        published,
    })
}
