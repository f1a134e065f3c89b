//! # Target Mapping
//!
//! Containers are usually addressed by a short target key instead of raw
//! account and container ids. This module loads the key → ids mapping and
//! resolves the container a command should operate on.
//!
//! ## Sources
//!
//! The mapping is read from the first source that exists:
//!
//! 1. the YAML file passed explicitly (`--targets-config`),
//! 2. `config/targets.yaml` in the working directory,
//! 3. a JSON object in the `GTM_TARGETS_JSON` environment variable.
//!
//! ## Format
//!
//! Either a plain mapping or one wrapped in a top-level `targets:` key.
//! Entries carry `account_id` and `container_id` directly, or group child
//! entries that do; children are flattened to `<group>_<child>`:
//!
//! ```yaml
//! targets:
//!   shop:
//!     account_id: "6001"
//!     container_id: "2001"
//!   central:
//!     ga4: { account_id: "6002", container_id: "2002" }
//! ```
//!
//! yields the keys `shop` and `central_ga4`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::remote::ContainerRef;

/// Mapping file used when no path is given.
pub const DEFAULT_TARGETS_CONFIG: &str = "config/targets.yaml";

/// Environment variable holding a JSON target mapping.
pub const TARGETS_ENV_VAR: &str = "GTM_TARGETS_JSON";

const ACCOUNT_FIELD: &str = "account_id";
const CONTAINER_FIELD: &str = "container_id";

/// Account and container ids for one target key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub account_id: String,
    pub container_id: String,
}

impl Target {
    pub fn container(&self) -> ContainerRef {
        ContainerRef::new(&self.account_id, &self.container_id)
    }
}

/// Target key → ids, ordered by key.
pub type TargetMapping = BTreeMap<String, Target>;

/// Load the target mapping from the first available source.
pub fn load_target_mapping(config_path: Option<&Path>) -> Result<TargetMapping> {
    let file = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_TARGETS_CONFIG)),
    }
    .filter(|path| path.exists());

    let document = match file {
        Some(path) => {
            debug!("Loading target mapping from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            mapping_from_yaml(&content)?
        }
        None => mapping_from_env()?,
    };

    match document {
        Some(mapping) => normalize_mapping(&mapping),
        None => Err(Error::Configuration {
            message: "No target mapping found.".to_string(),
            hint: Some(format!(
                "Pass --targets-config, create {}, or export JSON via {}",
                config_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| DEFAULT_TARGETS_CONFIG.to_string()),
                TARGETS_ENV_VAR
            )),
        }),
    }
}

/// Parse a YAML target document, unwrapping a top-level `targets:` key.
pub fn mapping_from_yaml(content: &str) -> Result<Option<Map<String, Value>>> {
    if content.trim().is_empty() {
        return Ok(Some(Map::new()));
    }
    let document: Value = serde_yaml::from_str(content)?;
    let Value::Object(mut root) = document else {
        return Err(Error::configuration("Target config must be a mapping."));
    };
    match root.remove("targets") {
        None => Ok(Some(root)),
        Some(Value::Null) => Ok(None),
        Some(Value::Object(targets)) => Ok(Some(targets)),
        Some(_) => Err(Error::configuration("Target config must be a mapping.")),
    }
}

fn mapping_from_env() -> Result<Option<Map<String, Value>>> {
    let payload = match std::env::var(TARGETS_ENV_VAR) {
        Ok(payload) if !payload.trim().is_empty() => payload,
        _ => return Ok(None),
    };
    debug!("Loading target mapping from {}", TARGETS_ENV_VAR);
    match serde_json::from_str::<Value>(&payload) {
        Ok(Value::Object(mapping)) => Ok(Some(mapping)),
        Ok(_) => Err(Error::configuration(format!(
            "{} must contain a JSON object mapping.",
            TARGETS_ENV_VAR
        ))),
        Err(err) => Err(Error::configuration(format!(
            "Failed to parse {} environment variable as JSON: {}",
            TARGETS_ENV_VAR, err
        ))),
    }
}

fn has_ids(entry: &Map<String, Value>) -> bool {
    entry.contains_key(ACCOUNT_FIELD) && entry.contains_key(CONTAINER_FIELD)
}

fn scalar_id(key: &str, entry: &Map<String, Value>, field: &str) -> Result<String> {
    match entry.get(field) {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(Error::configuration(format!(
            "Target key '{}' has an invalid '{}'.",
            key, field
        ))),
    }
}

fn target(key: &str, entry: &Map<String, Value>) -> Result<Target> {
    Ok(Target {
        account_id: scalar_id(key, entry, ACCOUNT_FIELD)?,
        container_id: scalar_id(key, entry, CONTAINER_FIELD)?,
    })
}

/// Validate entries and flatten groups into `<group>_<child>` keys.
pub fn normalize_mapping(mapping: &Map<String, Value>) -> Result<TargetMapping> {
    let mut targets = TargetMapping::new();
    for (key, value) in mapping {
        let Value::Object(entry) = value else {
            return Err(Error::configuration(format!(
                "Target key '{}' configuration must be a mapping.",
                key
            )));
        };
        if has_ids(entry) {
            targets.insert(key.clone(), target(key, entry)?);
            continue;
        }

        let mut grouped = false;
        for (child_key, child) in entry {
            if let Value::Object(child) = child {
                if has_ids(child) {
                    let flat_key = format!("{}_{}", key, child_key);
                    let resolved = target(&flat_key, child)?;
                    targets.insert(flat_key, resolved);
                    grouped = true;
                }
            }
        }
        if !grouped {
            return Err(Error::configuration(format!(
                "Target key '{}' configuration is missing 'account_id'/'container_id' \
                 and does not contain sub-entries with those fields.",
                key
            )));
        }
    }
    Ok(targets)
}

/// Resolve the container to operate on.
///
/// Direct ids win; a target key fills in whichever id is missing.
pub fn resolve_container(
    account_id: Option<&str>,
    container_id: Option<&str>,
    target_key: Option<&str>,
    config_path: Option<&Path>,
) -> Result<ContainerRef> {
    let non_blank = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    let mut account = non_blank(account_id);
    let mut container = non_blank(container_id);

    if let Some(key) = non_blank(target_key) {
        if account.is_none() || container.is_none() {
            let mapping = load_target_mapping(config_path)?;
            let Some(entry) = mapping.get(&key) else {
                let available: Vec<&str> = mapping.keys().map(String::as_str).collect();
                return Err(Error::Configuration {
                    message: format!("Target key '{}' not found.", key),
                    hint: Some(format!(
                        "Available entries: {}",
                        if available.is_empty() {
                            "none".to_string()
                        } else {
                            available.join(", ")
                        }
                    )),
                });
            };
            account.get_or_insert_with(|| entry.account_id.clone());
            container.get_or_insert_with(|| entry.container_id.clone());
        }
    }

    match (account, container) {
        (Some(account), Some(container)) => Ok(ContainerRef::new(account, container)),
        _ => Err(Error::Configuration {
            message: "No container selected.".to_string(),
            hint: Some(
                "Provide --account-id and --container-id, or --target-key with a valid mapping"
                    .to_string(),
            ),
        }),
    }
}
