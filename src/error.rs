//! # Error Handling
//!
//! This module defines the centralized error type for `tagsync`. It uses the
//! `thiserror` library to build an `Error` enum covering every failure the
//! reconciliation engine can surface, with messages that name the entity or
//! remote operation involved.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The first group of variants is the
//!   reconciliation taxonomy:
//!   - `Configuration`: the desired-state document is malformed (missing
//!     `name`, ambiguous trigger references, missing firing triggers).
//!   - `Reference`: a tag names a trigger that does not exist.
//!   - `TransientRemote`: the remote store failed in a way worth retrying.
//!   - `Remote`: the remote store refused the call (conflict, not found,
//!     stale fingerprint).
//!   - `Protocol`: a remote response is missing a field the contract
//!     guarantees.
//!
//!   The remaining variants wrap I/O and (de)serialization failures.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Nothing in the library recovers from these errors locally; they propagate
//! to the caller unchanged.

use thiserror::Error;

/// Main error type for tagsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied desired-state data is malformed.
    ///
    /// Includes an optional hint about how to fix the document.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Configuration {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A tag references a trigger by name that cannot be resolved.
    #[error("Reference error: tag '{tag}' references missing {role} by name: '{trigger}'")]
    Reference {
        tag: String,
        trigger: String,
        /// Which reference role failed ("trigger" or "blocking trigger")
        role: String,
    },

    /// A remote call failed transiently (rate limit, 5xx, timeout).
    #[error("Transient remote error during {operation}: {message}")]
    TransientRemote { operation: String, message: String },

    /// A remote call was rejected and retrying will not help.
    #[error("Remote operation failed: {operation} - {message}")]
    Remote { operation: String, message: String },

    /// A remote response is missing a field the remote contract guarantees.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// No workspace with the requested name exists in the container.
    #[error("Workspace not found: name='{name}' in {container}")]
    WorkspaceNotFound { name: String, container: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Build a `Configuration` error without a hint.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: None,
        }
    }

    /// Build a `Protocol` error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }

    /// Whether the failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::TransientRemote { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_configuration() {
        let error = Error::configuration("Tag is missing a non-empty 'name'.");
        let display = format!("{}", error);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("non-empty 'name'"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_configuration_with_hint() {
        let error = Error::Configuration {
            message: "No target mapping found".to_string(),
            hint: Some("Set GTM_TARGETS_JSON".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("No target mapping found"));
        assert!(display.contains("hint:"));
        assert!(display.contains("GTM_TARGETS_JSON"));
    }

    #[test]
    fn test_error_display_reference() {
        let error = Error::Reference {
            tag: "GA4 Event".to_string(),
            trigger: "All Clicks".to_string(),
            role: "trigger".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Reference error"));
        assert!(display.contains("GA4 Event"));
        assert!(display.contains("'All Clicks'"));
    }

    #[test]
    fn test_error_display_remote() {
        let error = Error::Remote {
            operation: "update tag".to_string(),
            message: "fingerprint mismatch".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Remote operation failed"));
        assert!(display.contains("update tag"));
        assert!(display.contains("fingerprint mismatch"));
    }

    #[test]
    fn test_error_display_workspace_not_found() {
        let error = Error::WorkspaceNotFound {
            name: "iac".to_string(),
            container: "accounts/1/containers/2".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("name='iac'"));
        assert!(display.contains("accounts/1/containers/2"));
    }

    #[test]
    fn test_is_transient() {
        let transient = Error::TransientRemote {
            operation: "list tags".to_string(),
            message: "503".to_string(),
        };
        assert!(transient.is_transient());
        assert!(!Error::protocol("missing path").is_transient());
        assert!(!Error::configuration("bad").is_transient());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{unclosed").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_str = "invalid: [unclosed";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: Error = yaml_error.into();
        let display = format!("{}", error);
        assert!(display.contains("YAML parsing error"));
    }
}
