//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture that lays out a state file and
//! desired-state files in a temporary directory, and a command builder for
//! the `tagsync` binary pointed at them.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_state(|store, ws| {
//!         seed(store, ws, EntityKind::Trigger, json!({"name": "All Pages", "type": "pageview"}));
//!     });
//!     fixture.command().arg("snapshot").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

use tagsync::entity::{Entity, EntityKind};
use tagsync::remote::ContainerRef;
use tagsync::store::MemoryStore;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;
    pub use serde_json::json;
    pub use tagsync::entity::EntityKind;

    #[allow(unused_imports)]
    pub use super::desired;
    #[allow(unused_imports)]
    pub use super::seed;
    pub use super::TestFixture;
    #[allow(unused_imports)]
    pub use super::{ACCOUNT_ID, CONTAINER_ID, WORKSPACE_NAME, WORKSPACE_PATH};
}

/// Account id every fixture container lives in.
pub const ACCOUNT_ID: &str = "1001";

/// Container id of the fixture container.
pub const CONTAINER_ID: &str = "2002";

/// Name of the workspace created by [`TestFixture::with_state`].
pub const WORKSPACE_NAME: &str = "tagsync";

/// Path of the first workspace created in the fixture container.
pub const WORKSPACE_PATH: &str = "accounts/1001/containers/2002/workspaces/1";

/// Common desired-state documents for testing.
#[allow(dead_code)]
pub mod desired {
    /// One trigger and one tag firing on it, referenced by name.
    pub const PAGEVIEW: &str = r#"
triggers:
  - name: All Pages
    type: pageview
tags:
  - name: Main Tag
    type: html
    parameter:
      - key: html
        type: template
        value: "<script>main()</script>"
    firingTriggerNames: [all pages]
"#;

    /// A tag referencing a trigger that neither exists nor is desired.
    pub const DANGLING_REFERENCE: &str = r#"
tags:
  - name: Broken Tag
    type: html
    firingTriggerNames: [Nowhere]
"#;

    /// Entity without a name.
    pub const MISSING_NAME: &str = r#"
variables:
  - type: c
"#;
}

/// Seed one entity into the fixture workspace.
pub fn seed(store: &mut MemoryStore, workspace_path: &str, kind: EntityKind, body: Value) {
    let entity = Entity::from_value(body).expect("entity body must be an object");
    store
        .seed(workspace_path, kind, entity)
        .expect("Failed to seed entity");
}

/// A test fixture that provides a temporary directory holding the store
/// state file and any desired-state files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// The fixture container.
    pub fn container() -> ContainerRef {
        ContainerRef::new(ACCOUNT_ID, CONTAINER_ID)
    }

    /// Write a state file holding the fixture workspace, populated by `setup`.
    pub fn with_state<F>(self, setup: F) -> Self
    where
        F: FnOnce(&mut MemoryStore, &str),
    {
        let mut store = MemoryStore::new();
        let workspace = store.add_workspace(&Self::container(), WORKSPACE_NAME);
        setup(&mut store, &workspace.path);
        store
            .save(&self.state_path())
            .expect("Failed to write state file");
        self
    }

    /// Write a state file with the fixture workspace and nothing in it.
    pub fn with_empty_workspace(self) -> Self {
        self.with_state(|_, _| {})
    }

    /// Add a desired-state file with the given name and content.
    pub fn with_desired(self, name: &str, content: &str) -> Self {
        self.with_file(name, content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the state file.
    pub fn state_path(&self) -> PathBuf {
        self.temp_dir.path().join("tagsync-state.json")
    }

    /// Reload the state file as written by the binary.
    #[allow(dead_code)]
    pub fn load_state(&self) -> MemoryStore {
        MemoryStore::load(&self.state_path()).expect("Failed to load state file")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory, selecting the
    /// fixture container and isolated from the caller's environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = self.bare_command();
        cmd.env("GTM_ACCOUNT_ID", ACCOUNT_ID)
            .env("GTM_CONTAINER_ID", CONTAINER_ID);
        cmd
    }

    /// Like [`TestFixture::command`] but without selecting a container.
    pub fn bare_command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("tagsync");
        cmd.current_dir(self.path())
            .env_remove("GTM_ACCOUNT_ID")
            .env_remove("GTM_CONTAINER_ID")
            .env_remove("GTM_WORKSPACE_NAME")
            .env_remove("GTM_TARGETS_JSON")
            .env_remove("TAGSYNC_STATE")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_state() {
        let fixture = TestFixture::new().with_empty_workspace();
        assert!(fixture.state_path().exists());
        let store = fixture.load_state();
        assert!(store.entities(WORKSPACE_PATH, EntityKind::Tag).is_empty());
    }

    #[test]
    fn test_desired_documents_parse() {
        for content in [desired::PAGEVIEW, desired::DANGLING_REFERENCE, desired::MISSING_NAME] {
            assert!(tagsync::snapshot::Snapshot::from_yaml_str(content).is_ok());
        }
    }
}
