//! # tagsync
//!
//! Desired-state reconciliation for tag-management workspaces. A workspace
//! holds three collections of named entities (variables, triggers and tags);
//! this library compares a desired snapshot of those collections with what a
//! remote store currently holds, and applies the difference in an order that
//! never leaves a tag pointing at a missing trigger.
//!
//! ## Quick Example
//!
//! ```
//! use tagsync::remote::ContainerRef;
//! use tagsync::snapshot::Snapshot;
//! use tagsync::store::MemoryStore;
//! use tagsync::sync::SyncOptions;
//! use tagsync::workspace::WorkspaceManager;
//!
//! let container = ContainerRef::new("6001", "2001");
//! let mut store = MemoryStore::new();
//! store.add_workspace(&container, "iac");
//!
//! let desired = Snapshot::from_yaml_str(r#"
//! triggers:
//!   - name: All Pages
//!     type: pageview
//! tags:
//!   - name: Hello
//!     type: html
//!     firingTriggerNames: [All Pages]
//! "#).unwrap();
//!
//! let mut manager = WorkspaceManager::new(store, container);
//!
//! // Plan first: a dry run only lists
//! let plan = manager.sync(&desired, "iac", SyncOptions::default()).unwrap();
//! assert_eq!(plan.tags.created, vec!["Hello"]);
//!
//! // Then apply
//! let applied = manager.sync(&desired, "iac", SyncOptions::live()).unwrap();
//! assert_eq!(applied.triggers.created, vec!["All Pages"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Entities (`entity`)**: loosely typed JSON records with typed accessors
//!   for the fields reconciliation relies on.
//! - **Canonical form (`canonical`)**: order-insensitive comparison that
//!   ignores server-managed fields.
//! - **Index and diff (`index`, `diff`)**: name-based matching and the pure
//!   create/update/delete diff.
//! - **Reference resolution (`reference`)**: tags may name their triggers;
//!   names are swapped for ids during sync.
//! - **Orchestration (`sync`, `publish`, `workspace`)**: the ordered
//!   sync algorithm, version publishing, and the manager tying them to a
//!   container.
//! - **Remote collaborators (`remote`, `transport`, `store`)**: the store
//!   traits, pagination and retry helpers, and the in-memory store.
//!
//! ## Execution Flow
//!
//! A sync call runs the following steps, aborting on the first error:
//!
//! 1.  **Preflight**: validate names and trigger-reference shapes.
//! 2.  **Variables**: create, update or skip.
//! 3.  **Triggers**: create, update or skip, recording trigger ids by name.
//! 4.  **Tags**: resolve trigger names, then create, update or skip.
//! 5.  **Deletes**: optionally remove tags, triggers, then variables that the
//!     desired snapshot no longer names.

pub mod canonical;
pub mod config;
pub mod diff;
pub mod entity;
pub mod error;
pub mod index;
pub mod merge;
pub mod output;
pub mod publish;
pub mod reference;
pub mod remote;
pub mod snapshot;
pub mod store;
pub mod suggestions;
pub mod sync;
pub mod transport;
pub mod workspace;

#[cfg(test)]
mod canonical_proptest;
