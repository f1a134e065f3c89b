//! Pagination and retry helpers shared by remote store implementations.
//!
//! Listing endpoints hand out results a page at a time; [`drain_pages`]
//! follows the page-token cursor until it runs out. [`Retrying`] wraps any
//! store and retries transient failures on a capped exponential schedule
//! from the `backoff` crate. Only idempotent calls are retried: creating an
//! entity, a workspace or a version twice would leave duplicates behind.

use std::cell::Cell;
use std::collections::HashSet;
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use log::warn;
use serde_json::Value;

use crate::entity::{Entity, EntityKind};
use crate::error::{Error, Result};
use crate::remote::{ContainerRef, RemoteStore, Workspace, WorkspaceStore};

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

/// Fetch pages until the cursor is exhausted.
///
/// `fetch` receives the token of the page to load (`None` for the first).
/// A token seen twice means the remote would loop forever and is reported
/// as a protocol error.
pub fn drain_pages<T, F>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    let mut items = Vec::new();
    let mut seen = HashSet::new();
    let mut token: Option<String> = None;
    loop {
        let page = fetch(token.as_deref())?;
        items.extend(page.items);
        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(next) => {
                if !seen.insert(next.clone()) {
                    return Err(Error::protocol(format!(
                        "Pagination token '{}' was returned twice.",
                        next
                    )));
                }
                token = Some(next);
            }
            None => return Ok(items),
        }
    }
}

/// How often and how patiently transient remote failures are retried.
///
/// Delays grow exponentially from `base_delay`, capped at `max_delay`,
/// without jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// The backoff schedule. The retry count, not elapsed time, bounds it.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_interval(self.max_delay)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Run `call`, retrying while it fails transiently and retries remain.
    pub fn run<T, F>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let attempts = Cell::new(0u32);
        let max_retries = self.max_retries;
        let outcome = backoff::retry_notify(
            self.backoff(),
            || {
                attempts.set(attempts.get() + 1);
                call().map_err(|err| {
                    if err.is_transient() && attempts.get() <= max_retries {
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            },
            |err: Error, delay: Duration| {
                warn!(
                    "{} failed ({}); retry {}/{} in {:?}",
                    operation,
                    err,
                    attempts.get(),
                    max_retries,
                    delay
                );
            },
        );
        outcome.map_err(|err| match err {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => err,
        })
    }
}

/// Store decorator that retries idempotent calls under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RemoteStore> RemoteStore for Retrying<S> {
    fn list(&mut self, kind: EntityKind, workspace_path: &str) -> Result<Vec<Entity>> {
        let operation = format!("list {}", kind.collection());
        self.policy
            .run(&operation, || self.inner.list(kind, workspace_path))
    }

    fn create(&mut self, kind: EntityKind, workspace_path: &str, body: &Entity) -> Result<Entity> {
        self.inner.create(kind, workspace_path, body)
    }

    fn update(
        &mut self,
        kind: EntityKind,
        path: &str,
        body: &Entity,
        fingerprint: Option<&str>,
    ) -> Result<Entity> {
        let operation = format!("update {}", kind);
        self.policy
            .run(&operation, || self.inner.update(kind, path, body, fingerprint))
    }

    fn delete(&mut self, kind: EntityKind, path: &str) -> Result<()> {
        let operation = format!("delete {}", kind);
        self.policy.run(&operation, || self.inner.delete(kind, path))
    }
}

impl<S: WorkspaceStore> WorkspaceStore for Retrying<S> {
    fn list_workspaces(&mut self, container: &ContainerRef) -> Result<Vec<Workspace>> {
        self.policy
            .run("list workspaces", || self.inner.list_workspaces(container))
    }

    fn create_workspace(&mut self, container: &ContainerRef, name: &str) -> Result<Workspace> {
        self.inner.create_workspace(container, name)
    }

    fn create_version(
        &mut self,
        workspace_path: &str,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Value> {
        self.inner.create_version(workspace_path, name, notes)
    }

    fn publish_version(&mut self, version_path: &str) -> Result<Value> {
        self.policy
            .run("publish version", || self.inner.publish_version(version_path))
    }

    fn latest_version(&mut self, container: &ContainerRef) -> Result<Value> {
        self.policy
            .run("latest version", || self.inner.latest_version(container))
    }
}
