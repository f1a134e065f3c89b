//! # Sync Orchestrator
//!
//! Applies a desired snapshot to a workspace through a [`RemoteStore`].
//!
//! ## Order of operations
//!
//! 1. **Preflight**: every desired entity needs a name and every desired tag
//!    a well-formed trigger reference. Nothing remote is touched on failure.
//! 2. **Variables**: create, update or skip each desired variable.
//! 3. **Triggers**: same, while building the trigger name→id map from the
//!    current triggers plus every trigger created or updated in this pass.
//! 4. **Tags**: resolve trigger names through that map, then create, update
//!    or skip. A tag can only be created with at least one firing trigger.
//! 5. **Deletes** (only with `delete_missing`): tags, then triggers, then
//!    variables, so no live tag is left pointing at a deleted trigger.
//!
//! Any error aborts the call. Mutations already applied stay applied; run
//! with `dry_run` first to surface configuration errors without side
//! effects. A dry run issues list calls only.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::canonical::entities_equal;
use crate::diff::sort_names;
use crate::entity::{Entity, EntityKind};
use crate::error::{Error, Result};
use crate::index::{index_by_name, EntityIndex};
use crate::merge::merge_entities;
use crate::reference::{
    check_reference_shape, has_firing_triggers, resolve_tag_references, TriggerIdMap, TriggerRole,
};
use crate::remote::RemoteStore;
use crate::snapshot::Snapshot;

/// Knobs for one sync call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Plan only; no create/update/delete calls are made.
    pub dry_run: bool,
    /// Delete current entities the desired snapshot does not name.
    pub delete_missing: bool,
    /// When false, entities that already exist are skipped even if they
    /// differ.
    pub update_existing: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            delete_missing: false,
            update_existing: true,
        }
    }
}

impl SyncOptions {
    pub fn live() -> Self {
        Self {
            dry_run: false,
            ..Self::default()
        }
    }
}

/// Outcome for one entity type, as sorted display names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub skipped: Vec<String>,
}

impl KindSummary {
    /// Whether anything was (or would be) changed.
    pub fn has_changes(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }

    fn finish(&mut self) {
        sort_names(&mut self.created);
        sort_names(&mut self.updated);
        sort_names(&mut self.deleted);
        sort_names(&mut self.skipped);
    }
}

/// Result of a sync call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub workspace_path: String,
    pub dry_run: bool,
    pub delete_missing: bool,
    pub variables: KindSummary,
    pub triggers: KindSummary,
    pub tags: KindSummary,
}

impl SyncSummary {
    fn new(workspace_path: &str, options: SyncOptions) -> Self {
        Self {
            workspace_path: workspace_path.to_string(),
            dry_run: options.dry_run,
            delete_missing: options.delete_missing,
            ..Self::default()
        }
    }

    pub fn get(&self, kind: EntityKind) -> &KindSummary {
        match kind {
            EntityKind::Variable => &self.variables,
            EntityKind::Trigger => &self.triggers,
            EntityKind::Tag => &self.tags,
        }
    }

    fn get_mut(&mut self, kind: EntityKind) -> &mut KindSummary {
        match kind {
            EntityKind::Variable => &mut self.variables,
            EntityKind::Trigger => &mut self.triggers,
            EntityKind::Tag => &mut self.tags,
        }
    }

    pub fn has_changes(&self) -> bool {
        EntityKind::UPSERT_ORDER
            .iter()
            .any(|kind| self.get(*kind).has_changes())
    }
}

/// What to do with one desired entity.
enum Action<'a> {
    Create,
    Update(&'a Entity),
    Skip,
}

fn plan<'a>(
    desired: &Entity,
    current: &EntityIndex<'a>,
    kind: EntityKind,
    options: SyncOptions,
) -> Action<'a> {
    let Some(existing) = desired.name().and_then(|name| current.get(name)) else {
        return Action::Create;
    };
    if !options.update_existing || entities_equal(desired, existing, kind) {
        Action::Skip
    } else {
        Action::Update(existing)
    }
}

/// Desired entities in document order, keeping only the last entry for each
/// normalized name.
fn effective_entries(desired: &[Entity], kind: EntityKind) -> Vec<&Entity> {
    let index = index_by_name(desired);
    for key in index.duplicates() {
        warn!(
            "Desired {} name '{}' appears more than once; the last entry wins",
            kind, key
        );
    }
    desired
        .iter()
        .filter(|entity| {
            entity
                .name()
                .and_then(|name| index.get(name))
                .is_some_and(|winner| std::ptr::eq(winner, *entity))
        })
        .collect()
}

fn display_name(entity: &Entity) -> String {
    entity.name().unwrap_or_default().to_string()
}

fn create_entity<S: RemoteStore + ?Sized>(
    store: &mut S,
    workspace_path: &str,
    kind: EntityKind,
    desired: &Entity,
) -> Result<Entity> {
    info!("Creating {} '{}'", kind, display_name(desired));
    store.create(kind, workspace_path, &desired.without_read_only(kind))
}

fn update_entity<S: RemoteStore + ?Sized>(
    store: &mut S,
    workspace_path: &str,
    kind: EntityKind,
    existing: &Entity,
    desired: &Entity,
) -> Result<Entity> {
    let path = entity_path(existing, workspace_path, kind)?;
    let body = merge_entities(existing, desired).without_read_only(kind);
    info!("Updating {} '{}' at {}", kind, display_name(desired), path);
    store.update(kind, &path, &body, existing.fingerprint())
}

fn entity_path(entity: &Entity, workspace_path: &str, kind: EntityKind) -> Result<String> {
    entity.resolve_path(workspace_path, kind).ok_or_else(|| {
        Error::protocol(format!(
            "Current {} '{}' has neither a path nor a {}.",
            kind,
            display_name(entity),
            kind.id_field()
        ))
    })
}

/// Validate the desired snapshot without touching the store.
pub(crate) fn preflight(desired: &Snapshot) -> Result<()> {
    desired.validate_names()?;
    for tag in &desired.tags {
        check_reference_shape(tag)?;
    }
    Ok(())
}

fn sync_variables<S: RemoteStore + ?Sized>(
    store: &mut S,
    workspace_path: &str,
    desired: &[Entity],
    options: SyncOptions,
    summary: &mut KindSummary,
) -> Result<()> {
    let kind = EntityKind::Variable;
    let current = store.list(kind, workspace_path)?;
    let current_by_name = index_by_name(&current);

    for entity in effective_entries(desired, kind) {
        match plan(entity, &current_by_name, kind, options) {
            Action::Create => {
                summary.created.push(display_name(entity));
                if !options.dry_run {
                    create_entity(store, workspace_path, kind, entity)?;
                }
            }
            Action::Update(existing) => {
                summary.updated.push(display_name(entity));
                if !options.dry_run {
                    update_entity(store, workspace_path, kind, existing, entity)?;
                }
            }
            Action::Skip => {
                debug!("Skipping {} '{}'", kind, display_name(entity));
                summary.skipped.push(display_name(entity));
            }
        }
    }
    Ok(())
}

/// Returns the trigger name→id map the tag phase resolves against.
fn sync_triggers<S: RemoteStore + ?Sized>(
    store: &mut S,
    workspace_path: &str,
    desired: &[Entity],
    options: SyncOptions,
    summary: &mut KindSummary,
) -> Result<TriggerIdMap> {
    let kind = EntityKind::Trigger;
    let current = store.list(kind, workspace_path)?;
    let current_by_name = index_by_name(&current);
    let mut trigger_ids = TriggerIdMap::from_triggers(&current);

    for entity in effective_entries(desired, kind) {
        let name = display_name(entity);
        match plan(entity, &current_by_name, kind, options) {
            Action::Create => {
                summary.created.push(name.clone());
                if options.dry_run {
                    trigger_ids.record_planned(&name);
                } else {
                    let created = create_entity(store, workspace_path, kind, entity)?;
                    let id = created.id(kind).ok_or_else(|| {
                        Error::protocol(format!(
                            "Created trigger '{}' came back without a triggerId.",
                            name
                        ))
                    })?;
                    trigger_ids.record(&name, id);
                }
            }
            Action::Update(existing) => {
                summary.updated.push(name.clone());
                if !options.dry_run {
                    let updated = update_entity(store, workspace_path, kind, existing, entity)?;
                    if let Some(id) = updated.id(kind) {
                        trigger_ids.record(&name, id);
                    }
                }
            }
            Action::Skip => {
                debug!("Skipping {} '{}'", kind, name);
                summary.skipped.push(name);
            }
        }
    }
    Ok(trigger_ids)
}

fn sync_tags<S: RemoteStore + ?Sized>(
    store: &mut S,
    workspace_path: &str,
    desired: &[Entity],
    trigger_ids: &TriggerIdMap,
    options: SyncOptions,
    summary: &mut KindSummary,
) -> Result<()> {
    let kind = EntityKind::Tag;
    let current = store.list(kind, workspace_path)?;
    let current_by_name = index_by_name(&current);

    for entity in effective_entries(desired, kind) {
        let resolved = resolve_tag_references(entity, trigger_ids)?;
        let name = display_name(&resolved);
        match plan(&resolved, &current_by_name, kind, options) {
            Action::Create => {
                if !has_firing_triggers(&resolved) {
                    return Err(Error::Configuration {
                        message: format!(
                            "Tag '{}' cannot be created without a firing trigger.",
                            name
                        ),
                        hint: Some(format!(
                            "Add {} or {}",
                            TriggerRole::Firing.names_field(),
                            TriggerRole::Firing.ids_field()
                        )),
                    });
                }
                summary.created.push(name);
                if !options.dry_run {
                    create_entity(store, workspace_path, kind, &resolved)?;
                }
            }
            Action::Update(existing) => {
                summary.updated.push(name);
                if !options.dry_run {
                    update_entity(store, workspace_path, kind, existing, &resolved)?;
                }
            }
            Action::Skip => {
                debug!("Skipping {} '{}'", kind, name);
                summary.skipped.push(name);
            }
        }
    }
    Ok(())
}

fn delete_missing<S: RemoteStore + ?Sized>(
    store: &mut S,
    workspace_path: &str,
    desired: &Snapshot,
    options: SyncOptions,
    summary: &mut SyncSummary,
) -> Result<()> {
    for kind in EntityKind::DELETE_ORDER {
        let current = store.list(kind, workspace_path)?;
        let desired_by_name = index_by_name(desired.entities(kind));
        for entity in &current {
            let Some(name) = entity.name() else {
                continue;
            };
            if desired_by_name.get(name).is_some() {
                continue;
            }
            summary.get_mut(kind).deleted.push(name.to_string());
            if !options.dry_run {
                let path = entity_path(entity, workspace_path, kind)?;
                info!("Deleting {} '{}' at {}", kind, name, path);
                store.delete(kind, &path)?;
            }
        }
    }
    Ok(())
}

/// Reconcile the workspace at `workspace_path` with `desired`.
pub fn sync_workspace<S: RemoteStore + ?Sized>(
    store: &mut S,
    workspace_path: &str,
    desired: &Snapshot,
    options: SyncOptions,
) -> Result<SyncSummary> {
    preflight(desired)?;
    info!(
        "Syncing {} (dry run: {}, delete missing: {}, update existing: {})",
        workspace_path, options.dry_run, options.delete_missing, options.update_existing
    );

    let mut summary = SyncSummary::new(workspace_path, options);
    sync_variables(
        store,
        workspace_path,
        &desired.variables,
        options,
        &mut summary.variables,
    )?;
    let trigger_ids = sync_triggers(
        store,
        workspace_path,
        &desired.triggers,
        options,
        &mut summary.triggers,
    )?;
    sync_tags(
        store,
        workspace_path,
        &desired.tags,
        &trigger_ids,
        options,
        &mut summary.tags,
    )?;
    if options.delete_missing {
        delete_missing(store, workspace_path, desired, options, &mut summary)?;
    }

    for kind in EntityKind::UPSERT_ORDER {
        summary.get_mut(kind).finish();
    }
    Ok(summary)
}
