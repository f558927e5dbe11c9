//! Data-bound checklist orchestration
//!
//! Bridges the [`ChecklistStore`] to the remote backend and the identity
//! channel. Reads populate the store when a user signs in; a generation
//! counter discards responses that resolve after the identity they were
//! issued for has been superseded. Mutations are optimistic: they apply
//! to the store first, confirm against the backend, and roll back on
//! failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use common::error::{StoreError, StoreResult};
use common::identity::IdentityWatcher;
use common::optimistic::with_rollback;
use domain::progress::progress_of;
use domain::validation::validate_title;
use domain::{
    ChecklistItem, ChecklistItemPatch, ChecklistPatch, ChecklistStatus, NewChecklist,
    NewChecklistItem, UserChecklist,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::backend::ChecklistBackend;
use crate::store::ChecklistStore;

/// Orchestrates checklist state against the remote backend
pub struct ChecklistService<B> {
    store: Arc<ChecklistStore>,
    backend: Arc<B>,
    identity: IdentityWatcher,
    /// Bumped on every fetch and identity transition; stale responses
    /// compare against it and are dropped
    generation: AtomicU64,
}

impl<B: ChecklistBackend> ChecklistService<B> {
    /// Create a new checklist service
    pub fn new(store: Arc<ChecklistStore>, backend: Arc<B>, identity: IdentityWatcher) -> Self {
        Self {
            store,
            backend,
            identity,
            generation: AtomicU64::new(0),
        }
    }

    /// The store this service populates
    pub fn store(&self) -> &Arc<ChecklistStore> {
        &self.store
    }

    /// The signed-in user, or fail fast before any remote call
    fn current_user(&self) -> StoreResult<Uuid> {
        self.identity.current_user().ok_or(StoreError::AuthRequired)
    }

    /// Reconcile the store with the current identity once
    ///
    /// Signed in: populate the template catalog (fetch-once) and the
    /// user's checklists. Signed out: clear the store.
    pub async fn sync_identity(&self) {
        match self.identity.current_user() {
            Some(user_id) => {
                if let Err(err) = self.ensure_templates().await {
                    error!("Failed to fetch template catalog: {}", err);
                }
                if let Err(err) = self.refresh(user_id).await {
                    error!("Failed to fetch checklists: {}", err);
                }
            }
            None => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                self.store.reset().await;
            }
        }
    }

    /// React to identity transitions until the auth layer goes away
    pub async fn watch(&self) {
        let mut identity = self.identity.clone();
        loop {
            self.sync_identity().await;
            if !identity.wait().await {
                break;
            }
        }
    }

    /// Fetch the user's checklists, guarding against superseded responses
    pub async fn refresh(&self, user_id: Uuid) -> StoreResult<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.store.set_loading(true).await;
        info!("Fetching checklists for user {}", user_id);

        let result = self.backend.fetch_owned_checklists(user_id).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            info!("Discarding superseded checklist fetch for user {}", user_id);
            return Ok(());
        }
        self.store.set_loading(false).await;

        // A failed read leaves the previous state in place; no retry.
        let checklists = result?;
        self.store.set_checklists(checklists).await;
        Ok(())
    }

    /// Fetch the template catalog unless the store already holds it
    pub async fn ensure_templates(&self) -> StoreResult<()> {
        if self.store.has_templates().await {
            return Ok(());
        }
        let templates = self.backend.fetch_templates().await?;
        self.store.set_templates(templates).await;
        Ok(())
    }

    /// Create a checklist optimistically
    ///
    /// A local placeholder appears immediately and is swapped for the
    /// server-canonical row on success, or removed on failure.
    pub async fn create_checklist(&self, new: NewChecklist) -> StoreResult<UserChecklist> {
        let user_id = self.current_user()?;
        validate_title(&new.title).map_err(StoreError::Validation)?;

        let now = Utc::now();
        let placeholder = UserChecklist {
            id: Uuid::new_v4(),
            user_id,
            title: new.title.clone(),
            description: new.description.clone(),
            category: new.category,
            color: new.color,
            icon: new.icon.clone(),
            status: ChecklistStatus::Active,
            template_id: new.template_id,
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        };
        let placeholder_id = placeholder.id;

        let snapshot = self.store.checklists().await;
        self.store.add_checklist(placeholder).await;

        let result = with_rollback(
            snapshot,
            self.backend.create_checklist(user_id, new),
            |snap| async move { self.store.set_checklists(snap).await },
        )
        .await;

        match result {
            Ok(canonical) => {
                self.store
                    .replace_checklist(placeholder_id, canonical.clone())
                    .await;
                Ok(canonical)
            }
            Err(err) => self.surface(err).await,
        }
    }

    /// Create a checklist seeded from a catalog template
    ///
    /// Two remote writes (checklist row, then its items); the store is
    /// populated only with what the backend confirmed, so a failure in
    /// the item batch still leaves local and remote state in agreement.
    pub async fn adopt_template(&self, template_id: Uuid) -> StoreResult<UserChecklist> {
        let user_id = self.current_user()?;
        let template = self
            .store
            .template(template_id)
            .await
            .ok_or(StoreError::NotFound("template", template_id))?;

        let sort_order = self.store.checklists().await.len() as i32;
        let new = template.to_new_checklist(sort_order);
        info!("Adopting template {} for user {}", template_id, user_id);

        let mut checklist = match self.backend.create_checklist(user_id, new).await {
            Ok(checklist) => checklist,
            Err(err) => return self.surface(err).await,
        };

        let item_inputs: Vec<NewChecklistItem> = template
            .items
            .iter()
            .map(|item| NewChecklistItem {
                checklist_id: checklist.id,
                title: item.title.clone(),
                description: item.description.clone(),
                priority: item.priority,
                due_date: None,
                sort_order: item.sort_order,
            })
            .collect();

        match self.backend.create_items(item_inputs).await {
            Ok(items) => {
                checklist.items = items;
                self.store.add_checklist(checklist.clone()).await;
                Ok(checklist)
            }
            Err(err) => {
                // The checklist row exists remotely; keep it locally too.
                self.store.add_checklist(checklist).await;
                self.surface(err).await
            }
        }
    }

    /// Update a checklist optimistically
    pub async fn update_checklist(&self, id: Uuid, patch: ChecklistPatch) -> StoreResult<()> {
        self.current_user()?;
        if let Some(title) = &patch.title {
            validate_title(title).map_err(StoreError::Validation)?;
        }
        if self.store.checklist(id).await.is_none() {
            return Err(StoreError::NotFound("checklist", id));
        }

        let snapshot = self.store.checklists().await;
        self.store.apply_checklist_patch(id, &patch).await;

        let result = with_rollback(
            snapshot,
            self.backend.update_checklist(id, patch),
            |snap| async move { self.store.set_checklists(snap).await },
        )
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(err) => self.surface(err).await,
        }
    }

    /// Delete a checklist optimistically
    pub async fn delete_checklist(&self, id: Uuid) -> StoreResult<()> {
        self.current_user()?;
        if self.store.checklist(id).await.is_none() {
            return Err(StoreError::NotFound("checklist", id));
        }

        let snapshot = self.store.checklists().await;
        self.store.remove_checklist(id).await;

        let result = with_rollback(
            snapshot,
            self.backend.delete_checklist(id),
            |snap| async move { self.store.set_checklists(snap).await },
        )
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(err) => self.surface(err).await,
        }
    }

    /// Create an item optimistically
    pub async fn create_item(&self, new: NewChecklistItem) -> StoreResult<ChecklistItem> {
        self.current_user()?;
        validate_title(&new.title).map_err(StoreError::Validation)?;
        if self.store.checklist(new.checklist_id).await.is_none() {
            return Err(StoreError::NotFound("checklist", new.checklist_id));
        }

        let now = Utc::now();
        let placeholder = ChecklistItem {
            id: Uuid::new_v4(),
            checklist_id: new.checklist_id,
            title: new.title.clone(),
            description: new.description.clone(),
            priority: new.priority,
            due_date: new.due_date,
            completed: false,
            completed_at: None,
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        };
        let placeholder_id = placeholder.id;
        let checklist_id = new.checklist_id;

        let snapshot = self.store.checklists().await;
        self.store.add_item(checklist_id, placeholder).await;

        let result = with_rollback(snapshot, self.backend.create_item(new), |snap| async move {
            self.store.set_checklists(snap).await
        })
        .await;

        match result {
            Ok(canonical) => {
                self.store
                    .replace_item(placeholder_id, canonical.clone())
                    .await;
                Ok(canonical)
            }
            Err(err) => self.surface(err).await,
        }
    }

    /// Update an item optimistically
    ///
    /// Completion changes also apply the status/progress rule: completing
    /// the last incomplete item moves the checklist to `Completed`, and
    /// un-completing an item of a `Completed` checklist moves it back to
    /// `Active`. `Archived` checklists are never auto-changed. The item
    /// write and the follow-up status write roll back independently: once
    /// the item write has committed remotely, a failed status write only
    /// reverts the local status, keeping both sides in agreement.
    pub async fn update_item(&self, item_id: Uuid, patch: ChecklistItemPatch) -> StoreResult<()> {
        self.current_user()?;
        if let Some(title) = &patch.title {
            validate_title(title).map_err(StoreError::Validation)?;
        }
        let checklist_id = self
            .store
            .checklist_of_item(item_id)
            .await
            .ok_or(StoreError::NotFound("item", item_id))?;

        let toggles_completion = patch.completed.is_some();
        let snapshot = self.store.checklists().await;
        self.store.apply_item_patch(item_id, &patch).await;

        let result = with_rollback(
            snapshot,
            self.backend.update_item(item_id, patch),
            |snap| async move { self.store.set_checklists(snap).await },
        )
        .await;
        if let Err(err) = result {
            return self.surface(err).await;
        }

        if toggles_completion {
            if let Some(status_patch) = self.status_transition(checklist_id).await {
                let snapshot = self.store.checklists().await;
                self.store
                    .apply_checklist_patch(checklist_id, &status_patch)
                    .await;

                let result = with_rollback(
                    snapshot,
                    self.backend.update_checklist(checklist_id, status_patch),
                    |snap| async move { self.store.set_checklists(snap).await },
                )
                .await;
                if let Err(err) = result {
                    return self.surface(err).await;
                }
            }
        }

        Ok(())
    }

    /// Toggle an item's completion flag
    pub async fn set_item_completed(&self, item_id: Uuid, completed: bool) -> StoreResult<()> {
        self.update_item(item_id, ChecklistItemPatch::completion(completed, Utc::now()))
            .await
    }

    /// Delete an item optimistically
    pub async fn delete_item(&self, item_id: Uuid) -> StoreResult<()> {
        self.current_user()?;
        if self.store.checklist_of_item(item_id).await.is_none() {
            return Err(StoreError::NotFound("item", item_id));
        }

        let snapshot = self.store.checklists().await;
        self.store.remove_item(item_id).await;

        let result = with_rollback(
            snapshot,
            self.backend.delete_item(item_id),
            |snap| async move { self.store.set_checklists(snap).await },
        )
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(err) => self.surface(err).await,
        }
    }

    /// The status patch required by the status/progress rule, if any,
    /// evaluated against the already-updated local state
    async fn status_transition(&self, checklist_id: Uuid) -> Option<ChecklistPatch> {
        let checklist = self.store.checklist(checklist_id).await?;
        let progress = progress_of(&checklist.items);
        let fully_complete = progress.total > 0 && progress.completed == progress.total;

        match checklist.status {
            ChecklistStatus::Active if fully_complete => {
                Some(ChecklistPatch::status(ChecklistStatus::Completed))
            }
            ChecklistStatus::Completed if !fully_complete => {
                Some(ChecklistPatch::status(ChecklistStatus::Active))
            }
            _ => None,
        }
    }

    /// Record a user-facing error message and pass the error through
    async fn surface<T>(&self, err: StoreError) -> StoreResult<T> {
        self.store.set_error(Some(err.to_string())).await;
        Err(err)
    }
}
