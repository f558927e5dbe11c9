//! Checklist client state store
//!
//! An explicitly constructed state container; callers share it through an
//! `Arc` and every consumer reads derived views through the getters.
//! Mutations are short, atomic critical sections; nothing here performs
//! remote I/O.

use common::error::StoreResult;
use domain::progress::{progress_of, progress_of_all};
use domain::{
    ChecklistFilter, ChecklistItem, ChecklistItemPatch, ChecklistPatch, ChecklistProgress,
    ChecklistTemplate, UserChecklist,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct ChecklistState {
    checklists: Vec<UserChecklist>,
    templates: Vec<ChecklistTemplate>,
    selected: Option<Uuid>,
    filter: ChecklistFilter,
    loading: bool,
    error: Option<String>,
}

/// In-memory cache of the signed-in user's checklists and the template
/// catalog, plus transient UI state
#[derive(Debug, Default)]
pub struct ChecklistStore {
    state: RwLock<ChecklistState>,
}

impl ChecklistStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything back to the session-start state
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = ChecklistState::default();
    }

    // ---- UI flags ----

    pub async fn set_loading(&self, loading: bool) {
        self.state.write().await.loading = loading;
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn set_error(&self, message: Option<String>) {
        self.state.write().await.error = message;
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn select(&self, checklist_id: Option<Uuid>) {
        self.state.write().await.selected = checklist_id;
    }

    pub async fn selected(&self) -> Option<Uuid> {
        self.state.read().await.selected
    }

    pub async fn set_filter(&self, filter: ChecklistFilter) {
        self.state.write().await.filter = filter;
    }

    pub async fn filter(&self) -> ChecklistFilter {
        self.state.read().await.filter.clone()
    }

    // ---- Checklist slice ----

    pub async fn set_checklists(&self, checklists: Vec<UserChecklist>) {
        self.state.write().await.checklists = checklists;
    }

    pub async fn checklists(&self) -> Vec<UserChecklist> {
        self.state.read().await.checklists.clone()
    }

    pub async fn checklist(&self, id: Uuid) -> Option<UserChecklist> {
        self.state
            .read()
            .await
            .checklists
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    pub async fn add_checklist(&self, checklist: UserChecklist) {
        self.state.write().await.checklists.push(checklist);
    }

    /// Swap the checklist with id `old_id` for the server-canonical row
    pub async fn replace_checklist(&self, old_id: Uuid, canonical: UserChecklist) {
        let mut state = self.state.write().await;
        if let Some(slot) = state.checklists.iter_mut().find(|c| c.id == old_id) {
            *slot = canonical;
        }
    }

    pub async fn apply_checklist_patch(&self, id: Uuid, patch: &ChecklistPatch) {
        let now = chrono::Utc::now();
        let mut state = self.state.write().await;
        if let Some(checklist) = state.checklists.iter_mut().find(|c| c.id == id) {
            checklist.apply(patch, now);
        }
    }

    pub async fn remove_checklist(&self, id: Uuid) {
        let mut state = self.state.write().await;
        state.checklists.retain(|c| c.id != id);
        if state.selected == Some(id) {
            state.selected = None;
        }
    }

    // ---- Template slice ----

    /// Fetch-once guard: the service skips the catalog call when this is true
    pub async fn has_templates(&self) -> bool {
        !self.state.read().await.templates.is_empty()
    }

    pub async fn set_templates(&self, templates: Vec<ChecklistTemplate>) {
        self.state.write().await.templates = templates;
    }

    pub async fn templates(&self) -> Vec<ChecklistTemplate> {
        self.state.read().await.templates.clone()
    }

    pub async fn template(&self, id: Uuid) -> Option<ChecklistTemplate> {
        self.state
            .read()
            .await
            .templates
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    // ---- Item slice ----

    /// The checklist an item currently lives in
    pub async fn checklist_of_item(&self, item_id: Uuid) -> Option<Uuid> {
        self.state
            .read()
            .await
            .checklists
            .iter()
            .find(|c| c.items.iter().any(|i| i.id == item_id))
            .map(|c| c.id)
    }

    pub async fn item(&self, item_id: Uuid) -> Option<ChecklistItem> {
        self.state
            .read()
            .await
            .checklists
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|i| i.id == item_id)
            .cloned()
    }

    pub async fn add_item(&self, checklist_id: Uuid, item: ChecklistItem) {
        let mut state = self.state.write().await;
        if let Some(checklist) = state.checklists.iter_mut().find(|c| c.id == checklist_id) {
            checklist.items.push(item);
        }
    }

    /// Swap the item with id `old_id` for the server-canonical row
    pub async fn replace_item(&self, old_id: Uuid, canonical: ChecklistItem) {
        let mut state = self.state.write().await;
        for checklist in state.checklists.iter_mut() {
            if let Some(slot) = checklist.items.iter_mut().find(|i| i.id == old_id) {
                *slot = canonical;
                return;
            }
        }
    }

    pub async fn apply_item_patch(&self, item_id: Uuid, patch: &ChecklistItemPatch) {
        let now = chrono::Utc::now();
        let mut state = self.state.write().await;
        for checklist in state.checklists.iter_mut() {
            if let Some(item) = checklist.items.iter_mut().find(|i| i.id == item_id) {
                item.apply(patch, now);
                return;
            }
        }
    }

    pub async fn remove_item(&self, item_id: Uuid) {
        let mut state = self.state.write().await;
        for checklist in state.checklists.iter_mut() {
            checklist.items.retain(|i| i.id != item_id);
        }
    }

    // ---- Derived views ----

    /// Checklists passing the current filter, order preserved
    pub async fn filtered_checklists(&self) -> Vec<UserChecklist> {
        let state = self.state.read().await;
        state.filter.filter_checklists(&state.checklists)
    }

    /// Items of one checklist passing the current filter, order preserved
    pub async fn filtered_items(&self, checklist_id: Uuid) -> Vec<ChecklistItem> {
        let state = self.state.read().await;
        state
            .checklists
            .iter()
            .find(|c| c.id == checklist_id)
            .map(|c| state.filter.filter_items(&c.items))
            .unwrap_or_default()
    }

    /// Progress of one checklist, or an error if it is unknown
    pub async fn progress(&self, checklist_id: Uuid) -> StoreResult<ChecklistProgress> {
        let state = self.state.read().await;
        state
            .checklists
            .iter()
            .find(|c| c.id == checklist_id)
            .map(|c| progress_of(&c.items))
            .ok_or(common::error::StoreError::NotFound(
                "checklist",
                checklist_id,
            ))
    }

    /// Aggregate progress across every item of every checklist
    pub async fn overall_progress(&self) -> ChecklistProgress {
        let state = self.state.read().await;
        progress_of_all(&state.checklists)
    }
}
