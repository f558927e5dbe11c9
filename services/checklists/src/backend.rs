//! Remote backend seam for checklist data
//!
//! The service is generic over this trait; production uses the hosted
//! REST adapter, tests use an in-memory mock.

use async_trait::async_trait;
use common::error::StoreResult;
use domain::{
    ChecklistItem, ChecklistItemPatch, ChecklistPatch, ChecklistTemplate, NewChecklist,
    NewChecklistItem, UserChecklist,
};
use uuid::Uuid;

/// Remote operations for checklists, items, and the template catalog
#[async_trait]
pub trait ChecklistBackend: Send + Sync {
    /// Fetch every checklist owned by a user, items embedded
    async fn fetch_owned_checklists(&self, user_id: Uuid) -> StoreResult<Vec<UserChecklist>>;

    /// Fetch the read-only template catalog
    async fn fetch_templates(&self) -> StoreResult<Vec<ChecklistTemplate>>;

    /// Create a checklist; returns the server-canonical row
    async fn create_checklist(
        &self,
        user_id: Uuid,
        new: NewChecklist,
    ) -> StoreResult<UserChecklist>;

    /// Apply a partial update to a checklist
    async fn update_checklist(&self, id: Uuid, patch: ChecklistPatch) -> StoreResult<()>;

    /// Delete a checklist and, server-side, its owned items
    async fn delete_checklist(&self, id: Uuid) -> StoreResult<()>;

    /// Create a single item; returns the server-canonical row
    async fn create_item(&self, new: NewChecklistItem) -> StoreResult<ChecklistItem>;

    /// Create a batch of items in one call (template adoption)
    async fn create_items(&self, items: Vec<NewChecklistItem>) -> StoreResult<Vec<ChecklistItem>>;

    /// Apply a partial update to an item
    async fn update_item(&self, id: Uuid, patch: ChecklistItemPatch) -> StoreResult<()>;

    /// Delete an item
    async fn delete_item(&self, id: Uuid) -> StoreResult<()>;
}
