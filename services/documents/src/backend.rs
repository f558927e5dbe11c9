//! Remote backend seam for document data
//!
//! Deletion is split into its two remote resources (metadata row and
//! storage object) so the service can enforce the ordering policy: the
//! row goes first, and a storage failure after a successful row delete is
//! surfaced without rolling the row back.

use async_trait::async_trait;
use common::error::StoreResult;
use domain::{Document, DocumentPatch, NewDocument, UploadFile};
use uuid::Uuid;

/// Remote operations for document metadata and the storage bucket
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Fetch every document owned by a user
    async fn fetch_owned_documents(&self, user_id: Uuid) -> StoreResult<Vec<Document>>;

    /// Store the file and create its metadata row; returns the
    /// server-canonical row (id, storage path, timestamps)
    async fn upload_document(
        &self,
        user_id: Uuid,
        file: UploadFile,
        metadata: NewDocument,
    ) -> StoreResult<Document>;

    /// Apply a partial update to a metadata row
    async fn update_document(&self, id: Uuid, patch: DocumentPatch) -> StoreResult<()>;

    /// Delete a metadata row
    async fn delete_document(&self, id: Uuid) -> StoreResult<()>;

    /// Delete a stored object by its path
    async fn delete_object(&self, storage_path: &str) -> StoreResult<()>;

    /// Produce a time-limited access URL for a stored object
    async fn signed_url(&self, storage_path: &str) -> StoreResult<String>;
}
