//! Data-bound document orchestration
//!
//! Bridges the [`DocumentStore`] to the remote backend and the identity
//! channel. Reads populate the store on sign-in with a generation guard
//! against superseded responses; update and delete are optimistic with
//! rollback; upload drives the simulated progress slice.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use common::error::{StoreError, StoreResult};
use common::identity::IdentityWatcher;
use common::optimistic::with_rollback;
use domain::validation::{validate_date_order, validate_document_number, validate_title};
use domain::{Document, DocumentPatch, NewDocument, UploadFile};
use tracing::{error, info};
use uuid::Uuid;

use crate::backend::DocumentBackend;
use crate::store::DocumentStore;

/// Simulated progress tick while an upload request is in flight
const UPLOAD_TICK: Duration = Duration::from_millis(200);
/// Simulated progress step per tick; stops at [`UPLOAD_CEILING`]
const UPLOAD_STEP: u8 = 10;
/// The simulation never claims more than this before the request returns
const UPLOAD_CEILING: u8 = 90;
/// How long the completed progress bar stays visible before resetting
const UPLOAD_RESET_DELAY: Duration = Duration::from_millis(600);

/// Orchestrates document state against the remote backend
pub struct DocumentService<B> {
    store: Arc<DocumentStore>,
    backend: Arc<B>,
    identity: IdentityWatcher,
    /// Bumped on every fetch and identity transition; stale responses
    /// compare against it and are dropped
    generation: AtomicU64,
}

impl<B: DocumentBackend + 'static> DocumentService<B> {
    /// Create a new document service
    pub fn new(store: Arc<DocumentStore>, backend: Arc<B>, identity: IdentityWatcher) -> Self {
        Self {
            store,
            backend,
            identity,
            generation: AtomicU64::new(0),
        }
    }

    /// The store this service populates
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// The signed-in user, or fail fast before any remote call
    fn current_user(&self) -> StoreResult<Uuid> {
        self.identity.current_user().ok_or(StoreError::AuthRequired)
    }

    /// Reconcile the store with the current identity once
    pub async fn sync_identity(&self) {
        match self.identity.current_user() {
            Some(user_id) => {
                if let Err(err) = self.refresh(user_id).await {
                    error!("Failed to fetch documents: {}", err);
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

    /// Fetch the user's documents, guarding against superseded responses
    pub async fn refresh(&self, user_id: Uuid) -> StoreResult<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.store.set_loading(true).await;
        info!("Fetching documents for user {}", user_id);

        let result = self.backend.fetch_owned_documents(user_id).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            info!("Discarding superseded document fetch for user {}", user_id);
            return Ok(());
        }
        self.store.set_loading(false).await;

        // A failed read leaves the previous state in place; no retry.
        let documents = result?;
        self.store.set_documents(documents).await;
        Ok(())
    }

    /// Upload a file with its metadata
    ///
    /// While the request is in flight a ticker advances the store's
    /// progress slice toward [`UPLOAD_CEILING`] — an explicit simulation,
    /// since the backend reports no transfer progress. On success progress
    /// jumps to 100, the canonical row is prepended to the store, and the
    /// slice resets after [`UPLOAD_RESET_DELAY`]. On failure the store is
    /// left unpopulated.
    pub async fn upload(&self, file: UploadFile, metadata: NewDocument) -> StoreResult<Document> {
        let user_id = self.current_user()?;
        self.validate_metadata(&metadata)?;

        info!("Uploading document '{}' for user {}", metadata.title, user_id);
        let epoch = self.store.begin_upload().await;

        let ticker = {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(UPLOAD_TICK);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    let next = store.upload_progress().await.saturating_add(UPLOAD_STEP);
                    store.set_upload_progress(next.min(UPLOAD_CEILING)).await;
                }
            })
        };

        let result = self.backend.upload_document(user_id, file, metadata).await;
        ticker.abort();

        match result {
            Ok(document) => {
                self.store.set_upload_progress(100).await;
                self.store.add_document(document.clone()).await;

                // Let the full bar be perceptible before clearing it. The
                // epoch check keeps the delayed reset from clobbering an
                // upload started inside the window.
                let store = Arc::clone(&self.store);
                tokio::spawn(async move {
                    tokio::time::sleep(UPLOAD_RESET_DELAY).await;
                    store.finish_upload_if(epoch).await;
                });

                Ok(document)
            }
            Err(err) => {
                self.store.finish_upload_if(epoch).await;
                self.surface(err).await
            }
        }
    }

    /// Update a document optimistically
    pub async fn update(&self, id: Uuid, patch: DocumentPatch) -> StoreResult<()> {
        self.current_user()?;
        let existing = self
            .store
            .document(id)
            .await
            .ok_or(StoreError::NotFound("document", id))?;
        self.validate_patch(&existing, &patch)?;

        let snapshot = self.store.documents().await;
        self.store.apply_patch(id, &patch).await;

        let result = with_rollback(
            snapshot,
            self.backend.update_document(id, patch),
            |snap| async move { self.store.set_documents(snap).await },
        )
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(err) => self.surface(err).await,
        }
    }

    /// Delete a document optimistically
    ///
    /// The metadata row is deleted first and rolled back on failure. The
    /// storage object is removed only after the row delete succeeded; a
    /// failure at that point is surfaced but the row stays deleted — the
    /// orphaned object is left to a backend-side sweep.
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.current_user()?;
        let document = self
            .store
            .document(id)
            .await
            .ok_or(StoreError::NotFound("document", id))?;

        let snapshot = (self.store.documents().await, self.store.preview().await);
        self.store.remove_document(id).await;

        let result = with_rollback(
            snapshot,
            self.backend.delete_document(id),
            |(documents, preview)| async move {
                self.store.set_documents(documents).await;
                self.store.set_preview(preview).await;
            },
        )
        .await;

        match result {
            Ok(()) => {
                if let Err(err) = self.backend.delete_object(&document.storage_path).await {
                    error!(
                        "Stored object {} was not removed after row delete: {}",
                        document.storage_path, err
                    );
                    return self.surface(err).await;
                }
                Ok(())
            }
            Err(err) => self.surface(err).await,
        }
    }

    /// A time-limited access URL for viewing or downloading a document
    pub async fn signed_url(&self, id: Uuid) -> StoreResult<String> {
        self.current_user()?;
        let document = self
            .store
            .document(id)
            .await
            .ok_or(StoreError::NotFound("document", id))?;
        self.backend.signed_url(&document.storage_path).await
    }

    fn validate_metadata(&self, metadata: &NewDocument) -> StoreResult<()> {
        validate_title(&metadata.title).map_err(StoreError::Validation)?;
        if let Some(number) = &metadata.document_number {
            validate_document_number(number).map_err(StoreError::Validation)?;
        }
        validate_date_order(metadata.issue_date, metadata.expiry_date)
            .map_err(StoreError::Validation)
    }

    fn validate_patch(&self, existing: &Document, patch: &DocumentPatch) -> StoreResult<()> {
        if let Some(title) = &patch.title {
            validate_title(title).map_err(StoreError::Validation)?;
        }
        if let Some(number) = &patch.document_number {
            validate_document_number(number).map_err(StoreError::Validation)?;
        }
        // Date ordering holds for the merged row, not just the patch.
        validate_date_order(
            patch.issue_date.or(existing.issue_date),
            patch.expiry_date.or(existing.expiry_date),
        )
        .map_err(StoreError::Validation)
    }

    /// Record a user-facing error message and pass the error through
    async fn surface<T>(&self, err: StoreError) -> StoreResult<T> {
        self.store.set_error(Some(err.to_string())).await;
        Err(err)
    }
}
