//! Document client state store
//!
//! Caches the signed-in user's document metadata plus the UI state around
//! it: search and type filter, the upload progress slice, and the preview
//! dialog target. Mutations are short, atomic critical sections.

use std::collections::HashMap;

use chrono::Utc;
use domain::filter::text_matches;
use domain::{Document, DocumentPatch, DocumentType};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Default look-ahead for the expiring-documents view, in days
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Default)]
struct DocumentState {
    documents: Vec<Document>,
    loading: bool,
    error: Option<String>,
    search: String,
    type_filter: Option<DocumentType>,
    /// 0-100; while an upload is in flight this is a simulation, not a
    /// measured transfer value
    upload_progress: u8,
    uploading: bool,
    /// Bumped per upload; the delayed reset only applies to its own epoch
    upload_epoch: u64,
    preview: Option<Uuid>,
    upload_dialog_open: bool,
}

/// In-memory cache of the signed-in user's documents plus upload/preview
/// UI state
#[derive(Debug, Default)]
pub struct DocumentStore {
    state: RwLock<DocumentState>,
}

impl DocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything back to the session-start state
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = DocumentState::default();
    }

    // ---- Document slice ----

    pub async fn set_documents(&self, documents: Vec<Document>) {
        self.state.write().await.documents = documents;
    }

    pub async fn documents(&self) -> Vec<Document> {
        self.state.read().await.documents.clone()
    }

    pub async fn document(&self, id: Uuid) -> Option<Document> {
        self.state
            .read()
            .await
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// Newest first: fresh uploads go to the front
    pub async fn add_document(&self, document: Document) {
        self.state.write().await.documents.insert(0, document);
    }

    pub async fn apply_patch(&self, id: Uuid, patch: &DocumentPatch) {
        let now = Utc::now();
        let mut state = self.state.write().await;
        if let Some(document) = state.documents.iter_mut().find(|d| d.id == id) {
            document.apply(patch, now);
        }
    }

    /// Remove a document; the preview is cleared when it pointed at it
    pub async fn remove_document(&self, id: Uuid) {
        let mut state = self.state.write().await;
        state.documents.retain(|d| d.id != id);
        if state.preview == Some(id) {
            state.preview = None;
        }
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

    pub async fn set_search(&self, query: String) {
        self.state.write().await.search = query;
    }

    pub async fn set_type_filter(&self, filter: Option<DocumentType>) {
        self.state.write().await.type_filter = filter;
    }

    pub async fn set_preview(&self, document_id: Option<Uuid>) {
        self.state.write().await.preview = document_id;
    }

    pub async fn preview(&self) -> Option<Uuid> {
        self.state.read().await.preview
    }

    pub async fn set_upload_dialog_open(&self, open: bool) {
        self.state.write().await.upload_dialog_open = open;
    }

    pub async fn is_upload_dialog_open(&self) -> bool {
        self.state.read().await.upload_dialog_open
    }

    // ---- Upload progress slice ----

    /// Start a new upload epoch; the returned token scopes the eventual
    /// [`Self::finish_upload_if`]
    pub async fn begin_upload(&self) -> u64 {
        let mut state = self.state.write().await;
        state.uploading = true;
        state.upload_progress = 0;
        state.upload_epoch += 1;
        state.upload_epoch
    }

    /// Progress only moves forward while an upload is in flight
    pub async fn set_upload_progress(&self, progress: u8) {
        let mut state = self.state.write().await;
        if state.uploading {
            state.upload_progress = state.upload_progress.max(progress.min(100));
        }
    }

    pub async fn upload_progress(&self) -> u8 {
        self.state.read().await.upload_progress
    }

    pub async fn finish_upload(&self) {
        let mut state = self.state.write().await;
        state.uploading = false;
        state.upload_progress = 0;
    }

    /// Reset the upload slice only if no newer upload has begun since
    /// `epoch` was handed out
    pub async fn finish_upload_if(&self, epoch: u64) {
        let mut state = self.state.write().await;
        if state.upload_epoch == epoch {
            state.uploading = false;
            state.upload_progress = 0;
        }
    }

    pub async fn is_uploading(&self) -> bool {
        self.state.read().await.uploading
    }

    // ---- Derived views ----

    /// Documents passing the type filter AND the search query
    ///
    /// Search matches title, notes, document number, and the type label,
    /// case-insensitively; an empty query passes everything.
    pub async fn filtered_documents(&self) -> Vec<Document> {
        let state = self.state.read().await;
        state
            .documents
            .iter()
            .filter(|d| match state.type_filter {
                Some(t) => d.document_type == t,
                None => true,
            })
            .filter(|d| {
                text_matches(
                    &state.search,
                    [d.title.as_str(), d.document_type.label()]
                        .into_iter()
                        .chain(d.notes.as_deref())
                        .chain(d.document_number.as_deref()),
                )
            })
            .cloned()
            .collect()
    }

    /// Documents grouped by type, group members in list order
    pub async fn documents_by_type(&self) -> HashMap<DocumentType, Vec<Document>> {
        let state = self.state.read().await;
        let mut groups: HashMap<DocumentType, Vec<Document>> = HashMap::new();
        for document in &state.documents {
            groups
                .entry(document.document_type)
                .or_default()
                .push(document.clone());
        }
        groups
    }

    /// Documents expiring within the next `days` days, soonest first
    ///
    /// The window is `[today, today + days]` inclusive; documents without
    /// an expiry date are excluded.
    pub async fn expiring_documents(&self, days: i64) -> Vec<Document> {
        let today = Utc::now().date_naive();
        let state = self.state.read().await;
        let mut expiring: Vec<Document> = state
            .documents
            .iter()
            .filter(|d| d.expires_within(days, today))
            .cloned()
            .collect();
        expiring.sort_by_key(|d| d.expiry_date);
        expiring
    }

    /// [`Self::expiring_documents`] with the default 30-day window
    pub async fn expiring_soon(&self) -> Vec<Document> {
        self.expiring_documents(DEFAULT_EXPIRY_WINDOW_DAYS).await
    }

    /// The distinct document types currently present, in order of first
    /// appearance
    pub async fn present_types(&self) -> Vec<DocumentType> {
        let state = self.state.read().await;
        let mut types = Vec::new();
        for document in &state.documents {
            if !types.contains(&document.document_type) {
                types.push(document.document_type);
            }
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn document(title: &str, document_type: DocumentType, expiry_days: Option<i64>) -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            document_type,
            title: title.to_string(),
            storage_path: format!("user/{}.pdf", title.to_lowercase().replace(' ', "-")),
            file_size: None,
            mime_type: Some("application/pdf".to_string()),
            thumbnail_path: None,
            document_number: None,
            issue_date: None,
            expiry_date: expiry_days.map(|d| now.date_naive() + Duration::days(d)),
            notes: None,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_expiring_window_end_to_end() {
        let store = DocumentStore::new();
        let d1 = document("Visa", DocumentType::Visa, Some(5));
        let d2 = document("I-20", DocumentType::I20, Some(60));
        let d1_id = d1.id;
        store.set_documents(vec![d1, d2]).await;

        let expiring = store.expiring_documents(30).await;
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, d1_id);
    }

    #[tokio::test]
    async fn test_documents_without_expiry_never_expire() {
        let store = DocumentStore::new();
        store
            .set_documents(vec![document("Transcript", DocumentType::Transcript, None)])
            .await;
        assert!(store.expiring_documents(365).await.is_empty());
    }

    #[tokio::test]
    async fn test_filter_combines_type_and_search() {
        let store = DocumentStore::new();
        store
            .set_documents(vec![
                document("Passport biodata page", DocumentType::Passport, None),
                document("F-1 visa stamp", DocumentType::Visa, None),
                document("Old passport", DocumentType::Passport, None),
            ])
            .await;

        store.set_type_filter(Some(DocumentType::Passport)).await;
        store.set_search("OLD".to_string()).await;

        let filtered = store.filtered_documents().await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Old passport");
    }

    #[tokio::test]
    async fn test_search_matches_type_label() {
        let store = DocumentStore::new();
        store
            .set_documents(vec![document("SEVIS form", DocumentType::I20, None)])
            .await;

        store.set_search("i-20".to_string()).await;
        assert_eq!(store.filtered_documents().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_clears_matching_preview() {
        let store = DocumentStore::new();
        let doc = document("EAD card", DocumentType::Ead, None);
        let id = doc.id;
        store.set_documents(vec![doc]).await;
        store.set_preview(Some(id)).await;

        store.remove_document(id).await;
        assert_eq!(store.preview().await, None);
        assert!(store.documents().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_keeps_unrelated_preview() {
        let store = DocumentStore::new();
        let keep = document("Passport", DocumentType::Passport, None);
        let gone = document("Old visa", DocumentType::Visa, None);
        let keep_id = keep.id;
        let gone_id = gone.id;
        store.set_documents(vec![keep, gone]).await;
        store.set_preview(Some(keep_id)).await;

        store.remove_document(gone_id).await;
        assert_eq!(store.preview().await, Some(keep_id));
    }

    #[tokio::test]
    async fn test_grouping_and_present_types() {
        let store = DocumentStore::new();
        store
            .set_documents(vec![
                document("Passport", DocumentType::Passport, None),
                document("Visa", DocumentType::Visa, None),
                document("Old passport", DocumentType::Passport, None),
            ])
            .await;

        let groups = store.documents_by_type().await;
        assert_eq!(groups[&DocumentType::Passport].len(), 2);
        assert_eq!(groups[&DocumentType::Visa].len(), 1);

        assert_eq!(
            store.present_types().await,
            vec![DocumentType::Passport, DocumentType::Visa]
        );
    }

    #[tokio::test]
    async fn test_upload_progress_is_monotonic_and_gated() {
        let store = DocumentStore::new();

        // Not uploading: progress updates are ignored.
        store.set_upload_progress(50).await;
        assert_eq!(store.upload_progress().await, 0);

        store.begin_upload().await;
        store.set_upload_progress(30).await;
        store.set_upload_progress(10).await;
        assert_eq!(store.upload_progress().await, 30);

        store.finish_upload().await;
        assert_eq!(store.upload_progress().await, 0);
        assert!(!store.is_uploading().await);
    }
}
