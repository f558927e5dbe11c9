//! Hosted-backend REST adapter
//!
//! Speaks PostgREST for the `user_checklists`, `checklist_items`,
//! `checklist_templates`, and `documents` tables, and the storage object
//! API for file upload, deletion, and signed URLs. Create calls use
//! `Prefer: return=representation` so the server-canonical row flows back
//! to the stores; updates and deletes use `return=minimal`.

use async_trait::async_trait;
use common::config::BackendConfig;
use common::error::StoreResult;
use domain::{
    ChecklistItem, ChecklistItemPatch, ChecklistPatch, ChecklistTemplate, Document, DocumentPatch,
    NewChecklist, NewChecklistItem, NewDocument, UploadFile, UserChecklist,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use checklists::ChecklistBackend;
use documents::DocumentBackend;

use crate::error::{RemoteError, RemoteResult};

/// REST client for the hosted database/storage service
#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    config: BackendConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl SupabaseBackend {
    /// Create a new adapter from configuration
    pub fn new(config: BackendConfig) -> RemoteResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        info!("Hosted backend adapter initialized for {}", config.base_url);
        Ok(Self { config, http })
    }

    // ---- URL and request plumbing ----

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    fn object_url(&self, storage_path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url, self.config.documents_bucket, storage_path
        )
    }

    fn sign_request_url(&self, storage_path: &str) -> String {
        format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.config.base_url, self.config.documents_bucket, storage_path
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.anon_key))
    }

    async fn checked(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        let body = Self::checked(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Merge extra columns into a serialized row body
    fn with_columns(mut body: Value, extra: Vec<(&str, Value)>) -> Value {
        if let Value::Object(map) = &mut body {
            for (key, value) in extra {
                map.insert(key.to_string(), value);
            }
        }
        body
    }

    /// Object key for a fresh upload: user prefix plus a unique, sanitized
    /// file name
    fn object_path_for(user_id: Uuid, file_name: &str) -> String {
        format!("{}/{}-{}", user_id, Uuid::new_v4(), sanitize_file_name(file_name))
    }

    // ---- Table operations ----

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: Vec<(&str, String)>,
    ) -> RemoteResult<T> {
        let response = self
            .authed(self.http.get(self.table_url(table)))
            .query(&query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn insert_returning<T: DeserializeOwned>(
        &self,
        table: &str,
        body: &Value,
    ) -> RemoteResult<T> {
        let response = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn insert_one<T: DeserializeOwned>(&self, table: &str, body: &Value) -> RemoteResult<T> {
        let rows: Vec<T> = self.insert_returning(table, body).await?;
        rows.into_iter().next().ok_or(RemoteError::MissingRow)
    }

    async fn patch_by_id(&self, table: &str, id: Uuid, body: &Value) -> RemoteResult<()> {
        let response = self
            .authed(self.http.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn delete_by_id(&self, table: &str, id: Uuid) -> RemoteResult<()> {
        let response = self
            .authed(self.http.delete(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    // ---- Storage operations ----

    async fn put_object(&self, storage_path: &str, file: &UploadFile) -> RemoteResult<()> {
        let mut request = self
            .authed(self.http.post(self.object_url(storage_path)))
            .body(file.bytes.clone());
        if let Some(content_type) = &file.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        Self::checked(request.send().await?).await?;
        Ok(())
    }

    async fn remove_object(&self, storage_path: &str) -> RemoteResult<()> {
        let response = self
            .authed(self.http.delete(self.object_url(storage_path)))
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn sign_object(&self, storage_path: &str) -> RemoteResult<String> {
        let response = self
            .authed(self.http.post(self.sign_request_url(storage_path)))
            .json(&json!({ "expiresIn": self.config.signed_url_ttl }))
            .send()
            .await?;
        let signed: SignResponse = Self::decode(response).await?;
        Ok(format!(
            "{}/storage/v1{}",
            self.config.base_url, signed.signed_url
        ))
    }
}

#[async_trait]
impl ChecklistBackend for SupabaseBackend {
    async fn fetch_owned_checklists(&self, user_id: Uuid) -> StoreResult<Vec<UserChecklist>> {
        let checklists = self
            .get_rows(
                "user_checklists",
                vec![
                    ("select", "*,checklist_items(*)".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                    ("order", "sort_order.asc".to_string()),
                    ("checklist_items.order", "sort_order.asc".to_string()),
                ],
            )
            .await?;
        Ok(checklists)
    }

    async fn fetch_templates(&self) -> StoreResult<Vec<ChecklistTemplate>> {
        let templates = self
            .get_rows(
                "checklist_templates",
                vec![
                    ("select", "*,template_items(*)".to_string()),
                    ("order", "featured.desc,rating.desc".to_string()),
                    ("template_items.order", "sort_order.asc".to_string()),
                ],
            )
            .await?;
        Ok(templates)
    }

    async fn create_checklist(
        &self,
        user_id: Uuid,
        new: NewChecklist,
    ) -> StoreResult<UserChecklist> {
        let body = Self::with_columns(
            serde_json::to_value(&new).map_err(RemoteError::Decode)?,
            vec![("user_id", json!(user_id))],
        );
        Ok(self.insert_one("user_checklists", &body).await?)
    }

    async fn update_checklist(&self, id: Uuid, patch: ChecklistPatch) -> StoreResult<()> {
        let body = serde_json::to_value(&patch).map_err(RemoteError::Decode)?;
        Ok(self.patch_by_id("user_checklists", id, &body).await?)
    }

    async fn delete_checklist(&self, id: Uuid) -> StoreResult<()> {
        Ok(self.delete_by_id("user_checklists", id).await?)
    }

    async fn create_item(&self, new: NewChecklistItem) -> StoreResult<ChecklistItem> {
        let body = serde_json::to_value(&new).map_err(RemoteError::Decode)?;
        Ok(self.insert_one("checklist_items", &body).await?)
    }

    async fn create_items(&self, items: Vec<NewChecklistItem>) -> StoreResult<Vec<ChecklistItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let body = serde_json::to_value(&items).map_err(RemoteError::Decode)?;
        Ok(self.insert_returning("checklist_items", &body).await?)
    }

    async fn update_item(&self, id: Uuid, patch: ChecklistItemPatch) -> StoreResult<()> {
        let body = serde_json::to_value(&patch).map_err(RemoteError::Decode)?;
        Ok(self.patch_by_id("checklist_items", id, &body).await?)
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<()> {
        Ok(self.delete_by_id("checklist_items", id).await?)
    }
}

#[async_trait]
impl DocumentBackend for SupabaseBackend {
    async fn fetch_owned_documents(&self, user_id: Uuid) -> StoreResult<Vec<Document>> {
        let documents = self
            .get_rows(
                "documents",
                vec![
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?;
        Ok(documents)
    }

    async fn upload_document(
        &self,
        user_id: Uuid,
        file: UploadFile,
        metadata: NewDocument,
    ) -> StoreResult<Document> {
        let storage_path = Self::object_path_for(user_id, &file.file_name);
        self.put_object(&storage_path, &file).await?;

        let body = Self::with_columns(
            serde_json::to_value(&metadata).map_err(RemoteError::Decode)?,
            vec![
                ("user_id", json!(user_id)),
                ("storage_path", json!(storage_path)),
                ("file_size", json!(file.bytes.len() as i64)),
                ("mime_type", json!(file.content_type)),
            ],
        );

        match self.insert_one("documents", &body).await {
            Ok(document) => Ok(document),
            Err(err) => {
                // The row never landed; try not to leave the object behind.
                if let Err(cleanup) = self.remove_object(&storage_path).await {
                    warn!(
                        "Orphaned object {} after failed metadata insert: {}",
                        storage_path, cleanup
                    );
                }
                Err(err.into())
            }
        }
    }

    async fn update_document(&self, id: Uuid, patch: DocumentPatch) -> StoreResult<()> {
        let body = serde_json::to_value(&patch).map_err(RemoteError::Decode)?;
        Ok(self.patch_by_id("documents", id, &body).await?)
    }

    async fn delete_document(&self, id: Uuid) -> StoreResult<()> {
        Ok(self.delete_by_id("documents", id).await?)
    }

    async fn delete_object(&self, storage_path: &str) -> StoreResult<()> {
        Ok(self.remove_object(storage_path).await?)
    }

    async fn signed_url(&self, storage_path: &str) -> StoreResult<String> {
        Ok(self.sign_object(storage_path).await?)
    }
}

/// Keep object keys to a conservative character set
fn sanitize_file_name(file_name: &str) -> String {
    let sanitized: String = file_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SupabaseBackend {
        SupabaseBackend::new(BackendConfig {
            base_url: "https://abrora.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            documents_bucket: "documents".to_string(),
            signed_url_ttl: 3600,
            request_timeout: 30,
        })
        .expect("Failed to build adapter")
    }

    #[test]
    fn test_table_and_object_urls() {
        let backend = backend();
        assert_eq!(
            backend.table_url("user_checklists"),
            "https://abrora.supabase.co/rest/v1/user_checklists"
        );
        assert_eq!(
            backend.object_url("user/visa.pdf"),
            "https://abrora.supabase.co/storage/v1/object/documents/user/visa.pdf"
        );
        assert_eq!(
            backend.sign_request_url("user/visa.pdf"),
            "https://abrora.supabase.co/storage/v1/object/sign/documents/user/visa.pdf"
        );
    }

    #[test]
    fn test_object_path_is_prefixed_and_sanitized() {
        let user_id = Uuid::new_v4();
        let path = SupabaseBackend::object_path_for(user_id, "My Visa (2).PDF");
        assert!(path.starts_with(&format!("{}/", user_id)));
        assert!(path.ends_with("my-visa--2-.pdf"));
    }

    #[test]
    fn test_sanitize_file_name_fallback() {
        assert_eq!(sanitize_file_name("///"), "---");
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("Bank Statement.pdf"), "bank-statement.pdf");
    }

    #[test]
    fn test_with_columns_merges_extra_fields() {
        let body = SupabaseBackend::with_columns(
            json!({ "title": "Visa" }),
            vec![("user_id", json!("u1")), ("file_size", json!(42))],
        );
        assert_eq!(
            body,
            json!({ "title": "Visa", "user_id": "u1", "file_size": 42 })
        );
    }
}
