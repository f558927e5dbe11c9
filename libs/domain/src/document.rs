//! Document models
//!
//! A [`Document`] is a user-owned metadata row pointing at an object in
//! the hosted storage bucket via `storage_path`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of documents international students keep track of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    Visa,
    I20,
    Ds2019,
    I94,
    Ead,
    Transcript,
    BankStatement,
    Insurance,
    Other,
}

impl DocumentType {
    /// Human-readable label, also matched by free-text search
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Passport => "Passport",
            DocumentType::Visa => "Visa",
            DocumentType::I20 => "I-20",
            DocumentType::Ds2019 => "DS-2019",
            DocumentType::I94 => "I-94",
            DocumentType::Ead => "EAD",
            DocumentType::Transcript => "Transcript",
            DocumentType::BankStatement => "Bank Statement",
            DocumentType::Insurance => "Insurance",
            DocumentType::Other => "Other",
        }
    }
}

/// Document entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type: DocumentType,
    pub title: String,
    pub storage_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub thumbnail_path: Option<String>,
    pub document_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether this document expires within the next `days` days
    ///
    /// The window is inclusive on both ends: `[today, today + days]`.
    /// Documents without an expiry date never match.
    pub fn expires_within(&self, days: i64, today: NaiveDate) -> bool {
        match self.expiry_date {
            Some(expiry) => {
                let delta = (expiry - today).num_days();
                (0..=days).contains(&delta)
            }
            None => false,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &DocumentPatch, now: DateTime<Utc>) {
        if let Some(document_type) = patch.document_type {
            self.document_type = document_type;
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(document_number) = &patch.document_number {
            self.document_number = Some(document_number.clone());
        }
        if let Some(issue_date) = patch.issue_date {
            self.issue_date = Some(issue_date);
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = Some(expiry_date);
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(verified) = patch.verified {
            self.verified = verified;
        }
        self.updated_at = now;
    }
}

/// Metadata accompanying a file upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub document_type: DocumentType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Document update payload; only touched columns are serialized
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// An uploaded file: raw bytes plus the client-known attributes
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
