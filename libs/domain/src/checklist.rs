//! Checklist and checklist item models
//!
//! A [`UserChecklist`] belongs to exactly one user and owns an ordered
//! sequence of [`ChecklistItem`]s. Wire form matches the hosted backend's
//! table columns; embedded items arrive under `checklist_items`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Item priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

/// Fixed checklist categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistCategory {
    PreArrival,
    FirstWeek,
    FirstMonth,
    Documents,
    Housing,
    Finance,
    Academics,
    Custom,
}

impl ChecklistCategory {
    /// Human-readable label, also matched by free-text search
    pub fn label(&self) -> &'static str {
        match self {
            ChecklistCategory::PreArrival => "Pre-Arrival",
            ChecklistCategory::FirstWeek => "First Week",
            ChecklistCategory::FirstMonth => "First Month",
            ChecklistCategory::Documents => "Documents",
            ChecklistCategory::Housing => "Housing",
            ChecklistCategory::Finance => "Finance",
            ChecklistCategory::Academics => "Academics",
            ChecklistCategory::Custom => "Custom",
        }
    }
}

/// The eight named color swatches a checklist can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistColor {
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
    Teal,
    Red,
    Yellow,
}

/// Checklist lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Active,
    Completed,
    Archived,
}

/// Checklist item entity
///
/// Invariant: `completed_at` is `Some` if and only if `completed` is true.
/// Mutate completion through [`ChecklistItem::set_completed`] to keep it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub checklist_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChecklistItem {
    /// Set the completion flag, keeping `completed_at` in lockstep
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = completed.then_some(now);
        self.updated_at = now;
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, patch: &ChecklistItemPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(completed) = patch.completed {
            self.set_completed(completed, now);
        }
        self.updated_at = now;
    }
}

/// Checklist entity with its owned items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserChecklist {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: ChecklistCategory,
    pub color: ChecklistColor,
    pub icon: Option<String>,
    pub status: ChecklistStatus,
    pub template_id: Option<Uuid>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "checklist_items", default)]
    pub items: Vec<ChecklistItem>,
}

impl UserChecklist {
    /// Apply a partial update in place (does not touch items)
    pub fn apply(&mut self, patch: &ChecklistPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(icon) = &patch.icon {
            self.icon = Some(icon.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

/// New checklist item payload, scoped to a checklist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklistItem {
    pub checklist_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub sort_order: i32,
}

/// Checklist item update payload; only touched columns are serialized
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Double-option: `None` leaves the column untouched, `Some(None)`
    /// writes SQL NULL. Un-completing must clear the timestamp on the
    /// server row, not just skip it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl ChecklistItemPatch {
    /// Patch that toggles completion, carrying the matching timestamp
    /// (or an explicit NULL when un-completing)
    pub fn completion(completed: bool, now: DateTime<Utc>) -> Self {
        Self {
            completed: Some(completed),
            completed_at: Some(completed.then_some(now)),
            ..Self::default()
        }
    }
}

/// New checklist payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklist {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: ChecklistCategory,
    pub color: ChecklistColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
    pub sort_order: i32,
}

/// Checklist update payload; only touched columns are serialized
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ChecklistCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ChecklistColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChecklistStatus>,
}

impl ChecklistPatch {
    /// Patch that only moves the lifecycle status
    pub fn status(status: ChecklistStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
