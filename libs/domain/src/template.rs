//! Checklist template catalog models
//!
//! Templates are a read-only catalog; the client never mutates them.
//! They exist to seed new user checklists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checklist::{ChecklistCategory, ChecklistColor, NewChecklist, Priority};

/// Template difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A single task inside a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub sort_order: i32,
}

/// Catalog template entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: ChecklistCategory,
    pub color: ChecklistColor,
    pub icon: String,
    pub difficulty: Difficulty,
    pub estimated_time: String,
    pub usage_count: i64,
    pub rating: f64,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "template_items", default)]
    pub items: Vec<TemplateItem>,
}

impl ChecklistTemplate {
    /// Build the payload for a checklist seeded from this template
    pub fn to_new_checklist(&self, sort_order: i32) -> NewChecklist {
        NewChecklist {
            title: self.title.clone(),
            description: Some(self.description.clone()),
            category: self.category,
            color: self.color,
            icon: Some(self.icon.clone()),
            template_id: Some(self.id),
            sort_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_checklist_references_template() {
        let template = ChecklistTemplate {
            id: Uuid::new_v4(),
            title: "Pre-Arrival".to_string(),
            description: "Everything to do before the flight".to_string(),
            category: ChecklistCategory::PreArrival,
            color: ChecklistColor::Blue,
            icon: "plane".to_string(),
            difficulty: Difficulty::Easy,
            estimated_time: "2 weeks".to_string(),
            usage_count: 41,
            rating: 4.6,
            featured: true,
            created_at: Utc::now(),
            items: vec![TemplateItem {
                title: "Get I-20".to_string(),
                description: None,
                priority: Priority::Critical,
                sort_order: 0,
            }],
        };

        let new = template.to_new_checklist(3);
        assert_eq!(new.template_id, Some(template.id));
        assert_eq!(new.title, "Pre-Arrival");
        assert_eq!(new.sort_order, 3);
    }
}
