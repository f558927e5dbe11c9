//! Filter and search predicates
//!
//! A [`ChecklistFilter`] holds the transient UI filter state. Every active
//! dimension must pass (logical AND); the default filter passes everything.
//! All predicates are pure.

use serde::{Deserialize, Serialize};

use crate::checklist::{ChecklistCategory, ChecklistItem, ChecklistStatus, Priority, UserChecklist};

/// Completion-status dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

/// Priority dimension: everything, or an exact match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

/// Category dimension: everything, or an exact match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ChecklistCategory),
}

/// Transient UI filter state; `Default` is the identity filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecklistFilter {
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub category: CategoryFilter,
    pub search: String,
}

/// Case-insensitive substring match over a set of candidate fields
///
/// An empty needle always matches.
pub fn text_matches<'a, I>(needle: &str, haystacks: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    haystacks
        .into_iter()
        .any(|hay| hay.to_lowercase().contains(&needle))
}

impl ChecklistFilter {
    /// Whether an item passes every active dimension
    ///
    /// The status dimension maps to the item's `completed` flag; the
    /// category dimension does not apply to items (they inherit their
    /// checklist's category) and is ignored here.
    pub fn matches_item(&self, item: &ChecklistItem) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !item.completed,
            StatusFilter::Completed => item.completed,
        };

        let priority_ok = match self.priority {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => item.priority == p,
        };

        let search_ok = text_matches(
            &self.search,
            [item.title.as_str()]
                .into_iter()
                .chain(item.description.as_deref()),
        );

        status_ok && priority_ok && search_ok
    }

    /// Whether a checklist passes every active dimension
    ///
    /// The status dimension maps to the checklist's lifecycle status;
    /// search also matches the category label.
    pub fn matches_checklist(&self, checklist: &UserChecklist) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => checklist.status == ChecklistStatus::Active,
            StatusFilter::Completed => checklist.status == ChecklistStatus::Completed,
        };

        let category_ok = match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => checklist.category == c,
        };

        let search_ok = text_matches(
            &self.search,
            [checklist.title.as_str(), checklist.category.label()]
                .into_iter()
                .chain(checklist.description.as_deref()),
        );

        status_ok && category_ok && search_ok
    }

    /// Filter an item slice, preserving order
    pub fn filter_items(&self, items: &[ChecklistItem]) -> Vec<ChecklistItem> {
        items
            .iter()
            .filter(|item| self.matches_item(item))
            .cloned()
            .collect()
    }

    /// Filter a checklist slice, preserving order
    pub fn filter_checklists(&self, checklists: &[UserChecklist]) -> Vec<UserChecklist> {
        checklists
            .iter()
            .filter(|checklist| self.matches_checklist(checklist))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(title: &str, priority: Priority, completed: bool) -> ChecklistItem {
        let now = Utc::now();
        ChecklistItem {
            id: Uuid::new_v4(),
            checklist_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            priority,
            due_date: None,
            completed,
            completed_at: completed.then_some(now),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_items() -> Vec<ChecklistItem> {
        vec![
            item("Get I-20 and visa stamp", Priority::Critical, false),
            item("Open a bank account", Priority::Medium, true),
            item("Find housing", Priority::High, false),
        ]
    }

    #[test]
    fn test_identity_filter_passes_everything() {
        let items = sample_items();
        let filter = ChecklistFilter::default();
        assert_eq!(filter.filter_items(&items), items);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let items = sample_items();
        let filter = ChecklistFilter {
            status: StatusFilter::Active,
            search: "i-20".to_string(),
            ..ChecklistFilter::default()
        };

        let once = filter.filter_items(&items);
        let twice = filter.filter_items(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let items = sample_items();

        for needle in ["I-20", "i-20"] {
            let filter = ChecklistFilter {
                search: needle.to_string(),
                ..ChecklistFilter::default()
            };
            let found = filter.filter_items(&items);
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].title, "Get I-20 and visa stamp");
        }
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let items = sample_items();
        let filter = ChecklistFilter {
            status: StatusFilter::Active,
            priority: PriorityFilter::Only(Priority::Critical),
            ..ChecklistFilter::default()
        };

        let found = filter.filter_items(&items);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].priority, Priority::Critical);

        // Same priority but completed-only: the AND of the two is empty
        let filter = ChecklistFilter {
            status: StatusFilter::Completed,
            priority: PriorityFilter::Only(Priority::Critical),
            ..ChecklistFilter::default()
        };
        assert!(filter.filter_items(&items).is_empty());
    }

    #[test]
    fn test_status_dimension_maps_to_completed_flag() {
        let items = sample_items();

        let active = ChecklistFilter {
            status: StatusFilter::Active,
            ..ChecklistFilter::default()
        };
        assert_eq!(active.filter_items(&items).len(), 2);

        let completed = ChecklistFilter {
            status: StatusFilter::Completed,
            ..ChecklistFilter::default()
        };
        assert_eq!(completed.filter_items(&items).len(), 1);
    }

    #[test]
    fn test_empty_search_always_passes() {
        assert!(text_matches("", ["anything"]));
        assert!(text_matches("", std::iter::empty::<&str>()));
    }
}
