//! Derived progress statistics
//!
//! Progress is never stored; it is recomputed from item state on demand.

use serde::{Deserialize, Serialize};

use crate::checklist::{ChecklistItem, UserChecklist};

/// Completion statistics for a set of checklist items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistProgress {
    /// Number of items
    pub total: usize,
    /// Number of completed items
    pub completed: usize,
    /// Integer percentage in [0, 100]; 0 when there are no items
    pub percentage: u8,
}

/// Compute progress over an item sequence
pub fn progress_of(items: &[ChecklistItem]) -> ChecklistProgress {
    let total = items.len();
    let completed = items.iter().filter(|item| item.completed).count();
    let percentage = if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u8
    };

    ChecklistProgress {
        total,
        completed,
        percentage,
    }
}

/// Compute aggregate progress across every item of every checklist
pub fn progress_of_all(checklists: &[UserChecklist]) -> ChecklistProgress {
    let total = checklists.iter().map(|c| c.items.len()).sum();
    let completed = checklists
        .iter()
        .flat_map(|c| c.items.iter())
        .filter(|item| item.completed)
        .count();
    let percentage = if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u8
    };

    ChecklistProgress {
        total,
        completed,
        percentage,
    }
}
