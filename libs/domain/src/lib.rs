//! Domain model for the Abrora client core
//!
//! Pure data types and pure functions: checklist/template/document
//! entities with their input and patch variants, derived progress
//! statistics, the filter/search predicates, and input validation.
//! Nothing in this crate performs I/O.

pub mod checklist;
pub mod document;
pub mod filter;
pub mod progress;
pub mod template;
pub mod validation;

pub use checklist::{
    ChecklistCategory, ChecklistColor, ChecklistItem, ChecklistItemPatch, ChecklistPatch,
    ChecklistStatus, NewChecklist, NewChecklistItem, Priority, UserChecklist,
};
pub use document::{Document, DocumentPatch, DocumentType, NewDocument, UploadFile};
pub use filter::{CategoryFilter, ChecklistFilter, PriorityFilter, StatusFilter};
pub use progress::ChecklistProgress;
pub use template::{ChecklistTemplate, Difficulty, TemplateItem};
