//! Data models for playbook runs and their templates.
//!
//! Display implementations live in [`crate::display`]; these modules only
//! carry data, parsing helpers and the small amount of behaviour that belongs
//! to the data itself (deep-copying checklists, normalizing invite lists).
//!
//! ```rust
//! use warroom_core::models::{Checklist, ChecklistItem, ChecklistItemState};
//!
//! let checklist = Checklist {
//!     title: "Triage".to_string(),
//!     items: vec![ChecklistItem::new("Page the on-call")],
//! };
//! assert_eq!(checklist.items[0].state, ChecklistItemState::Open);
//! ```

pub mod checklist;
pub mod filters;
pub mod metadata;
pub mod playbook;
pub mod requester;
pub mod run;
pub mod status;
pub mod timeline;


pub use checklist::{Checklist, ChecklistItem, ChecklistItemState};
pub use filters::{AutocompleteItem, RunFilter, RunListResults, SortDirection};
pub use metadata::RunMetadata;
pub use playbook::Playbook;
pub use requester::RequesterInfo;
pub use run::PlaybookRun;
pub use status::{Reminder, StatusPost};
pub use timeline::{TimelineEvent, TimelineEventType};

/// Deserializes a list that may arrive as JSON `null` into an empty vector.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    use serde::Deserialize;

    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
