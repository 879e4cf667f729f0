//! Markdown formatting of runs and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation outcomes get small wrapper types so the same
//! data can be shown differently depending on context. The CLI renders the
//! markdown through its terminal renderer.
//!
//! ```rust
//! use warroom_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Joined channel".to_string());
//! assert_eq!(status.to_string(), "Success: Joined channel");
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: list wrappers (Playbooks, AutocompleteItems)
//! - [`results`]: operation outcomes (CreateResult, StatusUpdateResult, DialogOutcome)
//! - [`status`]: confirmation messages (OperationStatus)
//! - [`datetime`]: timestamp formatting
//! - [`models`]: Display implementations for domain models

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{AutocompleteItems, Playbooks};
pub use datetime::LocalDateTime;
pub use results::CreateResult;
pub use status::OperationStatus;
