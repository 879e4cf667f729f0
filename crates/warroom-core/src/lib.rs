//! Core library for warroom playbook runs.
//!
//! A playbook run is an incident record bound to exactly one messaging
//! channel. Who may see or change a run is derived from that channel: its
//! visibility, the requester's membership, their team permissions and the
//! system-admin override. This crate implements those rules, the run
//! creation saga, the status-update workflow with reminders, and filtered
//! listing, over a SQLite store.
//!
//! The messaging platform is reached only through traits:
//!
//! - [`ChannelOracle`] answers capability questions,
//! - [`ChannelProvisioner`] creates and archives run channels,
//! - [`Notifier`] delivers best-effort notifications.
//!
//! [`LocalDirectory`] implements all three on top of the same database for
//! single-machine use.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use warroom_core::{
//!     config::{LicenseTier, Settings},
//!     params::{CreateRun, Invocation},
//!     LocalDirectory, RunServiceBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = Arc::new(LocalDirectory::new("warroom.db"));
//! let settings = Settings {
//!     license: LicenseTier::Enterprise,
//!     ..Default::default()
//! };
//! let service = RunServiceBuilder::new()
//!     .with_database_path(Some("warroom.db"))
//!     .with_host(directory)
//!     .with_config(Arc::new(settings))
//!     .build()
//!     .await?;
//!
//! let run = service
//!     .create_run(
//!         "alice",
//!         &CreateRun {
//!             name: "Checkout errors".to_string(),
//!             owner_user_id: "alice".to_string(),
//!             team_id: "team-id".to_string(),
//!             ..Default::default()
//!         },
//!         Invocation::Direct,
//!     )
//!     .await?;
//! println!("{run}");
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod config;
pub mod db;
pub mod directory;
pub mod display;
pub mod error;
pub mod gate;
pub mod models;
pub mod notify;
pub mod oracle;
pub mod params;
pub mod service;

// Re-export commonly used types
pub use access::AccessResolver;
pub use config::{ConfigSource, LicenseTier, Settings};
pub use db::Database;
pub use directory::LocalDirectory;
pub use error::{ErrorKind, Result, RunError};
pub use gate::FeatureGate;
pub use models::{
    Checklist, ChecklistItem, Playbook, PlaybookRun, Reminder, RunListResults, RunMetadata,
    StatusPost,
};
pub use notify::{NoopNotifier, Notifier};
pub use oracle::{ChannelOracle, ChannelProvisioner, ChannelType};
pub use service::{DialogOutcome, RunService, RunServiceBuilder, StatusUpdateResult};
