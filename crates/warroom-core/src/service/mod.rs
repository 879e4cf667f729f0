//! High-level run service.
//!
//! [`RunService`] is the entry point every front end calls. It holds no state
//! between calls beyond its collaborators:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   ┌──────────┐
//! │ FeatureGate  │──▶│AccessResolver│──▶│ creator/status │──▶│ Database │
//! │ (settings)   │   │ (oracle)     │   │ lister/fetch   │   │ (db/)    │
//! └──────────────┘   └──────────────┘   └────────────────┘   └──────────┘
//!                                               │
//!                                               ▼
//!                                        Notifier (best effort)
//! ```
//!
//! Each operation takes one settings snapshot, asks the oracle fresh, and
//! writes through a single transaction.
//!
//! ## Submodules
//!
//! - [`builder`]: wires the database path, settings and host collaborators
//! - [`creator`]: run creation saga with channel provisioning and compensation
//! - [`dialog`]: interactive dialog entry point for creation
//! - [`status`]: status update workflow and reminders
//! - [`lister`]: team-scoped, permission-filtered listing
//! - [`fetch`]: single-run lookups, metadata and checklist autocomplete
//! - [`playbooks`]: playbook template administration

use std::{path::PathBuf, sync::Arc};

use crate::{
    access::AccessResolver,
    config::ConfigSource,
    db::with_database,
    error::{Result, RunError},
    models::PlaybookRun,
    notify::Notifier,
    oracle::{ChannelOracle, ChannelProvisioner},
};

pub mod builder;
pub mod creator;
pub mod dialog;
pub mod fetch;
pub mod lister;
pub mod playbooks;
pub mod status;

pub use builder::RunServiceBuilder;
pub use dialog::DialogOutcome;
pub use status::StatusUpdateResult;

/// Orchestrates run operations over a database and a host platform.
pub struct RunService {
    pub(crate) db_path: PathBuf,
    pub(crate) oracle: Arc<dyn ChannelOracle>,
    pub(crate) provisioner: Arc<dyn ChannelProvisioner>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) config: Arc<dyn ConfigSource>,
}

impl RunService {
    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    pub(crate) fn resolver(&self) -> AccessResolver<'_> {
        AccessResolver::new(self.oracle.as_ref())
    }

    /// Loads a run or fails with [`RunError::NotFound`].
    pub(crate) async fn load_run(&self, run_id: &str) -> Result<PlaybookRun> {
        let id = run_id.to_string();
        with_database(&self.db_path, move |db| db.get_run(&id))
            .await?
            .ok_or_else(|| RunError::run_not_found(run_id))
    }
}
