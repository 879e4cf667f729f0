//! Parameter structures for run operations.
//!
//! These are shared by every front end. They carry serde derives and, with
//! the `schema` feature, JSON schemas for the MCP tools; the CLI wraps them in
//! clap argument structs and converts with `From`.

use std::collections::HashMap;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{Checklist, SortDirection};

/// Identifies a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RunId {
    /// ID of the playbook run
    pub run_id: String,
}

/// Identifies a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ChannelId {
    /// ID of the channel bound to the run
    pub channel_id: String,
}

/// Draft of a new run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateRun {
    /// Name of the run, also used for the channel
    pub name: String,
    /// Optional description; defaults to the playbook's
    #[serde(default)]
    pub description: String,
    /// User who owns the run
    pub owner_user_id: String,
    /// Team the run and its channel belong to
    pub team_id: String,
    /// Playbook to start the run from
    #[serde(default)]
    pub playbook_id: Option<String>,
    /// Post the run is started from
    #[serde(default)]
    pub post_id: Option<String>,
}

/// How creation was invoked; decides whether an ephemeral
/// acknowledgement is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Direct,
    Dialog,
}

/// Submission of the interactive "start run" dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DialogSubmission {
    /// User the dialog was submitted by
    pub user_id: String,
    /// Team the dialog was opened in
    pub team_id: String,
    /// Opaque dialog state; may carry `{"post_id": "..."}`
    #[serde(default)]
    pub state: String,
    /// Field values keyed by `playbookID`, `incidentName`, `incidentDescription`
    #[serde(default)]
    pub submission: HashMap<String, String>,
}

/// Dialog field holding the playbook ID.
pub const DIALOG_FIELD_PLAYBOOK: &str = "playbookID";
/// Dialog field holding the run name.
pub const DIALOG_FIELD_NAME: &str = "incidentName";
/// Dialog field holding the run description.
pub const DIALOG_FIELD_DESCRIPTION: &str = "incidentDescription";

/// Parsed contents of [`DialogSubmission::state`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogState {
    #[serde(default)]
    pub post_id: Option<String>,
}

/// Status update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StatusUpdateOptions {
    /// One of the configured status labels, matched exactly
    pub status: String,
    /// Update message posted in the channel
    pub message: String,
    /// New description of the run
    pub description: String,
    /// Seconds until the follow-up reminder; 0 schedules none
    #[serde(default)]
    pub reminder_in_seconds: i64,
}

/// Status update addressed to a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateStatus {
    /// ID of the playbook run
    pub run_id: String,
    #[serde(flatten)]
    pub options: StatusUpdateOptions,
}

/// Run list request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListRuns {
    /// Team to list runs for
    pub team_id: String,
    /// Zero-based page number
    #[serde(default)]
    pub page: u32,
    /// Page size; 0 uses the default of 100, capped at 1000
    #[serde(default)]
    pub per_page: u32,
    /// Only runs owned by this user
    #[serde(default)]
    pub owner_user_id: Option<String>,
    /// Only runs currently in this status
    #[serde(default)]
    pub status: Option<String>,
    /// Only runs whose name contains this text
    #[serde(default)]
    pub search_term: Option<String>,
    /// Sort by creation time, "asc" or "desc" (default)
    #[serde(default)]
    pub direction: SortDirection,
}

/// New playbook template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlaybook {
    pub team_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Runs of this playbook get public channels
    #[serde(default = "default_true")]
    pub create_public_playbook_run: bool,
    /// Users allowed to start runs from the playbook
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub invite_users_enabled: bool,
    #[serde(default)]
    pub invited_user_ids: Vec<String>,
    #[serde(default)]
    pub invited_group_ids: Vec<String>,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
}

fn default_true() -> bool {
    true
}
