//! Status update workflow.
//!
//! Gates run in a fixed order and the first failure wins:
//!
//! 1. the run exists and the feature is enabled for its team
//! 2. the requester can view the run
//! 3. the status is one of the configured labels (exact match)
//! 4. message and description are non-blank, the reminder is neither
//!    negative nor past the end of the clock
//! 5. the requester can post in the run's channel
//!
//! Only then is anything written, in a single transaction that also
//! replaces the run's pending reminder.

use jiff::{SignedDuration, Timestamp};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RunService;
use crate::{
    config::Settings,
    db::{status_queries::StatusChange, with_database},
    error::{Result, RunError},
    gate::FeatureGate,
    models::{PlaybookRun, Reminder, StatusPost, TimelineEvent, TimelineEventType},
    params::StatusUpdateOptions,
};

/// Outcome of a successful status update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateResult {
    /// The run after the update
    pub run: PlaybookRun,
    pub post: StatusPost,
    /// Reminder scheduled by this update, if any
    pub reminder: Option<Reminder>,
}

/// Checks the request fields against the configured statuses and returns
/// the reminder the update schedules from `now`.
fn validate_options(
    settings: &Settings,
    opts: &StatusUpdateOptions,
    now: Timestamp,
) -> Result<Option<Reminder>> {
    if !settings.is_known_status(&opts.status) {
        return Err(RunError::invalid_input("status").with_reason("unknown status"));
    }
    if opts.message.trim().is_empty() {
        return Err(RunError::invalid_input("message").with_reason("must not be empty"));
    }
    if opts.description.trim().is_empty() {
        return Err(RunError::invalid_input("description").with_reason("must not be empty"));
    }
    if opts.reminder_in_seconds < 0 {
        return Err(RunError::invalid_input("reminder_in_seconds").with_reason("must not be negative"));
    }
    if opts.reminder_in_seconds == 0 {
        return Ok(None);
    }
    now.checked_add(SignedDuration::from_secs(opts.reminder_in_seconds))
        .map(|due_at| Some(Reminder { due_at }))
        .map_err(|e| {
            RunError::invalid_input("reminder_in_seconds")
                .with_reason(format!("reminder out of range: {e}"))
        })
}

impl RunService {
    /// Posts a status update to a run and reschedules its reminder.
    pub async fn update_status(
        &self,
        requester_id: &str,
        run_id: &str,
        opts: &StatusUpdateOptions,
    ) -> Result<StatusUpdateResult> {
        let run = self.load_run(run_id).await?;
        let settings = self.config.snapshot();
        FeatureGate::new(&settings).check(&run.team_id)?;

        let resolver = self.resolver();
        resolver.require_view(requester_id, &run).await?;

        let now = Timestamp::now();
        let reminder = validate_options(&settings, opts, now).inspect_err(|e| {
            warn!("Rejected status update for run {run_id}: {e}");
        })?;

        if !resolver.can_post(requester_id, &run.channel_id).await? {
            warn!(
                "User {requester_id} cannot post in channel {} of run {run_id}",
                run.channel_id
            );
            return Err(RunError::forbidden(format!(
                "user {requester_id} cannot post in channel {}",
                run.channel_id
            )));
        }

        let post = StatusPost {
            id: Uuid::new_v4().to_string(),
            run_id: run.id.clone(),
            status: opts.status.clone(),
            message: opts.message.clone(),
            description: opts.description.clone(),
            author_user_id: requester_id.to_string(),
            created_at: now,
        };

        let change = StatusChange {
            post: post.clone(),
            event: TimelineEvent {
                id: Uuid::new_v4().to_string(),
                run_id: run.id.clone(),
                event_type: TimelineEventType::StatusUpdated,
                summary: format!("Status changed to {}", opts.status),
                details: opts.message.clone(),
                subject_user_id: requester_id.to_string(),
                created_at: now,
            },
            finished: settings.is_finished_status(&opts.status),
            reminder_due_at: reminder.map(|r| r.due_at),
        };

        let id = run.id.clone();
        let run = with_database(&self.db_path, move |db| {
            db.record_status_update(&change)?;
            db.get_run(&id)?.ok_or_else(|| RunError::run_not_found(&id))
        })
        .await?;

        info!(
            "Run {} status updated to {} by {requester_id}",
            run.id, post.status
        );

        if let Err(e) = self.notifier.status_posted(&run, &post).await {
            warn!("Failed to post status update for run {}: {e}", run.id);
        }

        Ok(StatusUpdateResult {
            run,
            post,
            reminder,
        })
    }
}
