//! Status updates and reminders.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension};

use super::{run_queries::insert_timeline_event, timestamp_column, timestamp_text};
use crate::{
    error::{DatabaseResultExt, Result, RunError},
    models::{Reminder, StatusPost, TimelineEvent},
};

const INSERT_STATUS_POST_SQL: &str = "INSERT INTO status_posts (id, run_id, status, message, \
     description, author_user_id, created_at, seq) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, \
     (SELECT COALESCE(MAX(seq), 0) + 1 FROM status_posts WHERE run_id = ?2))";
const UPDATE_RUN_STATUS_SQL: &str = "UPDATE playbook_runs SET current_status = ?1, \
     description = ?2, last_status_update_at = ?3, \
     ended_at = CASE WHEN ?4 THEN COALESCE(ended_at, ?3) ELSE NULL END WHERE id = ?5";
const DELETE_REMINDER_SQL: &str = "DELETE FROM reminders WHERE run_id = ?1";
const INSERT_REMINDER_SQL: &str = "INSERT INTO reminders (run_id, due_at) VALUES (?1, ?2)";
const SELECT_REMINDER_SQL: &str = "SELECT due_at FROM reminders WHERE run_id = ?1";
const SELECT_STATUS_POSTS_SQL: &str = "SELECT id, run_id, status, message, description, \
     author_user_id, created_at FROM status_posts WHERE run_id = ?1 ORDER BY seq";

/// Everything a status update writes, applied atomically.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub post: StatusPost,
    pub event: TimelineEvent,
    /// Whether the new status is a finished one. Entering it sets
    /// `ended_at` unless already set; any other status clears it.
    pub finished: bool,
    /// Replaces any pending reminder; `None` clears it
    pub reminder_due_at: Option<Timestamp>,
}

impl super::Database {
    /// Applies a status update in one transaction: the post, the run's
    /// status fields, the timeline event and the reminder replacement.
    pub fn record_status_update(&mut self, change: &StatusChange) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let post = &change.post;
        let updated = tx
            .execute(
                UPDATE_RUN_STATUS_SQL,
                params![
                    &post.status,
                    &post.description,
                    timestamp_text(post.created_at),
                    change.finished,
                    &post.run_id,
                ],
            )
            .db_context("Failed to update playbook run status")?;

        if updated == 0 {
            return Err(RunError::run_not_found(&post.run_id));
        }

        tx.execute(
            INSERT_STATUS_POST_SQL,
            params![
                &post.id,
                &post.run_id,
                &post.status,
                &post.message,
                &post.description,
                &post.author_user_id,
                timestamp_text(post.created_at),
            ],
        )
        .db_context("Failed to insert status post")?;

        insert_timeline_event(&tx, &change.event)?;

        tx.execute(DELETE_REMINDER_SQL, params![&post.run_id])
            .db_context("Failed to clear reminder")?;
        if let Some(due_at) = change.reminder_due_at {
            tx.execute(INSERT_REMINDER_SQL, params![&post.run_id, timestamp_text(due_at)])
                .db_context("Failed to schedule reminder")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(())
    }

    pub fn get_status_posts(&self, run_id: &str) -> Result<Vec<StatusPost>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_STATUS_POSTS_SQL)
            .db_context("Failed to prepare query")?;

        let posts = stmt
            .query_map(params![run_id], |row| {
                Ok(StatusPost {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    status: row.get(2)?,
                    message: row.get(3)?,
                    description: row.get(4)?,
                    author_user_id: row.get(5)?,
                    created_at: timestamp_column(row, 6)?,
                })
            })
            .db_context("Failed to query status posts")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch status posts")?;

        Ok(posts)
    }

    /// The run's pending reminder, if one is scheduled.
    pub fn get_reminder(&self, run_id: &str) -> Result<Option<Reminder>> {
        self.connection
            .query_row(SELECT_REMINDER_SQL, params![run_id], |row| {
                Ok(Reminder {
                    due_at: timestamp_column(row, 0)?,
                })
            })
            .optional()
            .db_context("Failed to query reminder")
    }
}
