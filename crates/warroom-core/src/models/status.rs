//! Status posts and the reminders they schedule.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// One status update, as stored and as shown in the run's channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusPost {
    pub id: String,
    pub run_id: String,
    pub status: String,
    pub message: String,
    pub description: String,
    pub author_user_id: String,
    pub created_at: Timestamp,
}

/// Pending follow-up reminder. A run has at most one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reminder {
    pub due_at: Timestamp,
}
