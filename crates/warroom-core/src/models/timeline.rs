//! Append-only audit trail of a run.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventType {
    IncidentCreated,
    StatusUpdated,
}

impl TimelineEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineEventType::IncidentCreated => "incident_created",
            TimelineEventType::StatusUpdated => "status_updated",
        }
    }
}

impl FromStr for TimelineEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incident_created" => Ok(TimelineEventType::IncidentCreated),
            "status_updated" => Ok(TimelineEventType::StatusUpdated),
            _ => Err(format!("Invalid timeline event type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEvent {
    pub id: String,
    pub run_id: String,
    pub event_type: TimelineEventType,
    pub summary: String,
    pub details: String,
    pub subject_user_id: String,
    pub created_at: Timestamp,
}
