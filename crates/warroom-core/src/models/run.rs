//! The playbook run record.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{null_as_empty, Checklist, StatusPost, TimelineEvent};
use crate::oracle::ChannelType;

/// An incident or process record bound to exactly one channel.
///
/// `channel_id` is assigned once at creation and never changes. The status
/// post and timeline lists only ever grow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybookRun {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_user_id: String,
    pub team_id: String,
    pub channel_id: String,
    /// Visibility chosen when the channel was created
    pub channel_public: bool,
    /// Post the run was started from, if any
    pub post_id: Option<String>,
    pub playbook_id: Option<String>,
    pub current_status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub checklists: Vec<Checklist>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status_posts: Vec<StatusPost>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub timeline_events: Vec<TimelineEvent>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub invited_user_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub invited_group_ids: Vec<String>,
    pub created_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub last_status_update_at: Option<Timestamp>,
}

impl PlaybookRun {
    pub fn channel_type(&self) -> ChannelType {
        if self.channel_public {
            ChannelType::Public
        } else {
            ChannelType::Private
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }
}
