//! Playbook templates.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{null_as_empty, Checklist};
use crate::oracle::ChannelType;

/// Reusable template a run can be started from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Playbook {
    pub id: String,
    pub team_id: String,
    pub title: String,
    pub description: String,
    /// Visibility of channels created for runs of this playbook
    pub create_public_playbook_run: bool,
    /// Users allowed to start runs from this playbook
    #[serde(default, deserialize_with = "null_as_empty")]
    pub member_ids: Vec<String>,
    pub invite_users_enabled: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub invited_user_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub invited_group_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub checklists: Vec<Checklist>,
    pub created_at: Timestamp,
}

impl Playbook {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == user_id)
    }

    pub fn channel_type(&self) -> ChannelType {
        if self.create_public_playbook_run {
            ChannelType::Public
        } else {
            ChannelType::Private
        }
    }
}
