//! Per-request snapshot of what a caller can see.

use serde::{Deserialize, Serialize};

/// Built fresh for every list request and discarded afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequesterInfo {
    pub user_id: String,
    pub team_id: String,
    pub is_admin: bool,
    pub can_list_team_channels: bool,
    pub readable_channel_ids: Vec<String>,
}
