//! Channel-derived run metadata.

use serde::{Deserialize, Serialize};

/// Read live from the host on every request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunMetadata {
    pub channel_name: String,
    pub channel_display_name: String,
    pub team_name: String,
    pub num_members: i64,
    pub total_posts: i64,
}
