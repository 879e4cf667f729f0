//! Interfaces to the messaging platform hosting the runs.
//!
//! The core never reads memberships or permissions itself. Every capability
//! question goes through a [`ChannelOracle`], and the only side effects on the
//! platform's directory go through a [`ChannelProvisioner`]. Both are async
//! because real hosts answer over the network.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Visibility of a messaging channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    #[default]
    Public,
    Private,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Public => "public",
            ChannelType::Private => "private",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, ChannelType::Public)
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" | "o" => Ok(ChannelType::Public),
            "private" | "p" => Ok(ChannelType::Private),
            _ => Err(format!("Invalid channel type: {s}")),
        }
    }
}

/// Per-channel capabilities the core asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPermission {
    ReadChannel,
    CreatePost,
}

/// Per-team capabilities the core asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamPermission {
    ViewTeam,
    ListTeamChannels,
    CreatePublicChannel,
    CreatePrivateChannel,
}

impl TeamPermission {
    /// The team permission required to create a channel of `channel_type`.
    pub fn create_channel(channel_type: ChannelType) -> Self {
        match channel_type {
            ChannelType::Public => TeamPermission::CreatePublicChannel,
            ChannelType::Private => TeamPermission::CreatePrivateChannel,
        }
    }
}

/// A channel as the host reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub display_name: String,
    pub channel_type: ChannelType,
    pub total_msg_count: i64,
}

/// A team as the host reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub display_name: String,
}

/// Request to materialize the channel backing a new run.
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub team_id: String,
    pub name: String,
    pub display_name: String,
    pub channel_type: ChannelType,
    pub creator_user_id: String,
    pub member_ids: Vec<String>,
}

/// Read-only capability queries against the host platform.
///
/// Answers are never cached by the core; each operation asks again.
#[async_trait]
pub trait ChannelOracle: Send + Sync {
    async fn is_system_admin(&self, user_id: &str) -> Result<bool>;

    async fn has_channel_permission(
        &self,
        user_id: &str,
        channel_id: &str,
        permission: ChannelPermission,
    ) -> Result<bool>;

    async fn has_team_permission(
        &self,
        user_id: &str,
        team_id: &str,
        permission: TeamPermission,
    ) -> Result<bool>;

    /// Looks up a channel, `None` when the host does not know it.
    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>>;

    async fn get_team(&self, team_id: &str) -> Result<Option<Team>>;

    async fn channel_member_count(&self, channel_id: &str) -> Result<i64>;

    /// Channels in `team_id` the user can read. Feeds the list predicate.
    async fn readable_channel_ids(&self, user_id: &str, team_id: &str) -> Result<Vec<String>>;

    /// Channel a post lives in, `None` when the post is unknown.
    async fn post_channel_id(&self, post_id: &str) -> Result<Option<String>>;
}

/// Mutating counterpart of [`ChannelOracle`] used by run creation.
#[async_trait]
pub trait ChannelProvisioner: Send + Sync {
    /// Creates the channel and adds the requested members. Returns it.
    async fn create_channel(&self, request: &NewChannel) -> Result<Channel>;

    /// Archives a channel whose run could not be stored.
    async fn archive_channel(&self, channel_id: &str) -> Result<()>;
}
