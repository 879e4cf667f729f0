//! Single-machine host directory backed by the run database.
//!
//! [`LocalDirectory`] answers capability questions from the `teams`,
//! `channels`, membership and `system_admins` tables, provisions channels for
//! new runs and records notifications as posts. Permissions are derived from
//! membership:
//!
//! - reading a channel requires channel membership;
//! - posting additionally requires the channel not to be archived;
//! - viewing a team and listing its channels require team membership;
//! - creating channels requires team membership with the matching flag.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info};
use uuid::Uuid;

use crate::{
    db::{directory_queries::TeamMembership, with_database},
    error::{Result, RunError},
    models::{PlaybookRun, StatusPost},
    notify::Notifier,
    oracle::{
        Channel, ChannelOracle, ChannelPermission, ChannelProvisioner, NewChannel, Team,
        TeamPermission,
    },
};

/// User the directory attributes its own messages to.
pub const SYSTEM_USER_ID: &str = "warroom";

/// Host directory stored alongside the runs.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    db_path: PathBuf,
}

impl LocalDirectory {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Creates a team. `name` must be unique.
    pub async fn create_team(&self, name: &str, display_name: &str) -> Result<Team> {
        let team = Team {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
        };
        let stored = team.clone();
        with_database(&self.db_path, move |db| db.create_team(&stored)).await?;
        info!("Created team {} ({})", team.name, team.id);
        Ok(team)
    }

    /// Adds a user to a team or updates their channel-creation rights.
    pub async fn join_team(
        &self,
        team_id: &str,
        user_id: &str,
        membership: TeamMembership,
    ) -> Result<()> {
        let team_id = team_id.to_string();
        let user_id = user_id.to_string();
        with_database(&self.db_path, move |db| {
            db.upsert_team_member(&team_id, &user_id, membership)
        })
        .await
    }

    pub async fn join_channel(&self, channel_id: &str, user_id: &str) -> Result<()> {
        let channel_id = channel_id.to_string();
        let user_id = user_id.to_string();
        with_database(&self.db_path, move |db| {
            db.add_channel_member(&channel_id, &user_id)
        })
        .await
    }

    pub async fn grant_system_admin(&self, user_id: &str) -> Result<()> {
        let user_id = user_id.to_string();
        with_database(&self.db_path, move |db| db.add_system_admin(&user_id)).await
    }

    /// Posts a regular message. The author must be able to post in the channel.
    pub async fn create_post(&self, channel_id: &str, user_id: &str, message: &str) -> Result<String> {
        if !self
            .has_channel_permission(user_id, channel_id, ChannelPermission::CreatePost)
            .await?
        {
            return Err(RunError::forbidden(format!(
                "user {user_id} cannot post in channel {channel_id}"
            )));
        }
        self.insert_post(channel_id, user_id, message, false).await
    }

    async fn insert_post(
        &self,
        channel_id: &str,
        user_id: &str,
        message: &str,
        ephemeral: bool,
    ) -> Result<String> {
        let channel_id = channel_id.to_string();
        let user_id = user_id.to_string();
        let message = message.to_string();
        with_database(&self.db_path, move |db| {
            if db.is_channel_archived(&channel_id)?.is_none() {
                return Err(RunError::NotFound {
                    entity: "Channel",
                    id: channel_id.clone(),
                });
            }
            db.insert_post(&channel_id, &user_id, &message, ephemeral)
        })
        .await
    }
}

#[async_trait]
impl ChannelOracle for LocalDirectory {
    async fn is_system_admin(&self, user_id: &str) -> Result<bool> {
        let user_id = user_id.to_string();
        with_database(&self.db_path, move |db| db.is_system_admin(&user_id)).await
    }

    async fn has_channel_permission(
        &self,
        user_id: &str,
        channel_id: &str,
        permission: ChannelPermission,
    ) -> Result<bool> {
        let user_id = user_id.to_string();
        let channel_id = channel_id.to_string();
        with_database(&self.db_path, move |db| {
            let archived = match db.is_channel_archived(&channel_id)? {
                Some(archived) => archived,
                None => return Ok(false),
            };
            let member = db.is_channel_member(&channel_id, &user_id)?;
            Ok(match permission {
                ChannelPermission::ReadChannel => member,
                ChannelPermission::CreatePost => member && !archived,
            })
        })
        .await
    }

    async fn has_team_permission(
        &self,
        user_id: &str,
        team_id: &str,
        permission: TeamPermission,
    ) -> Result<bool> {
        let user_id = user_id.to_string();
        let team_id = team_id.to_string();
        let membership = with_database(&self.db_path, move |db| {
            db.get_team_membership(&team_id, &user_id)
        })
        .await?;

        let Some(membership) = membership else {
            return Ok(false);
        };
        Ok(match permission {
            TeamPermission::ViewTeam | TeamPermission::ListTeamChannels => true,
            TeamPermission::CreatePublicChannel => membership.can_create_public,
            TeamPermission::CreatePrivateChannel => membership.can_create_private,
        })
    }

    async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>> {
        let channel_id = channel_id.to_string();
        with_database(&self.db_path, move |db| db.get_channel(&channel_id)).await
    }

    async fn get_team(&self, team_id: &str) -> Result<Option<Team>> {
        let team_id = team_id.to_string();
        with_database(&self.db_path, move |db| db.get_team(&team_id)).await
    }

    async fn channel_member_count(&self, channel_id: &str) -> Result<i64> {
        let channel_id = channel_id.to_string();
        with_database(&self.db_path, move |db| db.channel_member_count(&channel_id)).await
    }

    async fn readable_channel_ids(&self, user_id: &str, team_id: &str) -> Result<Vec<String>> {
        let user_id = user_id.to_string();
        let team_id = team_id.to_string();
        with_database(&self.db_path, move |db| {
            db.member_channel_ids(&user_id, &team_id)
        })
        .await
    }

    async fn post_channel_id(&self, post_id: &str) -> Result<Option<String>> {
        let post_id = post_id.to_string();
        with_database(&self.db_path, move |db| db.post_channel_id(&post_id)).await
    }
}

#[async_trait]
impl ChannelProvisioner for LocalDirectory {
    async fn create_channel(&self, request: &NewChannel) -> Result<Channel> {
        let id = Uuid::new_v4().to_string();
        let channel = Channel {
            name: channel_name(&request.name, &id),
            id,
            team_id: request.team_id.clone(),
            display_name: request.display_name.clone(),
            channel_type: request.channel_type,
            total_msg_count: 0,
        };

        let mut members = vec![request.creator_user_id.clone()];
        for member in &request.member_ids {
            if !members.contains(member) {
                members.push(member.clone());
            }
        }

        let stored = channel.clone();
        with_database(&self.db_path, move |db| {
            if db.get_team(&stored.team_id)?.is_none() {
                return Err(RunError::NotFound {
                    entity: "Team",
                    id: stored.team_id.clone(),
                });
            }
            db.insert_channel(&stored, &members)
        })
        .await?;

        debug!(
            "Provisioned {} channel {} ({})",
            channel.channel_type, channel.name, channel.id
        );
        Ok(channel)
    }

    async fn archive_channel(&self, channel_id: &str) -> Result<()> {
        let channel_id = channel_id.to_string();
        with_database(&self.db_path, move |db| db.archive_channel(&channel_id)).await
    }
}

#[async_trait]
impl Notifier for LocalDirectory {
    async fn publish_run_created(&self, owner_user_id: &str, run: &PlaybookRun) -> Result<()> {
        info!(
            "playbook_run_created event for user {owner_user_id}: run {} in channel {}",
            run.id, run.channel_id
        );
        Ok(())
    }

    async fn ephemeral(&self, user_id: &str, channel_id: &str, message: &str) -> Result<()> {
        debug!("Ephemeral message for {user_id} in {channel_id}");
        self.insert_post(channel_id, user_id, message, true).await?;
        Ok(())
    }

    async fn status_posted(&self, run: &PlaybookRun, post: &StatusPost) -> Result<()> {
        let message = format!(
            "**Status update: {}**\n\n{}",
            post.status, post.message
        );
        self.insert_post(&run.channel_id, &post.author_user_id, &message, false)
            .await?;
        Ok(())
    }
}

/// URL-safe channel name: a slug of `base` plus a short unique suffix.
fn channel_name(base: &str, id: &str) -> String {
    let mut slug = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let suffix: String = id.chars().filter(|c| *c != '-').take(8).collect();
    if slug.is_empty() {
        suffix
    } else {
        format!("{slug}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::channel_name;

    #[test]
    fn test_channel_name_slug() {
        assert_eq!(
            channel_name("DB Outage: us-east!", "abcdef12-3456"),
            "db-outage-us-east-abcdef12"
        );
        assert_eq!(channel_name("!!!", "abcdef12-3456"), "abcdef12");
    }
}
