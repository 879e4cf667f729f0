//! Authorization for playbook runs.
//!
//! Run visibility is derived entirely from the run's channel:
//!
//! 1. system admins see every run;
//! 2. anyone who can read the channel sees the run;
//! 3. if the channel is public, anyone who can list the team's channels sees
//!    the run;
//! 4. nobody else does.
//!
//! Managing a run additionally requires permission to post in its channel,
//! and admins get no bypass for that part. The same rules back every entry
//! point, including the SQL predicate the store uses for listing (see
//! [`crate::db::run_queries`]).

use log::warn;

use crate::{
    error::{Result, RunError},
    models::{PlaybookRun, RequesterInfo},
    oracle::{ChannelOracle, ChannelPermission, ChannelType, TeamPermission},
};

/// Answers VIEW and MANAGE questions through a [`ChannelOracle`].
pub struct AccessResolver<'a> {
    oracle: &'a dyn ChannelOracle,
}

impl<'a> AccessResolver<'a> {
    pub fn new(oracle: &'a dyn ChannelOracle) -> Self {
        Self { oracle }
    }

    /// Whether `user_id` may view `run`. First matching rule wins.
    pub async fn can_view(&self, user_id: &str, run: &PlaybookRun) -> Result<bool> {
        if self.oracle.is_system_admin(user_id).await? {
            return Ok(true);
        }

        if self.can_read_channel(user_id, &run.channel_id).await? {
            return Ok(true);
        }

        // Unknown channels are treated as private.
        let channel_public = self
            .oracle
            .get_channel(&run.channel_id)
            .await?
            .is_some_and(|channel| channel.channel_type.is_public());
        if channel_public {
            return self
                .oracle
                .has_team_permission(user_id, &run.team_id, TeamPermission::ListTeamChannels)
                .await;
        }

        Ok(false)
    }

    /// Whether `user_id` may change `run`: view plus post in its channel.
    pub async fn can_manage(&self, user_id: &str, run: &PlaybookRun) -> Result<bool> {
        Ok(self.can_view(user_id, run).await? && self.can_post(user_id, &run.channel_id).await?)
    }

    /// Fails with [`RunError::Forbidden`] unless `user_id` may view `run`.
    pub async fn require_view(&self, user_id: &str, run: &PlaybookRun) -> Result<()> {
        if self.can_view(user_id, run).await? {
            return Ok(());
        }
        warn!(
            "User {user_id} does not have permission to view playbook run {}",
            run.id
        );
        Err(RunError::forbidden(format!(
            "user {user_id} cannot view playbook run {}",
            run.id
        )))
    }

    pub async fn can_read_channel(&self, user_id: &str, channel_id: &str) -> Result<bool> {
        self.oracle
            .has_channel_permission(user_id, channel_id, ChannelPermission::ReadChannel)
            .await
    }

    pub async fn can_post(&self, user_id: &str, channel_id: &str) -> Result<bool> {
        self.oracle
            .has_channel_permission(user_id, channel_id, ChannelPermission::CreatePost)
            .await
    }

    pub async fn can_view_team(&self, user_id: &str, team_id: &str) -> Result<bool> {
        if self.oracle.is_system_admin(user_id).await? {
            return Ok(true);
        }
        self.oracle
            .has_team_permission(user_id, team_id, TeamPermission::ViewTeam)
            .await
    }

    pub async fn can_create_channel(
        &self,
        user_id: &str,
        team_id: &str,
        channel_type: ChannelType,
    ) -> Result<bool> {
        self.oracle
            .has_team_permission(user_id, team_id, TeamPermission::create_channel(channel_type))
            .await
    }

    /// Captures everything the list predicate needs about the requester.
    pub async fn requester_info(&self, user_id: &str, team_id: &str) -> Result<RequesterInfo> {
        let is_admin = self.oracle.is_system_admin(user_id).await?;
        let can_list_team_channels = self
            .oracle
            .has_team_permission(user_id, team_id, TeamPermission::ListTeamChannels)
            .await?;
        let readable_channel_ids = if is_admin {
            Vec::new()
        } else {
            self.oracle.readable_channel_ids(user_id, team_id).await?
        };

        Ok(RequesterInfo {
            user_id: user_id.to_string(),
            team_id: team_id.to_string(),
            is_admin,
            can_list_team_channels,
            readable_channel_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use async_trait::async_trait;
    use jiff::Timestamp;

    use super::*;
    use crate::oracle::Channel;

    #[derive(Default)]
    struct FakeOracle {
        admins: HashSet<String>,
        channel_perms: HashSet<(String, String, ChannelPermission)>,
        team_perms: HashSet<(String, String, TeamPermission)>,
        channels: HashMap<String, Channel>,
    }

    impl FakeOracle {
        fn with_channel(mut self, id: &str, channel_type: ChannelType) -> Self {
            self.channels.insert(
                id.to_string(),
                Channel {
                    id: id.to_string(),
                    team_id: "team".to_string(),
                    name: id.to_string(),
                    display_name: id.to_string(),
                    channel_type,
                    total_msg_count: 0,
                },
            );
            self
        }

        fn grant_channel(mut self, user: &str, channel: &str, perm: ChannelPermission) -> Self {
            self.channel_perms
                .insert((user.to_string(), channel.to_string(), perm));
            self
        }

        fn grant_team(mut self, user: &str, perm: TeamPermission) -> Self {
            self.team_perms
                .insert((user.to_string(), "team".to_string(), perm));
            self
        }

        fn admin(mut self, user: &str) -> Self {
            self.admins.insert(user.to_string());
            self
        }
    }

    #[async_trait]
    impl ChannelOracle for FakeOracle {
        async fn is_system_admin(&self, user_id: &str) -> Result<bool> {
            Ok(self.admins.contains(user_id))
        }

        async fn has_channel_permission(
            &self,
            user_id: &str,
            channel_id: &str,
            permission: ChannelPermission,
        ) -> Result<bool> {
            Ok(self.channel_perms.contains(&(
                user_id.to_string(),
                channel_id.to_string(),
                permission,
            )))
        }

        async fn has_team_permission(
            &self,
            user_id: &str,
            team_id: &str,
            permission: TeamPermission,
        ) -> Result<bool> {
            Ok(self
                .team_perms
                .contains(&(user_id.to_string(), team_id.to_string(), permission)))
        }

        async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>> {
            Ok(self.channels.get(channel_id).cloned())
        }

        async fn get_team(&self, _team_id: &str) -> Result<Option<crate::oracle::Team>> {
            Ok(None)
        }

        async fn channel_member_count(&self, _channel_id: &str) -> Result<i64> {
            Ok(0)
        }

        async fn readable_channel_ids(&self, user_id: &str, _team_id: &str) -> Result<Vec<String>> {
            Ok(self
                .channel_perms
                .iter()
                .filter(|(u, _, p)| u == user_id && *p == ChannelPermission::ReadChannel)
                .map(|(_, c, _)| c.clone())
                .collect())
        }

        async fn post_channel_id(&self, _post_id: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn run_in(channel_id: &str) -> PlaybookRun {
        PlaybookRun {
            id: "run".to_string(),
            name: "Outage".to_string(),
            description: String::new(),
            owner_user_id: "owner".to_string(),
            team_id: "team".to_string(),
            channel_id: channel_id.to_string(),
            channel_public: false,
            post_id: None,
            playbook_id: None,
            current_status: "Active".to_string(),
            checklists: Vec::new(),
            status_posts: Vec::new(),
            timeline_events: Vec::new(),
            invited_user_ids: Vec::new(),
            invited_group_ids: Vec::new(),
            created_at: Timestamp::now(),
            ended_at: None,
            last_status_update_at: None,
        }
    }

    #[tokio::test]
    async fn test_admin_views_everything() {
        let oracle = FakeOracle::default()
            .with_channel("private", ChannelType::Private)
            .admin("root");
        let resolver = AccessResolver::new(&oracle);

        assert!(resolver
            .can_view("root", &run_in("private"))
            .await
            .expect("Failed to resolve"));
        assert!(resolver
            .can_view("root", &run_in("missing"))
            .await
            .expect("Failed to resolve"));
    }

    #[tokio::test]
    async fn test_private_run_requires_channel_read() {
        let oracle = FakeOracle::default()
            .with_channel("private", ChannelType::Private)
            .grant_team("bob", TeamPermission::ListTeamChannels)
            .grant_team("bob", TeamPermission::ViewTeam)
            .grant_channel("carol", "private", ChannelPermission::ReadChannel);
        let resolver = AccessResolver::new(&oracle);
        let run = run_in("private");

        assert!(!resolver.can_view("bob", &run).await.expect("Failed to resolve"));
        assert!(resolver.can_view("carol", &run).await.expect("Failed to resolve"));
        assert!(matches!(
            resolver.require_view("bob", &run).await,
            Err(RunError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_public_run_visible_to_team_channel_listers() {
        let oracle = FakeOracle::default()
            .with_channel("town-square", ChannelType::Public)
            .grant_team("dave", TeamPermission::ListTeamChannels);
        let resolver = AccessResolver::new(&oracle);
        let run = run_in("town-square");

        assert!(resolver.can_view("dave", &run).await.expect("Failed to resolve"));
        assert!(!resolver.can_view("erin", &run).await.expect("Failed to resolve"));
    }

    #[tokio::test]
    async fn test_manage_requires_post_even_for_admins() {
        let oracle = FakeOracle::default()
            .with_channel("private", ChannelType::Private)
            .admin("root")
            .grant_channel("carol", "private", ChannelPermission::ReadChannel)
            .grant_channel("carol", "private", ChannelPermission::CreatePost)
            .grant_channel("frank", "private", ChannelPermission::ReadChannel);
        let resolver = AccessResolver::new(&oracle);
        let run = run_in("private");

        assert!(!resolver.can_manage("root", &run).await.expect("Failed to resolve"));
        assert!(resolver.can_manage("carol", &run).await.expect("Failed to resolve"));
        assert!(!resolver.can_manage("frank", &run).await.expect("Failed to resolve"));
    }

    #[tokio::test]
    async fn test_requester_info_snapshot() {
        let oracle = FakeOracle::default()
            .grant_team("carol", TeamPermission::ListTeamChannels)
            .grant_channel("carol", "ops", ChannelPermission::ReadChannel);
        let resolver = AccessResolver::new(&oracle);

        let info = resolver
            .requester_info("carol", "team")
            .await
            .expect("Failed to build requester info");
        assert!(!info.is_admin);
        assert!(info.can_list_team_channels);
        assert_eq!(info.readable_channel_ids, vec!["ops".to_string()]);
    }

    #[tokio::test]
    async fn test_view_team_admin_override() {
        let oracle = FakeOracle::default()
            .admin("root")
            .grant_team("bob", TeamPermission::ViewTeam);
        let resolver = AccessResolver::new(&oracle);

        assert!(resolver.can_view_team("root", "team").await.expect("Failed to resolve"));
        assert!(resolver.can_view_team("bob", "team").await.expect("Failed to resolve"));
        assert!(!resolver.can_view_team("erin", "team").await.expect("Failed to resolve"));
    }
}
