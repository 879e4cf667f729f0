//! Teams, channels, memberships and posts of the local directory.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{parsed_column, timestamp_text};
use crate::{
    error::{DatabaseResultExt, Result, RunError},
    oracle::{Channel, Team},
};

const INSERT_TEAM_SQL: &str = "INSERT INTO teams (id, name, display_name) VALUES (?1, ?2, ?3)";
const SELECT_TEAM_SQL: &str = "SELECT id, name, display_name FROM teams WHERE id = ?1";
const UPSERT_TEAM_MEMBER_SQL: &str = "INSERT INTO team_members (team_id, user_id, \
     can_create_public, can_create_private) VALUES (?1, ?2, ?3, ?4) \
     ON CONFLICT (team_id, user_id) DO UPDATE SET can_create_public = excluded.can_create_public, \
     can_create_private = excluded.can_create_private";
const SELECT_TEAM_MEMBER_SQL: &str = "SELECT can_create_public, can_create_private \
     FROM team_members WHERE team_id = ?1 AND user_id = ?2";
const INSERT_CHANNEL_SQL: &str = "INSERT INTO channels (id, team_id, name, display_name, \
     channel_type, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_CHANNEL_SQL: &str = "SELECT c.id, c.team_id, c.name, c.display_name, \
     c.channel_type, (SELECT COUNT(*) FROM posts p WHERE p.channel_id = c.id AND p.ephemeral = 0) \
     FROM channels c WHERE c.id = ?1";
const ARCHIVE_CHANNEL_SQL: &str = "UPDATE channels SET archived = 1 WHERE id = ?1";
const SELECT_CHANNEL_ARCHIVED_SQL: &str = "SELECT archived FROM channels WHERE id = ?1";
const INSERT_CHANNEL_MEMBER_SQL: &str =
    "INSERT OR IGNORE INTO channel_members (channel_id, user_id) VALUES (?1, ?2)";
const SELECT_CHANNEL_MEMBER_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM channel_members WHERE channel_id = ?1 AND user_id = ?2)";
const COUNT_CHANNEL_MEMBERS_SQL: &str =
    "SELECT COUNT(*) FROM channel_members WHERE channel_id = ?1";
const SELECT_READABLE_CHANNELS_SQL: &str = "SELECT c.id FROM channels c \
     JOIN channel_members m ON m.channel_id = c.id WHERE c.team_id = ?1 AND m.user_id = ?2 \
     ORDER BY c.id";
const INSERT_ADMIN_SQL: &str = "INSERT OR IGNORE INTO system_admins (user_id) VALUES (?1)";
const SELECT_ADMIN_SQL: &str = "SELECT EXISTS(SELECT 1 FROM system_admins WHERE user_id = ?1)";
const INSERT_POST_SQL: &str = "INSERT INTO posts (id, channel_id, user_id, message, ephemeral, \
     created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_POST_CHANNEL_SQL: &str = "SELECT channel_id FROM posts WHERE id = ?1";

/// Channel-creation rights of a team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamMembership {
    pub can_create_public: bool,
    pub can_create_private: bool,
}

impl super::Database {
    pub fn create_team(&mut self, team: &Team) -> Result<()> {
        self.connection
            .execute(INSERT_TEAM_SQL, params![&team.id, &team.name, &team.display_name])
            .db_context("Failed to insert team")?;
        Ok(())
    }

    pub fn get_team(&self, team_id: &str) -> Result<Option<Team>> {
        self.connection
            .query_row(SELECT_TEAM_SQL, params![team_id], |row| {
                Ok(Team {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    display_name: row.get(2)?,
                })
            })
            .optional()
            .db_context("Failed to query team")
    }

    /// Adds a user to a team, or updates their channel-creation rights.
    pub fn upsert_team_member(
        &mut self,
        team_id: &str,
        user_id: &str,
        membership: TeamMembership,
    ) -> Result<()> {
        if self.get_team(team_id)?.is_none() {
            return Err(RunError::NotFound {
                entity: "Team",
                id: team_id.to_string(),
            });
        }
        self.connection
            .execute(
                UPSERT_TEAM_MEMBER_SQL,
                params![
                    team_id,
                    user_id,
                    membership.can_create_public,
                    membership.can_create_private
                ],
            )
            .db_context("Failed to upsert team member")?;
        Ok(())
    }

    pub fn get_team_membership(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> Result<Option<TeamMembership>> {
        self.connection
            .query_row(SELECT_TEAM_MEMBER_SQL, params![team_id, user_id], |row| {
                Ok(TeamMembership {
                    can_create_public: row.get(0)?,
                    can_create_private: row.get(1)?,
                })
            })
            .optional()
            .db_context("Failed to query team member")
    }

    /// Creates a channel and its initial members in one transaction.
    pub fn insert_channel(&mut self, channel: &Channel, member_ids: &[String]) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        tx.execute(
            INSERT_CHANNEL_SQL,
            params![
                &channel.id,
                &channel.team_id,
                &channel.name,
                &channel.display_name,
                channel.channel_type.as_str(),
                timestamp_text(Timestamp::now()),
            ],
        )
        .db_context("Failed to insert channel")?;

        for user_id in member_ids {
            tx.execute(INSERT_CHANNEL_MEMBER_SQL, params![&channel.id, user_id])
                .db_context("Failed to add channel member")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(())
    }

    pub fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>> {
        self.connection
            .query_row(SELECT_CHANNEL_SQL, params![channel_id], channel_from_row)
            .optional()
            .db_context("Failed to query channel")
    }

    /// Archived state of a channel, `None` when it does not exist.
    pub fn is_channel_archived(&self, channel_id: &str) -> Result<Option<bool>> {
        self.connection
            .query_row(SELECT_CHANNEL_ARCHIVED_SQL, params![channel_id], |row| {
                row.get(0)
            })
            .optional()
            .db_context("Failed to query channel")
    }

    pub fn archive_channel(&mut self, channel_id: &str) -> Result<()> {
        let updated = self
            .connection
            .execute(ARCHIVE_CHANNEL_SQL, params![channel_id])
            .db_context("Failed to archive channel")?;
        if updated == 0 {
            return Err(RunError::NotFound {
                entity: "Channel",
                id: channel_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn add_channel_member(&mut self, channel_id: &str, user_id: &str) -> Result<()> {
        if self.is_channel_archived(channel_id)?.is_none() {
            return Err(RunError::NotFound {
                entity: "Channel",
                id: channel_id.to_string(),
            });
        }
        self.connection
            .execute(INSERT_CHANNEL_MEMBER_SQL, params![channel_id, user_id])
            .db_context("Failed to add channel member")?;
        Ok(())
    }

    pub fn is_channel_member(&self, channel_id: &str, user_id: &str) -> Result<bool> {
        self.connection
            .query_row(SELECT_CHANNEL_MEMBER_SQL, params![channel_id, user_id], |row| {
                row.get(0)
            })
            .db_context("Failed to query channel member")
    }

    pub fn channel_member_count(&self, channel_id: &str) -> Result<i64> {
        self.connection
            .query_row(COUNT_CHANNEL_MEMBERS_SQL, params![channel_id], |row| {
                row.get(0)
            })
            .db_context("Failed to count channel members")
    }

    /// Channels of `team_id` that `user_id` is a member of.
    pub fn member_channel_ids(&self, user_id: &str, team_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_READABLE_CHANNELS_SQL)
            .db_context("Failed to prepare query")?;

        let ids = stmt
            .query_map(params![team_id, user_id], |row| row.get(0))
            .db_context("Failed to query member channels")?
            .collect::<std::result::Result<Vec<String>, _>>()
            .db_context("Failed to fetch member channels")?;

        Ok(ids)
    }

    pub fn add_system_admin(&mut self, user_id: &str) -> Result<()> {
        self.connection
            .execute(INSERT_ADMIN_SQL, params![user_id])
            .db_context("Failed to add system admin")?;
        Ok(())
    }

    pub fn is_system_admin(&self, user_id: &str) -> Result<bool> {
        self.connection
            .query_row(SELECT_ADMIN_SQL, params![user_id], |row| row.get(0))
            .db_context("Failed to query system admin")
    }

    /// Stores a post and returns its ID.
    pub fn insert_post(
        &mut self,
        channel_id: &str,
        user_id: &str,
        message: &str,
        ephemeral: bool,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.connection
            .execute(
                INSERT_POST_SQL,
                params![
                    &id,
                    channel_id,
                    user_id,
                    message,
                    ephemeral,
                    timestamp_text(Timestamp::now())
                ],
            )
            .db_context("Failed to insert post")?;
        Ok(id)
    }

    pub fn post_channel_id(&self, post_id: &str) -> Result<Option<String>> {
        self.connection
            .query_row(SELECT_POST_CHANNEL_SQL, params![post_id], |row| row.get(0))
            .optional()
            .db_context("Failed to query post")
    }
}

fn channel_from_row(row: &Row<'_>) -> rusqlite::Result<Channel> {
    Ok(Channel {
        id: row.get(0)?,
        team_id: row.get(1)?,
        name: row.get(2)?,
        display_name: row.get(3)?,
        channel_type: parsed_column(row, 4)?,
        total_msg_count: row.get(5)?,
    })
}
