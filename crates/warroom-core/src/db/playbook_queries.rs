//! Playbook template storage.

use rusqlite::{params, OptionalExtension, Row};

use super::{json_column, timestamp_column, timestamp_text};
use crate::{
    error::{DatabaseResultExt, Result},
    models::Playbook,
};

const PLAYBOOK_COLUMNS: &str = "id, team_id, title, description, create_public_playbook_run, \
     member_ids, invite_users_enabled, invited_user_ids, invited_group_ids, checklists, created_at";
const INSERT_PLAYBOOK_SQL: &str = "INSERT INTO playbooks (id, team_id, title, description, \
     create_public_playbook_run, member_ids, invite_users_enabled, invited_user_ids, \
     invited_group_ids, checklists, created_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

impl super::Database {
    pub fn create_playbook(&mut self, playbook: &Playbook) -> Result<()> {
        self.connection
            .execute(
                INSERT_PLAYBOOK_SQL,
                params![
                    &playbook.id,
                    &playbook.team_id,
                    &playbook.title,
                    &playbook.description,
                    playbook.create_public_playbook_run,
                    serde_json::to_string(&playbook.member_ids)?,
                    playbook.invite_users_enabled,
                    serde_json::to_string(&playbook.invited_user_ids)?,
                    serde_json::to_string(&playbook.invited_group_ids)?,
                    serde_json::to_string(&playbook.checklists)?,
                    timestamp_text(playbook.created_at),
                ],
            )
            .db_context("Failed to insert playbook")?;
        Ok(())
    }

    pub fn get_playbook(&self, id: &str) -> Result<Option<Playbook>> {
        self.connection
            .query_row(
                &format!("SELECT {PLAYBOOK_COLUMNS} FROM playbooks WHERE id = ?1"),
                params![id],
                playbook_from_row,
            )
            .optional()
            .db_context("Failed to query playbook")
    }

    /// Lists a team's playbooks, oldest first.
    pub fn list_playbooks(&self, team_id: &str) -> Result<Vec<Playbook>> {
        let mut stmt = self
            .connection
            .prepare(&format!(
                "SELECT {PLAYBOOK_COLUMNS} FROM playbooks WHERE team_id = ?1 ORDER BY created_at, id"
            ))
            .db_context("Failed to prepare query")?;

        let playbooks = stmt
            .query_map(params![team_id], playbook_from_row)
            .db_context("Failed to query playbooks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch playbooks")?;

        Ok(playbooks)
    }
}

fn playbook_from_row(row: &Row<'_>) -> rusqlite::Result<Playbook> {
    Ok(Playbook {
        id: row.get(0)?,
        team_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        create_public_playbook_run: row.get(4)?,
        member_ids: json_column(row, 5)?,
        invite_users_enabled: row.get(6)?,
        invited_user_ids: json_column(row, 7)?,
        invited_group_ids: json_column(row, 8)?,
        checklists: json_column(row, 9)?,
        created_at: timestamp_column(row, 10)?,
    })
}
