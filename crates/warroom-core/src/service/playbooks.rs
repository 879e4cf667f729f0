//! Playbook template administration.

use jiff::Timestamp;
use log::info;
use uuid::Uuid;

use super::RunService;
use crate::{
    db::with_database,
    error::{Result, RunError},
    models::Playbook,
    params::CreatePlaybook,
};

impl RunService {
    pub async fn create_playbook(&self, params: &CreatePlaybook) -> Result<Playbook> {
        if params.title.trim().is_empty() {
            return Err(RunError::invalid_input("title").with_reason("must not be empty"));
        }
        if params.team_id.trim().is_empty() {
            return Err(RunError::invalid_input("team_id").with_reason("must not be empty"));
        }

        let playbook = Playbook {
            id: Uuid::new_v4().to_string(),
            team_id: params.team_id.trim().to_string(),
            title: params.title.trim().to_string(),
            description: params.description.clone(),
            create_public_playbook_run: params.create_public_playbook_run,
            member_ids: params.member_ids.clone(),
            invite_users_enabled: params.invite_users_enabled,
            invited_user_ids: params.invited_user_ids.clone(),
            invited_group_ids: params.invited_group_ids.clone(),
            checklists: params.checklists.clone(),
            created_at: Timestamp::now(),
        };

        let stored = playbook.clone();
        with_database(&self.db_path, move |db| db.create_playbook(&stored)).await?;
        info!("Created playbook {} ({})", playbook.title, playbook.id);
        Ok(playbook)
    }

    pub async fn get_playbook(&self, playbook_id: &str) -> Result<Playbook> {
        let id = playbook_id.to_string();
        with_database(&self.db_path, move |db| db.get_playbook(&id))
            .await?
            .ok_or_else(|| RunError::NotFound {
                entity: "Playbook",
                id: playbook_id.to_string(),
            })
    }

    pub async fn list_playbooks(&self, team_id: &str) -> Result<Vec<Playbook>> {
        let team_id = team_id.to_string();
        with_database(&self.db_path, move |db| db.list_playbooks(&team_id)).await
    }
}
