//! Run creation.
//!
//! Creation is a two-step saga: the channel is provisioned on the host, then
//! the run is stored. If storing fails the channel is archived again and the
//! caller gets [`RunError::RunNotSaved`] with the channel ID and the cause.

use jiff::Timestamp;
use log::{error, info, warn};
use uuid::Uuid;

use super::RunService;
use crate::{
    config::Settings,
    db::with_database,
    error::{Result, RunError},
    gate::FeatureGate,
    models::{Checklist, Playbook, PlaybookRun, TimelineEvent, TimelineEventType},
    oracle::{ChannelType, NewChannel},
    params::{CreateRun, Invocation},
};

/// Draft fields after the playbook template has been applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MergedDraft {
    pub description: String,
    pub checklists: Vec<Checklist>,
    pub invited_user_ids: Vec<String>,
    pub invited_group_ids: Vec<String>,
    pub channel_type: ChannelType,
}

/// Applies a playbook to a draft. Without a playbook the run gets a public
/// channel and no checklists or invitations.
pub(crate) fn merge_template(draft: &CreateRun, playbook: Option<&Playbook>) -> MergedDraft {
    let Some(playbook) = playbook else {
        return MergedDraft {
            description: draft.description.clone(),
            checklists: Vec::new(),
            invited_user_ids: Vec::new(),
            invited_group_ids: Vec::new(),
            channel_type: ChannelType::Public,
        };
    };

    let description = if draft.description.trim().is_empty() {
        playbook.description.clone()
    } else {
        draft.description.clone()
    };

    let (invited_user_ids, invited_group_ids) = if playbook.invite_users_enabled {
        (
            playbook.invited_user_ids.clone(),
            playbook.invited_group_ids.clone(),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    MergedDraft {
        description,
        checklists: playbook.checklists.clone(),
        invited_user_ids,
        invited_group_ids,
        channel_type: playbook.channel_type(),
    }
}

fn require_field(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        warn!("Rejected playbook run creation: {field} is empty");
        return Err(RunError::invalid_input(field).with_reason("must not be empty"));
    }
    Ok(())
}

impl RunService {
    /// Creates a run, its channel and its first timeline event.
    ///
    /// Validation and every permission check happen before anything is
    /// provisioned, so a rejected request leaves no trace.
    pub async fn create_run(
        &self,
        requester_id: &str,
        draft: &CreateRun,
        invocation: Invocation,
    ) -> Result<PlaybookRun> {
        require_field("name", &draft.name)?;
        require_field("owner_user_id", &draft.owner_user_id)?;
        require_field("team_id", &draft.team_id)?;

        let name = draft.name.trim();
        let team_id = draft.team_id.trim();
        let settings = self.config.snapshot();

        FeatureGate::new(&settings).check(team_id).inspect_err(|e| {
            warn!("Rejected playbook run creation in team {team_id}: {e}");
        })?;

        let resolver = self.resolver();
        if !resolver.can_view_team(requester_id, team_id).await? {
            warn!("User {requester_id} cannot view team {team_id}");
            return Err(RunError::forbidden(format!(
                "user {requester_id} cannot view team {team_id}"
            )));
        }

        let playbook = match draft.playbook_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                Some(self.playbook_for_run(requester_id, team_id, id).await?)
            }
            _ => None,
        };
        let merged = merge_template(draft, playbook.as_ref());

        if !resolver
            .can_create_channel(requester_id, team_id, merged.channel_type)
            .await?
        {
            warn!(
                "User {requester_id} cannot create a {} channel in team {team_id}",
                merged.channel_type
            );
            return Err(RunError::ChannelPermission {
                channel_type: merged.channel_type,
            });
        }

        let post_id = draft
            .post_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        if let Some(post_id) = post_id {
            self.require_post_readable(requester_id, post_id).await?;
        }

        let channel = self
            .provisioner
            .create_channel(&NewChannel {
                team_id: team_id.to_string(),
                name: name.to_string(),
                display_name: name.to_string(),
                channel_type: merged.channel_type,
                creator_user_id: requester_id.to_string(),
                member_ids: std::iter::once(draft.owner_user_id.clone())
                    .chain(merged.invited_user_ids.iter().cloned())
                    .collect(),
            })
            .await?;

        let run = self.new_run(
            &settings,
            requester_id,
            draft,
            merged,
            &channel.id,
            post_id,
        );
        let stored = run.clone();
        if let Err(e) = with_database(&self.db_path, move |db| db.create_run(&stored)).await {
            warn!("Failed to save playbook run for channel {}: {e}", channel.id);
            if let Err(archive_err) = self.provisioner.archive_channel(&channel.id).await {
                error!(
                    "Failed to archive channel {} after run creation failed: {archive_err}",
                    channel.id
                );
            }
            return Err(RunError::RunNotSaved {
                channel_id: channel.id,
                source: Box::new(e),
            });
        }

        info!(
            "Created playbook run {} ({}) in channel {}",
            run.id, run.name, run.channel_id
        );

        if let Err(e) = self
            .notifier
            .publish_run_created(&run.owner_user_id, &run)
            .await
        {
            warn!("Failed to publish run created event for {}: {e}", run.id);
        }

        if invocation == Invocation::Dialog {
            let message = format!(
                "Playbook run **{}** started in ~{}",
                run.name, channel.name
            );
            if let Err(e) = self
                .notifier
                .ephemeral(requester_id, &run.channel_id, &message)
                .await
            {
                warn!("Failed to send run acknowledgement to {requester_id}: {e}");
            }
        }

        Ok(run)
    }

    /// Loads the template and checks the requester may use it.
    async fn playbook_for_run(
        &self,
        requester_id: &str,
        team_id: &str,
        playbook_id: &str,
    ) -> Result<Playbook> {
        let playbook = self.get_playbook(playbook_id).await?;
        if playbook.team_id != team_id {
            warn!("Playbook {playbook_id} does not belong to team {team_id}");
            return Err(RunError::invalid_input("playbook_id")
                .with_reason(format!("playbook does not belong to team {team_id}")));
        }
        if !playbook.is_member(requester_id) {
            warn!("User {requester_id} is not a member of playbook {playbook_id}");
            return Err(RunError::forbidden(format!(
                "user {requester_id} is not a member of playbook {playbook_id}"
            )));
        }
        Ok(playbook)
    }

    async fn require_post_readable(&self, requester_id: &str, post_id: &str) -> Result<()> {
        let channel_id = self
            .oracle
            .post_channel_id(post_id)
            .await?
            .ok_or_else(|| RunError::NotFound {
                entity: "Post",
                id: post_id.to_string(),
            })?;
        if !self.resolver().can_read_channel(requester_id, &channel_id).await? {
            warn!("User {requester_id} cannot read the channel of post {post_id}");
            return Err(RunError::forbidden(format!(
                "user {requester_id} cannot read post {post_id}"
            )));
        }
        Ok(())
    }

    fn new_run(
        &self,
        settings: &Settings,
        requester_id: &str,
        draft: &CreateRun,
        merged: MergedDraft,
        channel_id: &str,
        post_id: Option<&str>,
    ) -> PlaybookRun {
        let now = Timestamp::now();
        let id = Uuid::new_v4().to_string();
        let status = settings.initial_status().to_string();
        let ended_at = settings.is_finished_status(&status).then_some(now);

        let created = TimelineEvent {
            id: Uuid::new_v4().to_string(),
            run_id: id.clone(),
            event_type: TimelineEventType::IncidentCreated,
            summary: format!("Run started by {requester_id}"),
            details: String::new(),
            subject_user_id: draft.owner_user_id.trim().to_string(),
            created_at: now,
        };

        PlaybookRun {
            id,
            name: draft.name.trim().to_string(),
            description: merged.description,
            owner_user_id: draft.owner_user_id.trim().to_string(),
            team_id: draft.team_id.trim().to_string(),
            channel_id: channel_id.to_string(),
            channel_public: merged.channel_type.is_public(),
            post_id: post_id.map(String::from),
            playbook_id: draft
                .playbook_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from),
            current_status: status,
            checklists: merged.checklists,
            status_posts: Vec::new(),
            timeline_events: vec![created],
            invited_user_ids: merged.invited_user_ids,
            invited_group_ids: merged.invited_group_ids,
            created_at: now,
            ended_at,
            last_status_update_at: None,
        }
    }
}
