//! Single-run lookups.

use log::warn;

use super::RunService;
use crate::{
    db::with_database,
    error::{Result, RunError},
    gate::FeatureGate,
    models::{AutocompleteItem, PlaybookRun, Reminder, RunMetadata},
};

impl RunService {
    /// Fetches a run the requester can view.
    pub async fn get_run(&self, requester_id: &str, run_id: &str) -> Result<PlaybookRun> {
        let run = self.load_run(run_id).await?;
        FeatureGate::new(&self.config.snapshot()).check(&run.team_id)?;
        self.resolver().require_view(requester_id, &run).await?;
        Ok(run)
    }

    /// Fetches the run bound to a channel.
    ///
    /// A requester who cannot view the run gets the same NotFound as for a
    /// channel without a run.
    pub async fn get_run_by_channel(
        &self,
        requester_id: &str,
        channel_id: &str,
    ) -> Result<PlaybookRun> {
        let not_found = || RunError::NotFound {
            entity: "Playbook run for channel",
            id: channel_id.to_string(),
        };

        let run = self.run_for_channel(channel_id).await?.ok_or_else(not_found)?;
        FeatureGate::new(&self.config.snapshot()).check(&run.team_id)?;

        if !self.resolver().can_view(requester_id, &run).await? {
            warn!(
                "User {requester_id} does not have permission to view the run in channel {channel_id}"
            );
            return Err(not_found());
        }
        Ok(run)
    }

    /// Channel and team details of a run, read live from the host.
    pub async fn get_metadata(&self, requester_id: &str, run_id: &str) -> Result<RunMetadata> {
        let run = self.get_run(requester_id, run_id).await?;

        let channel = self
            .oracle
            .get_channel(&run.channel_id)
            .await?
            .ok_or_else(|| RunError::host(format!("channel {} not found", run.channel_id)))?;
        let team = self
            .oracle
            .get_team(&run.team_id)
            .await?
            .ok_or_else(|| RunError::host(format!("team {} not found", run.team_id)))?;
        let num_members = self.oracle.channel_member_count(&run.channel_id).await?;

        Ok(RunMetadata {
            channel_name: channel.name,
            channel_display_name: channel.display_name,
            team_name: team.name,
            num_members,
            total_posts: channel.total_msg_count,
        })
    }

    /// Checklist items of the run in `channel_id`, for slash-command
    /// completion.
    pub async fn checklist_autocomplete(
        &self,
        requester_id: &str,
        channel_id: &str,
    ) -> Result<Vec<AutocompleteItem>> {
        let run = self
            .run_for_channel(channel_id)
            .await?
            .ok_or_else(|| RunError::NotFound {
                entity: "Playbook run for channel",
                id: channel_id.to_string(),
            })?;
        FeatureGate::new(&self.config.snapshot()).check(&run.team_id)?;
        self.resolver().require_view(requester_id, &run).await?;

        let items = run
            .checklists
            .iter()
            .enumerate()
            .flat_map(|(ci, checklist)| {
                checklist
                    .items
                    .iter()
                    .enumerate()
                    .map(move |(ii, item)| AutocompleteItem {
                        item: format!("{ci} {ii}"),
                        hint: checklist.title.clone(),
                        help_text: item.title.clone(),
                    })
            })
            .collect();
        Ok(items)
    }

    /// The run's pending reminder, if one is scheduled.
    pub async fn pending_reminder(
        &self,
        requester_id: &str,
        run_id: &str,
    ) -> Result<Option<Reminder>> {
        let run = self.get_run(requester_id, run_id).await?;
        with_database(&self.db_path, move |db| db.get_reminder(&run.id)).await
    }

    async fn run_for_channel(&self, channel_id: &str) -> Result<Option<PlaybookRun>> {
        let channel_id = channel_id.to_string();
        with_database(&self.db_path, move |db| {
            match db.get_run_id_for_channel(&channel_id)? {
                Some(id) => db.get_run(&id),
                None => Ok(None),
            }
        })
        .await
    }
}
