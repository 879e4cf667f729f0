//! Team-scoped run listing.

use log::{debug, warn};

use super::RunService;
use crate::{
    db::with_database,
    error::{Result, RunError},
    gate::FeatureGate,
    models::{RunFilter, RunListResults},
    params::ListRuns,
};

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl RunService {
    /// Lists one page of the team's runs that the requester can view.
    ///
    /// A team with the feature turned off yields an empty result flagged
    /// `disabled` rather than an error.
    pub async fn list_runs(&self, requester_id: &str, params: &ListRuns) -> Result<RunListResults> {
        let team_id = params.team_id.trim();
        if team_id.is_empty() {
            return Err(RunError::invalid_input("team_id").with_reason("must not be empty"));
        }

        let settings = self.config.snapshot();
        let gate = FeatureGate::new(&settings);
        if !gate.is_licensed() {
            return Err(RunError::Unlicensed);
        }
        if !gate.allows(team_id) {
            debug!("Playbook runs disabled for team {team_id}");
            return Ok(RunListResults::disabled());
        }

        let resolver = self.resolver();
        if !resolver.can_view_team(requester_id, team_id).await? {
            warn!("User {requester_id} cannot view team {team_id}");
            return Err(RunError::forbidden(format!(
                "user {requester_id} cannot view team {team_id}"
            )));
        }

        let requester = resolver.requester_info(requester_id, team_id).await?;
        let filter = RunFilter {
            team_id: team_id.to_string(),
            owner_user_id: non_blank(params.owner_user_id.as_ref()),
            status: non_blank(params.status.as_ref()),
            search_term: non_blank(params.search_term.as_ref()),
            direction: params.direction,
            page: params.page,
            per_page: RunFilter::page_size(params.per_page),
        };

        let (page, per_page) = (filter.page, filter.per_page);
        let (items, total) =
            with_database(&self.db_path, move |db| db.list_runs(&filter, &requester)).await?;

        Ok(RunListResults::from_page(items, total, page, per_page))
    }
}
