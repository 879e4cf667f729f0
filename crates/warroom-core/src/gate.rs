//! License and per-team enablement check.

use crate::{
    config::Settings,
    error::{Result, RunError},
};

/// Decides whether run operations are allowed, from one settings snapshot.
pub struct FeatureGate<'a> {
    settings: &'a Settings,
}

impl<'a> FeatureGate<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn is_licensed(&self) -> bool {
        self.settings.license.is_licensed()
    }

    /// True when the installation is licensed and `team_id` is enabled.
    pub fn allows(&self, team_id: &str) -> bool {
        self.is_licensed() && self.team_enabled(team_id)
    }

    fn team_enabled(&self, team_id: &str) -> bool {
        self.settings.enabled_teams.is_empty()
            || self.settings.enabled_teams.iter().any(|t| t == team_id)
    }

    /// Like [`FeatureGate::allows`] but reports why the gate is closed.
    pub fn check(&self, team_id: &str) -> Result<()> {
        if !self.is_licensed() {
            return Err(RunError::Unlicensed);
        }
        if !self.team_enabled(team_id) {
            return Err(RunError::FeatureDisabled {
                team_id: team_id.to_string(),
            });
        }
        Ok(())
    }
}
