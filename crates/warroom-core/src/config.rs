//! Installation settings.
//!
//! Settings are read once into a [`Settings`] value and handed to the service
//! through a [`ConfigSource`]. Every operation takes a single snapshot at its
//! start so a concurrent reload never splits one request across two configs.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RunError};

/// License tier of the installation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LicenseTier {
    #[default]
    Unlicensed,
    Professional,
    Enterprise,
}

impl LicenseTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseTier::Unlicensed => "unlicensed",
            LicenseTier::Professional => "professional",
            LicenseTier::Enterprise => "enterprise",
        }
    }

    /// Whether the tier meets the minimum needed for playbook runs.
    pub fn is_licensed(&self) -> bool {
        *self >= LicenseTier::Professional
    }
}

impl fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unlicensed" | "none" => Ok(LicenseTier::Unlicensed),
            "professional" | "e10" => Ok(LicenseTier::Professional),
            "enterprise" | "e20" => Ok(LicenseTier::Enterprise),
            _ => Err(format!("Invalid license tier: {s}")),
        }
    }
}

/// Settings that shape run behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "SettingsFile")]
pub struct Settings {
    pub license: LicenseTier,
    /// Teams the feature is enabled for. Empty enables every team.
    pub enabled_teams: Vec<String>,
    /// Recognized status labels. The first one is given to new runs.
    pub statuses: Vec<String>,
    /// Statuses that mark a run as ended.
    pub finished_statuses: Vec<String>,
}

const DEFAULT_STATUSES: [&str; 3] = ["Active", "Resolved", "Archived"];
const DEFAULT_FINISHED_STATUSES: [&str; 1] = ["Archived"];

fn default_statuses() -> Vec<String> {
    DEFAULT_STATUSES.iter().map(ToString::to_string).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            license: LicenseTier::Unlicensed,
            enabled_teams: Vec::new(),
            statuses: default_statuses(),
            finished_statuses: DEFAULT_FINISHED_STATUSES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// On-disk form of [`Settings`]. Keys left out take their defaults.
#[derive(Deserialize)]
struct SettingsFile {
    #[serde(default)]
    license: LicenseTier,
    #[serde(default)]
    enabled_teams: Vec<String>,
    #[serde(default = "default_statuses")]
    statuses: Vec<String>,
    #[serde(default)]
    finished_statuses: Option<Vec<String>>,
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        // Without explicit finished statuses, keep the defaults the
        // configured set still contains.
        let finished_statuses = file.finished_statuses.unwrap_or_else(|| {
            DEFAULT_FINISHED_STATUSES
                .into_iter()
                .filter(|finished| file.statuses.iter().any(|s| s.as_str() == *finished))
                .map(ToString::to_string)
                .collect()
        });
        Self {
            license: file.license,
            enabled_teams: file.enabled_teams,
            statuses: file.statuses,
            finished_statuses,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from
    /// `$XDG_CONFIG_HOME/warroom/config.json` when no path is given.
    ///
    /// A missing default file yields [`Settings::default`]; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| RunError::FileSystem {
            path: path.clone(),
            source: e,
        })?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    fn default_config_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("warroom").find_config_file("config.json")
    }

    /// Rejects settings the service could not operate with.
    pub fn validate(&self) -> Result<()> {
        if self.statuses.iter().all(|s| s.trim().is_empty()) {
            return Err(RunError::Configuration {
                message: "at least one status must be configured".to_string(),
            });
        }
        if let Some(unknown) = self
            .finished_statuses
            .iter()
            .find(|s| !self.statuses.contains(s))
        {
            return Err(RunError::Configuration {
                message: format!("finished status '{unknown}' is not a configured status"),
            });
        }
        Ok(())
    }

    /// Status given to newly created runs.
    pub fn initial_status(&self) -> &str {
        self.statuses
            .iter()
            .find(|s| !s.trim().is_empty())
            .map_or("", String::as_str)
    }

    pub fn is_known_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }

    pub fn is_finished_status(&self, status: &str) -> bool {
        self.finished_statuses.iter().any(|s| s == status)
    }
}

/// Supplies the settings snapshot for one operation.
pub trait ConfigSource: Send + Sync {
    fn snapshot(&self) -> Settings;
}

impl ConfigSource for Settings {
    fn snapshot(&self) -> Settings {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_default_settings_fail_closed() {
        let settings = Settings::default();
        assert_eq!(settings.license, LicenseTier::Unlicensed);
        assert!(!settings.license.is_licensed());
        assert_eq!(settings.initial_status(), "Active");
        assert!(settings.is_finished_status("Archived"));
    }

    #[test]
    fn test_license_ordering() {
        assert!(LicenseTier::Professional.is_licensed());
        assert!(LicenseTier::Enterprise.is_licensed());
        assert_eq!("E20".parse::<LicenseTier>(), Ok(LicenseTier::Enterprise));
        assert!("gold".parse::<LicenseTier>().is_err());
    }

    #[test]
    fn test_status_matching_is_exact() {
        let settings = Settings::default();
        assert!(settings.is_known_status("Active"));
        assert!(!settings.is_known_status("active"));
        assert!(!settings.is_known_status("Arrrrrrrctive"));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, r#"{{"license": "enterprise", "enabled_teams": ["t1"]}}"#)
            .expect("Failed to write config");

        let settings = Settings::load(Some(file.path())).expect("Failed to load settings");
        assert_eq!(settings.license, LicenseTier::Enterprise);
        assert_eq!(settings.enabled_teams, vec!["t1".to_string()]);
        assert_eq!(settings.statuses.len(), 3);
    }

    #[test]
    fn test_load_custom_statuses_without_finished() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(
            file,
            r#"{{"license": "professional", "statuses": ["Open", "Closed"]}}"#
        )
        .expect("Failed to write config");

        let settings = Settings::load(Some(file.path())).expect("Failed to load settings");
        assert_eq!(settings.statuses, vec!["Open".to_string(), "Closed".to_string()]);
        assert!(settings.finished_statuses.is_empty());
        assert_eq!(settings.initial_status(), "Open");
    }

    #[test]
    fn test_load_keeps_default_finished_status_when_configured() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, r#"{{"statuses": ["Open", "Archived"]}}"#).expect("Failed to write config");

        let settings = Settings::load(Some(file.path())).expect("Failed to load settings");
        assert!(settings.is_finished_status("Archived"));
    }

    #[test]
    fn test_load_rejects_unknown_finished_status() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(
            file,
            r#"{{"statuses": ["Open"], "finished_statuses": ["Closed"]}}"#
        )
        .expect("Failed to write config");

        let error = Settings::load(Some(file.path())).expect_err("Expected invalid config");
        assert!(matches!(error, RunError::Configuration { .. }));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let error = Settings::load(Some(Path::new("/nonexistent/warroom.json")))
            .expect_err("Expected missing file error");
        assert!(matches!(error, RunError::FileSystem { .. }));
    }
}
