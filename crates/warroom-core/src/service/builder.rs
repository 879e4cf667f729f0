//! Builder for creating and configuring RunService instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use super::RunService;
use crate::{
    config::{ConfigSource, Settings},
    db::with_database,
    error::{Result, RunError},
    notify::{NoopNotifier, Notifier},
    oracle::{ChannelOracle, ChannelProvisioner},
};

/// Builder for creating and configuring RunService instances.
#[derive(Default)]
pub struct RunServiceBuilder {
    database_path: Option<PathBuf>,
    oracle: Option<Arc<dyn ChannelOracle>>,
    provisioner: Option<Arc<dyn ChannelProvisioner>>,
    notifier: Option<Arc<dyn Notifier>>,
    config: Option<Arc<dyn ConfigSource>>,
}

impl RunServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/warroom/warroom.db` or `~/.local/share/warroom/warroom.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn ChannelOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_provisioner(mut self, provisioner: Arc<dyn ChannelProvisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Uses one host object as oracle, provisioner and notifier.
    pub fn with_host<H>(self, host: Arc<H>) -> Self
    where
        H: ChannelOracle + ChannelProvisioner + Notifier + 'static,
    {
        self.with_oracle(host.clone())
            .with_provisioner(host.clone())
            .with_notifier(host)
    }

    pub fn with_config(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the configured service.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Configuration` if no oracle or provisioner was set
    /// Returns `RunError::FileSystem` if the database directory cannot be created
    /// Returns `RunError::Database` if database initialization fails
    pub async fn build(self) -> Result<RunService> {
        let oracle = self.oracle.ok_or_else(|| RunError::Configuration {
            message: "a channel oracle is required".to_string(),
        })?;
        let provisioner = self.provisioner.ok_or_else(|| RunError::Configuration {
            message: "a channel provisioner is required".to_string(),
        })?;
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier));
        let config = self
            .config
            .unwrap_or_else(|| Arc::new(Settings::default()));

        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RunError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        with_database(&db_path, |_db| Ok(())).await?;

        Ok(RunService {
            db_path,
            oracle,
            provisioner,
            notifier,
            config,
        })
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    pub fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("warroom")
            .place_data_file("warroom.db")
            .map_err(|e| RunError::XdgDirectory(e.to_string()))
    }
}
