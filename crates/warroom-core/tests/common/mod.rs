#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use warroom_core::{
    db::directory_queries::TeamMembership,
    oracle::{Channel, NewChannel},
    params::{CreatePlaybook, CreateRun, Invocation},
    ChannelProvisioner, LicenseTier, LocalDirectory, Notifier, Playbook, PlaybookRun, Result,
    RunError, RunService, RunServiceBuilder, Settings, StatusPost,
};

/// Notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    RunCreated { owner: String, run_id: String },
    Ephemeral { user: String, channel: String, message: String },
    StatusPosted { run_id: String, status: String },
}

/// Records notifications, optionally failing every delivery afterwards.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<Notification>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier lock poisoned").clone()
    }

    fn record(&self, event: Notification) -> Result<()> {
        self.events.lock().expect("notifier lock poisoned").push(event);
        if self.fail {
            return Err(RunError::host("notification delivery failed"));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish_run_created(&self, owner_user_id: &str, run: &PlaybookRun) -> Result<()> {
        self.record(Notification::RunCreated {
            owner: owner_user_id.to_string(),
            run_id: run.id.clone(),
        })
    }

    async fn ephemeral(&self, user_id: &str, channel_id: &str, message: &str) -> Result<()> {
        self.record(Notification::Ephemeral {
            user: user_id.to_string(),
            channel: channel_id.to_string(),
            message: message.to_string(),
        })
    }

    async fn status_posted(&self, run: &PlaybookRun, post: &StatusPost) -> Result<()> {
        self.record(Notification::StatusPosted {
            run_id: run.id.clone(),
            status: post.status.clone(),
        })
    }
}

/// Provisioner that hands out an already bound channel ID so storing the
/// run hits the unique channel constraint. Archive calls are recorded, not
/// forwarded.
pub struct ReusingProvisioner {
    pub channel: Channel,
    pub archived: Mutex<Vec<String>>,
}

#[async_trait]
impl ChannelProvisioner for ReusingProvisioner {
    async fn create_channel(&self, _request: &NewChannel) -> Result<Channel> {
        Ok(self.channel.clone())
    }

    async fn archive_channel(&self, channel_id: &str) -> Result<()> {
        self.archived
            .lock()
            .expect("provisioner lock poisoned")
            .push(channel_id.to_string());
        Ok(())
    }
}

pub fn licensed_settings() -> Settings {
    Settings {
        license: LicenseTier::Professional,
        ..Default::default()
    }
}

pub fn full_membership() -> TeamMembership {
    TeamMembership {
        can_create_public: true,
        can_create_private: true,
    }
}

/// A service over a temporary database with one team, `team_id`.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub directory: Arc<LocalDirectory>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: RunService,
    pub team_id: String,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_settings(licensed_settings()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        Self::build(settings, Arc::new(RecordingNotifier::default())).await
    }

    pub async fn with_notifier(notifier: RecordingNotifier) -> Self {
        Self::build(licensed_settings(), Arc::new(notifier)).await
    }

    async fn build(settings: Settings, notifier: Arc<RecordingNotifier>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let directory = Arc::new(LocalDirectory::new(&db_path));

        let service = RunServiceBuilder::new()
            .with_database_path(Some(&db_path))
            .with_oracle(directory.clone())
            .with_provisioner(directory.clone())
            .with_notifier(notifier.clone())
            .with_config(Arc::new(settings))
            .build()
            .await
            .expect("Failed to build service");

        let team = directory
            .create_team("ops", "Operations")
            .await
            .expect("Failed to create team");

        Self {
            temp_dir,
            directory,
            notifier,
            service,
            team_id: team.id,
        }
    }

    /// Builds a second service over the same database with another
    /// provisioner.
    pub async fn service_with_provisioner(
        &self,
        provisioner: Arc<dyn ChannelProvisioner>,
    ) -> RunService {
        RunServiceBuilder::new()
            .with_database_path(Some(self.service.db_path()))
            .with_oracle(self.directory.clone())
            .with_provisioner(provisioner)
            .with_notifier(self.notifier.clone())
            .with_config(Arc::new(licensed_settings()))
            .build()
            .await
            .expect("Failed to build service")
    }

    pub async fn join(&self, user_id: &str) {
        self.join_with(user_id, full_membership()).await;
    }

    pub async fn join_with(&self, user_id: &str, membership: TeamMembership) {
        self.directory
            .join_team(&self.team_id, user_id, membership)
            .await
            .expect("Failed to join team");
    }

    pub fn draft(&self, name: &str, owner: &str) -> CreateRun {
        CreateRun {
            name: name.to_string(),
            owner_user_id: owner.to_string(),
            team_id: self.team_id.clone(),
            ..Default::default()
        }
    }

    /// Creates a run owned by `owner`, who must already be a team member.
    pub async fn create_run(&self, name: &str, owner: &str) -> PlaybookRun {
        self.service
            .create_run(owner, &self.draft(name, owner), Invocation::Direct)
            .await
            .expect("Failed to create run")
    }

    /// Creates a run in a private channel via a private playbook.
    pub async fn create_private_run(&self, name: &str, owner: &str) -> PlaybookRun {
        let playbook = self.create_playbook(owner, false, false).await;
        let mut draft = self.draft(name, owner);
        draft.playbook_id = Some(playbook.id);
        self.service
            .create_run(owner, &draft, Invocation::Direct)
            .await
            .expect("Failed to create private run")
    }

    pub async fn create_playbook(
        &self,
        member: &str,
        public: bool,
        invite_users_enabled: bool,
    ) -> Playbook {
        self.service
            .create_playbook(&CreatePlaybook {
                team_id: self.team_id.clone(),
                title: "Incident response".to_string(),
                description: "Follow the incident process".to_string(),
                create_public_playbook_run: public,
                member_ids: vec![member.to_string()],
                invite_users_enabled,
                invited_user_ids: vec!["invitee".to_string()],
                invited_group_ids: vec!["oncall".to_string()],
                checklists: vec![warroom_core::Checklist {
                    title: "Triage".to_string(),
                    items: vec![
                        warroom_core::ChecklistItem::new("Page the on-call"),
                        warroom_core::ChecklistItem::new("Open a bridge"),
                    ],
                }],
            })
            .await
            .expect("Failed to create playbook")
    }
}
