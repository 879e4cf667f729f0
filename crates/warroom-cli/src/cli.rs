//! Command-line argument structures and their handlers.
//!
//! Each command has a clap wrapper that converts into the core parameter
//! type, so clap attributes stay out of `warroom-core`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → RunService
//! ```
//!
//! Conversions that need the requester (the run owner defaults to it, the
//! dialog is submitted as it) use `into_params` instead of `From`.

use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use warroom_core::{
    db::directory_queries::TeamMembership,
    display::{AutocompleteItems, CreateResult, OperationStatus, Playbooks},
    models::SortDirection,
    params::{
        CreatePlaybook, CreateRun, DialogState, DialogSubmission, Invocation, ListRuns,
        StatusUpdateOptions, UpdateStatus, DIALOG_FIELD_DESCRIPTION, DIALOG_FIELD_NAME,
        DIALOG_FIELD_PLAYBOOK,
    },
    Checklist, ChecklistItem, LocalDirectory, RunService,
};

use crate::renderer::TerminalRenderer;

// ============================================================================
// Run commands
// ============================================================================

/// Start a new playbook run
#[derive(Args)]
pub struct CreateRunArgs {
    /// Name of the run, also used for its channel
    pub name: String,
    /// Team the run belongs to
    #[arg(short, long)]
    pub team: String,
    /// Owner of the run; defaults to the requesting user
    #[arg(short, long)]
    pub owner: Option<String>,
    #[arg(short, long, help = "Description; defaults to the playbook's")]
    pub description: Option<String>,
    /// Playbook to start the run from
    #[arg(short, long)]
    pub playbook: Option<String>,
    /// Post the run is started from
    #[arg(long)]
    pub post: Option<String>,
}

impl CreateRunArgs {
    pub fn into_params(self, requester: &str) -> CreateRun {
        CreateRun {
            name: self.name,
            description: self.description.unwrap_or_default(),
            owner_user_id: self.owner.unwrap_or_else(|| requester.to_string()),
            team_id: self.team,
            playbook_id: self.playbook,
            post_id: self.post,
        }
    }
}

/// Submit the "start run" dialog
///
/// Field problems (a missing name, a channel the user may not create) are
/// reported per field instead of failing the command.
#[derive(Args)]
pub struct DialogArgs {
    /// Team the dialog was opened in
    #[arg(short, long)]
    pub team: String,
    #[arg(short, long, default_value = "")]
    pub name: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    #[arg(short, long)]
    pub playbook: Option<String>,
    /// Post the dialog was opened from
    #[arg(long)]
    pub post: Option<String>,
}

impl DialogArgs {
    pub fn into_params(self, requester: &str) -> Result<DialogSubmission> {
        let state = match self.post {
            Some(post_id) => serde_json::to_string(&DialogState {
                post_id: Some(post_id),
            })
            .context("Failed to encode dialog state")?,
            None => String::new(),
        };

        let mut submission = HashMap::from([
            (DIALOG_FIELD_NAME.to_string(), self.name),
            (DIALOG_FIELD_DESCRIPTION.to_string(), self.description),
        ]);
        if let Some(playbook_id) = self.playbook {
            submission.insert(DIALOG_FIELD_PLAYBOOK.to_string(), playbook_id);
        }

        Ok(DialogSubmission {
            user_id: requester.to_string(),
            team_id: self.team,
            state,
            submission,
        })
    }
}

#[derive(Args)]
pub struct RunIdArgs {
    #[arg(help = "ID of the playbook run")]
    pub run_id: String,
}

#[derive(Args)]
pub struct ChannelIdArgs {
    #[arg(help = "ID of the channel bound to the run")]
    pub channel_id: String,
}

/// List a team's playbook runs
///
/// Only runs the requesting user can view are listed.
#[derive(Args)]
pub struct ListRunsArgs {
    /// Team to list runs for
    #[arg(short, long)]
    pub team: String,
    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    /// Runs per page; 0 uses the default of 100
    #[arg(long, default_value_t = 0)]
    pub per_page: u32,
    #[arg(short, long, help = "Only runs owned by this user")]
    pub owner: Option<String>,
    #[arg(short, long, help = "Only runs currently in this status")]
    pub status: Option<String>,
    #[arg(long, help = "Only runs whose name contains this text")]
    pub search: Option<String>,
    /// Sort by creation time: asc or desc
    #[arg(long, default_value = "desc")]
    pub direction: SortDirection,
}

impl From<ListRunsArgs> for ListRuns {
    fn from(val: ListRunsArgs) -> Self {
        ListRuns {
            team_id: val.team,
            page: val.page,
            per_page: val.per_page,
            owner_user_id: val.owner,
            status: val.status,
            search_term: val.search,
            direction: val.direction,
        }
    }
}

/// Post a status update
///
/// The status must be one of the configured labels. A positive
/// `--reminder` schedules the next reminder that many seconds from now and
/// replaces any pending one; 0 clears it.
#[derive(Args)]
pub struct StatusArgs {
    #[arg(help = "ID of the playbook run")]
    pub run_id: String,
    #[arg(short, long, help = "New status, e.g. Active or Resolved")]
    pub status: String,
    #[arg(short, long, help = "Update message posted in the run's channel")]
    pub message: String,
    #[arg(short, long, help = "New description of the run")]
    pub description: String,
    #[arg(short, long, default_value_t = 0, help = "Seconds until the next reminder")]
    pub reminder: i64,
}

impl From<StatusArgs> for UpdateStatus {
    fn from(val: StatusArgs) -> Self {
        UpdateStatus {
            run_id: val.run_id,
            options: StatusUpdateOptions {
                status: val.status,
                message: val.message,
                description: val.description,
                reminder_in_seconds: val.reminder,
            },
        }
    }
}

#[derive(Subcommand)]
pub enum RunCommands {
    /// Start a new playbook run
    #[command(alias = "c")]
    Create(CreateRunArgs),
    /// Submit the "start run" dialog
    Dialog(DialogArgs),
    /// Show a run
    #[command(alias = "s")]
    Show(RunIdArgs),
    /// Show the run bound to a channel
    Channel(ChannelIdArgs),
    /// Show channel and team details of a run
    Metadata(RunIdArgs),
    /// List a team's runs
    #[command(alias = "l")]
    List(ListRunsArgs),
    /// Post a status update
    #[command(alias = "u")]
    Status(StatusArgs),
    /// List checklist items of the run in a channel
    Autocomplete(ChannelIdArgs),
    /// Show the pending reminder of a run
    Reminder(RunIdArgs),
}

// ============================================================================
// Playbook commands
// ============================================================================

/// Parses `Title:first item|second item` into a checklist.
fn parse_checklist(value: &str) -> std::result::Result<Checklist, String> {
    let (title, items) = value.split_once(':').unwrap_or((value, ""));
    let title = title.trim();
    if title.is_empty() {
        return Err("checklist title must not be empty".to_string());
    }
    Ok(Checklist {
        title: title.to_string(),
        items: items
            .split('|')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ChecklistItem::new)
            .collect(),
    })
}

/// Create a playbook
#[derive(Args)]
pub struct CreatePlaybookArgs {
    /// Title of the playbook
    pub title: String,
    /// Team the playbook belongs to
    #[arg(short, long)]
    pub team: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Runs of this playbook get private channels
    #[arg(long)]
    pub private: bool,
    /// Users allowed to start runs, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub members: Vec<String>,
    /// Users invited to every run, comma-separated; enables invitations
    #[arg(long, value_delimiter = ',')]
    pub invite_users: Vec<String>,
    /// Groups invited to every run, comma-separated; enables invitations
    #[arg(long, value_delimiter = ',')]
    pub invite_groups: Vec<String>,
    /// Checklist as `Title:first item|second item`; repeatable
    #[arg(short, long, value_parser = parse_checklist)]
    pub checklist: Vec<Checklist>,
}

impl From<CreatePlaybookArgs> for CreatePlaybook {
    fn from(val: CreatePlaybookArgs) -> Self {
        CreatePlaybook {
            team_id: val.team,
            title: val.title,
            description: val.description,
            create_public_playbook_run: !val.private,
            member_ids: val.members,
            invite_users_enabled: !val.invite_users.is_empty() || !val.invite_groups.is_empty(),
            invited_user_ids: val.invite_users,
            invited_group_ids: val.invite_groups,
            checklists: val.checklist,
        }
    }
}

#[derive(Args)]
pub struct PlaybookIdArgs {
    #[arg(help = "ID of the playbook")]
    pub playbook_id: String,
}

#[derive(Args)]
pub struct TeamArgs {
    #[arg(short, long, help = "ID of the team")]
    pub team: String,
}

#[derive(Subcommand)]
pub enum PlaybookCommands {
    /// Create a playbook
    #[command(alias = "c")]
    Create(CreatePlaybookArgs),
    /// Show a playbook
    #[command(alias = "s")]
    Show(PlaybookIdArgs),
    /// List a team's playbooks
    #[command(alias = "l")]
    List(TeamArgs),
}

// ============================================================================
// Directory commands
// ============================================================================

#[derive(Args)]
pub struct CreateTeamArgs {
    /// Unique team name
    pub name: String,
    #[arg(long, help = "Display name; defaults to the name")]
    pub display_name: Option<String>,
}

/// Add a user to a team
///
/// Members may create public and private channels unless restricted.
#[derive(Args)]
pub struct JoinTeamArgs {
    pub team_id: String,
    pub user_id: String,
    #[arg(long, help = "Do not allow creating public channels")]
    pub no_public_channels: bool,
    #[arg(long, help = "Do not allow creating private channels")]
    pub no_private_channels: bool,
}

impl From<&JoinTeamArgs> for TeamMembership {
    fn from(val: &JoinTeamArgs) -> Self {
        TeamMembership {
            can_create_public: !val.no_public_channels,
            can_create_private: !val.no_private_channels,
        }
    }
}

#[derive(Args)]
pub struct JoinChannelArgs {
    pub channel_id: String,
    pub user_id: String,
}

#[derive(Args)]
pub struct UserArgs {
    pub user_id: String,
}

#[derive(Args)]
pub struct PostArgs {
    pub channel_id: String,
    pub message: String,
}

#[derive(Subcommand)]
pub enum DirCommands {
    /// Create a team
    CreateTeam(CreateTeamArgs),
    /// Add a user to a team or change their channel rights
    JoinTeam(JoinTeamArgs),
    /// Add a user to a channel
    JoinChannel(JoinChannelArgs),
    /// Make a user a system admin
    GrantAdmin(UserArgs),
    /// Post a message as the requesting user
    Post(PostArgs),
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs CLI commands against a service and renders the results.
pub struct Cli {
    service: RunService,
    directory: Arc<LocalDirectory>,
    renderer: TerminalRenderer,
    user: Option<String>,
}

impl Cli {
    pub fn new(
        service: RunService,
        directory: Arc<LocalDirectory>,
        renderer: TerminalRenderer,
        user: Option<String>,
    ) -> Self {
        Self {
            service,
            directory,
            renderer,
            user,
        }
    }

    fn requester(&self) -> Result<&str> {
        self.user
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .ok_or_else(|| anyhow!("No user given; pass --user or set WARROOM_USER"))
    }

    pub async fn handle_run_command(&self, command: RunCommands) -> Result<()> {
        let requester = self.requester()?;
        let output = match command {
            RunCommands::Create(args) => {
                let run = self
                    .service
                    .create_run(requester, &args.into_params(requester), Invocation::Direct)
                    .await
                    .context("Failed to create playbook run")?;
                CreateResult::new(run).to_string()
            }
            RunCommands::Dialog(args) => self
                .service
                .submit_dialog(requester, &args.into_params(requester)?)
                .await
                .context("Failed to submit dialog")?
                .to_string(),
            RunCommands::Show(args) => self
                .service
                .get_run(requester, &args.run_id)
                .await
                .with_context(|| format!("Failed to get playbook run {}", args.run_id))?
                .to_string(),
            RunCommands::Channel(args) => self
                .service
                .get_run_by_channel(requester, &args.channel_id)
                .await
                .with_context(|| format!("Failed to get run for channel {}", args.channel_id))?
                .to_string(),
            RunCommands::Metadata(args) => self
                .service
                .get_metadata(requester, &args.run_id)
                .await
                .with_context(|| format!("Failed to get metadata of run {}", args.run_id))?
                .to_string(),
            RunCommands::List(args) => self
                .service
                .list_runs(requester, &args.into())
                .await
                .context("Failed to list playbook runs")?
                .to_string(),
            RunCommands::Status(args) => {
                let UpdateStatus { run_id, options } = args.into();
                self.service
                    .update_status(requester, &run_id, &options)
                    .await
                    .with_context(|| format!("Failed to update status of run {run_id}"))?
                    .to_string()
            }
            RunCommands::Autocomplete(args) => {
                let items = self
                    .service
                    .checklist_autocomplete(requester, &args.channel_id)
                    .await
                    .context("Failed to list checklist items")?;
                AutocompleteItems(items).to_string()
            }
            RunCommands::Reminder(args) => {
                match self
                    .service
                    .pending_reminder(requester, &args.run_id)
                    .await
                    .with_context(|| format!("Failed to get reminder of run {}", args.run_id))?
                {
                    Some(reminder) => format!("{reminder}\n"),
                    None => "No reminder scheduled\n".to_string(),
                }
            }
        };
        self.renderer.render(&output)
    }

    pub async fn handle_playbook_command(&self, command: PlaybookCommands) -> Result<()> {
        let output = match command {
            PlaybookCommands::Create(args) => {
                let playbook = self
                    .service
                    .create_playbook(&args.into())
                    .await
                    .context("Failed to create playbook")?;
                CreateResult::new(playbook).to_string()
            }
            PlaybookCommands::Show(args) => self
                .service
                .get_playbook(&args.playbook_id)
                .await
                .with_context(|| format!("Failed to get playbook {}", args.playbook_id))?
                .to_string(),
            PlaybookCommands::List(args) => {
                let playbooks = self
                    .service
                    .list_playbooks(&args.team)
                    .await
                    .context("Failed to list playbooks")?;
                Playbooks(playbooks).to_string()
            }
        };
        self.renderer.render(&output)
    }

    pub async fn handle_dir_command(&self, command: DirCommands) -> Result<()> {
        let status = match command {
            DirCommands::CreateTeam(args) => {
                let display_name = args.display_name.as_deref().unwrap_or(&args.name);
                let team = self
                    .directory
                    .create_team(&args.name, display_name)
                    .await
                    .context("Failed to create team")?;
                OperationStatus::success(format!("Created team {} with ID: {}", team.name, team.id))
            }
            DirCommands::JoinTeam(args) => {
                self.directory
                    .join_team(&args.team_id, &args.user_id, TeamMembership::from(&args))
                    .await
                    .context("Failed to join team")?;
                OperationStatus::success(format!(
                    "User {} joined team {}",
                    args.user_id, args.team_id
                ))
            }
            DirCommands::JoinChannel(args) => {
                self.directory
                    .join_channel(&args.channel_id, &args.user_id)
                    .await
                    .context("Failed to join channel")?;
                OperationStatus::success(format!(
                    "User {} joined channel {}",
                    args.user_id, args.channel_id
                ))
            }
            DirCommands::GrantAdmin(args) => {
                self.directory
                    .grant_system_admin(&args.user_id)
                    .await
                    .context("Failed to grant system admin")?;
                OperationStatus::success(format!("User {} is a system admin", args.user_id))
            }
            DirCommands::Post(args) => {
                let requester = self.requester()?;
                let post_id = self
                    .directory
                    .create_post(&args.channel_id, requester, &args.message)
                    .await
                    .context("Failed to create post")?;
                OperationStatus::success(format!("Created post with ID: {post_id}"))
            }
        };
        self.renderer.render(&format!("{status}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_checklist() {
        let checklist = parse_checklist("Triage: Page the on-call | Open a bridge |")
            .expect("checklist should parse");
        assert_eq!(checklist.title, "Triage");
        assert_eq!(
            checklist
                .items
                .iter()
                .map(|i| i.title.as_str())
                .collect::<Vec<_>>(),
            vec!["Page the on-call", "Open a bridge"]
        );

        let bare = parse_checklist("Wrap-up").expect("title alone should parse");
        assert!(bare.items.is_empty());

        assert!(parse_checklist(" :item").is_err());
    }

    #[test]
    fn test_create_run_owner_defaults_to_requester() {
        let args = CreateRunArgs {
            name: "Outage".to_string(),
            team: "t1".to_string(),
            owner: None,
            description: None,
            playbook: None,
            post: None,
        };
        let params = args.into_params("alice");
        assert_eq!(params.owner_user_id, "alice");
        assert_eq!(params.description, "");
    }

    #[test]
    fn test_dialog_state_carries_post() {
        let args = DialogArgs {
            team: "t1".to_string(),
            name: "Outage".to_string(),
            description: String::new(),
            playbook: None,
            post: Some("p1".to_string()),
        };
        let submission = args.into_params("alice").expect("dialog should encode");
        assert_eq!(submission.user_id, "alice");
        assert_eq!(submission.state, r#"{"post_id":"p1"}"#);
        assert!(!submission.submission.contains_key(DIALOG_FIELD_PLAYBOOK));
    }
}
