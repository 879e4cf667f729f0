use std::path::PathBuf;

use clap::{Parser, Subcommand};
use warroom_core::LicenseTier;

use crate::cli::{DirCommands, PlaybookCommands, RunCommands};

/// Command-line interface for warroom playbook runs
///
/// A playbook run is an incident record bound to one channel. Who can see
/// or change a run follows from that channel. The `run` commands act on
/// behalf of the user given with `--user` (or `WARROOM_USER`); `playbook`
/// and `dir` set up templates and the local directory of teams, channels
/// and members; `serve` exposes the run operations as an MCP server.
#[derive(Parser)]
#[command(version, about, name = "wr")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/warroom/warroom.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Settings file. Defaults to $XDG_CONFIG_HOME/warroom/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the license tier (unlicensed, professional, enterprise)
    #[arg(long, global = true)]
    pub license: Option<LicenseTier>,

    /// Enable runs only for this team; repeat for more teams
    #[arg(long = "enabled-team", global = true)]
    pub enabled_teams: Vec<String>,

    /// User the request is made on behalf of
    #[arg(long, global = true, env = "WARROOM_USER")]
    pub user: Option<String>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the warroom CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Create, inspect and update playbook runs
    #[command(alias = "r")]
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// Manage playbook templates
    #[command(alias = "p")]
    Playbook {
        #[command(subcommand)]
        command: PlaybookCommands,
    },
    /// Manage the local directory of teams, channels and members
    #[command(alias = "d")]
    Dir {
        #[command(subcommand)]
        command: DirCommands,
    },
    /// Start the MCP server on stdio
    Serve,
}
