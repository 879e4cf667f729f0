//! warroom CLI application
//!
//! Command-line and MCP front end for playbook runs, backed by the local
//! directory in the same SQLite database.

mod args;
mod cli;
mod mcp;
mod renderer;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, WarroomMcpServer};
use renderer::TerminalRenderer;
use warroom_core::{LocalDirectory, RunServiceBuilder, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        config,
        license,
        enabled_teams,
        user,
        no_color,
        command,
    } = Args::parse();

    let mut settings = Settings::load(config.as_deref()).context("Failed to load settings")?;
    if let Some(license) = license {
        settings.license = license;
    }
    if !enabled_teams.is_empty() {
        settings.enabled_teams = enabled_teams;
    }
    settings.validate().context("Invalid settings")?;

    let db_path = match database_file {
        Some(path) => path,
        None => RunServiceBuilder::default_database_path()
            .context("Failed to resolve database path")?,
    };
    let directory = Arc::new(LocalDirectory::new(&db_path));

    let service = RunServiceBuilder::new()
        .with_database_path(Some(&db_path))
        .with_host(directory.clone())
        .with_config(Arc::new(settings))
        .build()
        .await
        .context("Failed to initialize run service")?;

    info!("warroom started with database {}", db_path.display());

    match command {
        Commands::Serve => {
            let Some(requester) = user.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
                bail!("The MCP server needs a user; pass --user or set WARROOM_USER");
            };
            run_stdio_server(WarroomMcpServer::new(service, requester))
                .await
                .context("MCP server failed")
        }
        Commands::Run { command } => {
            Cli::new(service, directory, TerminalRenderer::new(!no_color), user)
                .handle_run_command(command)
                .await
        }
        Commands::Playbook { command } => {
            Cli::new(service, directory, TerminalRenderer::new(!no_color), user)
                .handle_playbook_command(command)
                .await
        }
        Commands::Dir { command } => {
            Cli::new(service, directory, TerminalRenderer::new(!no_color), user)
                .handle_dir_command(command)
                .await
        }
    }
}
