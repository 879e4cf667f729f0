//! MCP server for warroom
//!
//! Exposes the run operations as MCP tools over stdio. Every tool acts on
//! behalf of the user the server was started for; results are the same
//! markdown the CLI prints.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};
use warroom_core::{
    display::{AutocompleteItems, CreateResult},
    params::{ChannelId, CreateRun, DialogSubmission, Invocation, ListRuns, RunId, UpdateStatus},
    RunService,
};

pub mod errors;

use errors::{to_dialog_error, to_mcp_error};

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(output: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

/// MCP server for warroom
#[derive(Clone)]
pub struct WarroomMcpServer {
    service: Arc<RunService>,
    requester: Arc<str>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WarroomMcpServer {
    /// Creates a server acting as `requester`.
    pub fn new(service: RunService, requester: &str) -> Self {
        Self {
            service: Arc::new(service),
            requester: Arc::from(requester),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "get_run",
        description = "Show a playbook run by ID: status, owner, channel, checklists, the latest status update and the timeline. Fails with a forbidden error if you cannot view the run's channel."
    )]
    async fn get_run(&self, Parameters(params): Parameters<RunId>) -> McpResult {
        debug!("get_run: {params:?}");
        let run = self
            .service
            .get_run(&self.requester, &params.run_id)
            .await
            .map_err(|e| to_mcp_error("Failed to get playbook run", &e))?;
        text(run)
    }

    #[tool(
        name = "get_run_by_channel",
        description = "Show the playbook run bound to a channel. Returns not found both when the channel has no run and when you are not allowed to see it."
    )]
    async fn get_run_by_channel(&self, Parameters(params): Parameters<ChannelId>) -> McpResult {
        debug!("get_run_by_channel: {params:?}");
        let run = self
            .service
            .get_run_by_channel(&self.requester, &params.channel_id)
            .await
            .map_err(|e| to_mcp_error("Failed to get playbook run", &e))?;
        text(run)
    }

    #[tool(
        name = "get_run_metadata",
        description = "Show live channel details of a run: channel name and display name, team name, member count and number of posts."
    )]
    async fn get_run_metadata(&self, Parameters(params): Parameters<RunId>) -> McpResult {
        debug!("get_run_metadata: {params:?}");
        let metadata = self
            .service
            .get_metadata(&self.requester, &params.run_id)
            .await
            .map_err(|e| to_mcp_error("Failed to get run metadata", &e))?;
        text(metadata)
    }

    #[tool(
        name = "list_runs",
        description = "List a team's playbook runs you can view. Supports paging (page is zero-based, per_page defaults to 100 and is capped at 1000), filtering by owner_user_id, status and search_term, and direction asc or desc by creation time. Teams without the feature report that runs are disabled."
    )]
    async fn list_runs(&self, Parameters(params): Parameters<ListRuns>) -> McpResult {
        debug!("list_runs: {params:?}");
        let results = self
            .service
            .list_runs(&self.requester, &params)
            .await
            .map_err(|e| to_mcp_error("Failed to list playbook runs", &e))?;
        text(results)
    }

    #[tool(
        name = "create_run",
        description = "Start a playbook run. Requires name, owner_user_id and team_id; playbook_id applies a template (channel visibility, checklists, invitations) and post_id links the post the run started from. A channel is created for the run."
    )]
    async fn create_run(&self, Parameters(params): Parameters<CreateRun>) -> McpResult {
        debug!("create_run: {params:?}");
        let run = self
            .service
            .create_run(&self.requester, &params, Invocation::Direct)
            .await
            .map_err(|e| to_mcp_error("Failed to create playbook run", &e))?;
        text(CreateResult::new(run))
    }

    #[tool(
        name = "submit_run_dialog",
        description = "Submit the start-run dialog. user_id must be your own user. Fields are playbookID, incidentName and incidentDescription; state may carry {\"post_id\": \"...\"}. Problems with the name or channel permissions come back as per-field errors."
    )]
    async fn submit_run_dialog(
        &self,
        Parameters(params): Parameters<DialogSubmission>,
    ) -> McpResult {
        debug!("submit_run_dialog: {params:?}");
        let outcome = self
            .service
            .submit_dialog(&self.requester, &params)
            .await
            .map_err(|e| to_dialog_error(&e))?;
        text(outcome)
    }

    #[tool(
        name = "update_run_status",
        description = "Post a status update to a run. status must exactly match a configured label (by default Active, Resolved or Archived); message and description must not be blank. reminder_in_seconds > 0 schedules the next reminder and replaces any pending one, 0 clears it. You must be able to post in the run's channel."
    )]
    async fn update_run_status(&self, Parameters(params): Parameters<UpdateStatus>) -> McpResult {
        debug!("update_run_status: {params:?}");
        let result = self
            .service
            .update_status(&self.requester, &params.run_id, &params.options)
            .await
            .map_err(|e| to_mcp_error("Failed to update run status", &e))?;
        text(result)
    }

    #[tool(
        name = "checklist_autocomplete",
        description = "List the checklist items of the run in a channel as \"<checklist> <item>\" index pairs, with the checklist title as hint and the item title as help text."
    )]
    async fn checklist_autocomplete(
        &self,
        Parameters(params): Parameters<ChannelId>,
    ) -> McpResult {
        debug!("checklist_autocomplete: {params:?}");
        let items = self
            .service
            .checklist_autocomplete(&self.requester, &params.channel_id)
            .await
            .map_err(|e| to_mcp_error("Failed to list checklist items", &e))?;
        text(AutocompleteItems(items))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for WarroomMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "warroom".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"warroom tracks playbook runs: incident records that each live in their own channel.

## Access
- You can see a run if you can read its channel, if its channel is public and you belong to the team, or if you are a system admin.
- Changing a run (posting a status update) also requires permission to post in its channel.

## Workflow
1. Start a run with `create_run` (or `submit_run_dialog`), optionally from a playbook.
2. Inspect it with `get_run`, `get_run_by_channel` and `get_run_metadata`.
3. Post progress with `update_run_status`, scheduling the next reminder.
4. Find runs with `list_runs`; use `checklist_autocomplete` for checklist item references.

## Errors
Error data carries `kind` (not_found, forbidden, bad_request, conflict, internal) and an HTTP-style `status`."#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: WarroomMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting warroom MCP server on stdio for {}", server.requester);
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
