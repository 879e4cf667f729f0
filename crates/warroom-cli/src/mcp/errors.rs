//! Mapping of run errors onto MCP errors.
//!
//! Every error carries `{"kind", "status"}` data so clients can act on the
//! status contract. Internal failures are logged here and reach the client
//! only as a generic message.

use log::error;
use rmcp::ErrorData;
use serde_json::json;
use warroom_core::{ErrorKind, RunError};

fn error_data(kind: ErrorKind) -> Option<serde_json::Value> {
    Some(json!({ "kind": kind.as_str(), "status": kind.status_code() }))
}

/// Converts a run error, prefixing internal failures with `context`.
pub fn to_mcp_error(context: &str, err: &RunError) -> ErrorData {
    let kind = err.kind();
    match kind {
        ErrorKind::NotFound => ErrorData::resource_not_found(err.to_string(), error_data(kind)),
        ErrorKind::BadRequest => ErrorData::invalid_params(err.to_string(), error_data(kind)),
        ErrorKind::Forbidden | ErrorKind::Conflict => {
            ErrorData::invalid_request(err.to_string(), error_data(kind))
        }
        ErrorKind::Internal => internal(context, err),
    }
}

/// Dialog submissions only distinguish bad requests from everything else.
pub fn to_dialog_error(err: &RunError) -> ErrorData {
    match err.kind() {
        ErrorKind::BadRequest => to_mcp_error("Failed to submit dialog", err),
        _ => internal("Failed to submit dialog", err),
    }
}

fn internal(context: &str, err: &RunError) -> ErrorData {
    error!("{context}: {err}");
    ErrorData::internal_error(
        format!("{context}: internal error"),
        error_data(ErrorKind::Internal),
    )
}
