//! Interactive dialog entry point for run creation.

use std::collections::HashMap;

use log::warn;

use super::RunService;
use crate::{
    error::{Result, RunError},
    models::PlaybookRun,
    params::{
        CreateRun, DialogState, DialogSubmission, Invocation, DIALOG_FIELD_DESCRIPTION,
        DIALOG_FIELD_NAME, DIALOG_FIELD_PLAYBOOK,
    },
};

/// Result of a dialog submission.
///
/// Field-level problems are reported back to the dialog instead of failing
/// the request, so the user can correct them in place.
#[derive(Debug, Clone)]
pub enum DialogOutcome {
    Created(Box<PlaybookRun>),
    /// Messages keyed by dialog field name
    FieldErrors(HashMap<String, String>),
}

impl RunService {
    /// Creates a run from a submitted dialog on behalf of `requester_id`.
    pub async fn submit_dialog(
        &self,
        requester_id: &str,
        submission: &DialogSubmission,
    ) -> Result<DialogOutcome> {
        if submission.user_id != requester_id {
            warn!(
                "Dialog submitted by {} for requester {requester_id}",
                submission.user_id
            );
            return Err(RunError::invalid_input("user_id").with_reason(
                "interactive dialog's userID must be the same as the requester's userID",
            ));
        }

        let state: DialogState = if submission.state.trim().is_empty() {
            DialogState::default()
        } else {
            serde_json::from_str(&submission.state).map_err(|e| {
                RunError::invalid_input("state").with_reason(format!("malformed dialog state: {e}"))
            })?
        };

        let field = |key: &str| submission.submission.get(key).cloned().unwrap_or_default();
        let playbook_id = field(DIALOG_FIELD_PLAYBOOK);
        let draft = CreateRun {
            name: field(DIALOG_FIELD_NAME),
            description: field(DIALOG_FIELD_DESCRIPTION),
            owner_user_id: requester_id.to_string(),
            team_id: submission.team_id.clone(),
            playbook_id: (!playbook_id.trim().is_empty()).then_some(playbook_id),
            post_id: state.post_id,
        };

        match self.create_run(requester_id, &draft, Invocation::Dialog).await {
            Ok(run) => Ok(DialogOutcome::Created(Box::new(run))),
            Err(RunError::InvalidInput { field, reason }) if field == "name" => Ok(
                DialogOutcome::FieldErrors(HashMap::from([(DIALOG_FIELD_NAME.to_string(), reason)])),
            ),
            Err(e @ RunError::ChannelPermission { .. }) => Ok(DialogOutcome::FieldErrors(
                HashMap::from([(DIALOG_FIELD_NAME.to_string(), e.to_string())]),
            )),
            Err(e) => Err(e),
        }
    }
}
