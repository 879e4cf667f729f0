//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    models::{Playbook, PlaybookRun},
    service::{DialogOutcome, StatusUpdateResult},
};

/// Creation message followed by the created resource.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<PlaybookRun> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created playbook run with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Playbook> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created playbook with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for StatusUpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Updated status of playbook run {} to {}",
            self.run.id, self.post.status
        )?;
        match &self.reminder {
            Some(reminder) => writeln!(f, "Next reminder: {}", LocalDateTime(&reminder.due_at))?,
            None => writeln!(f, "No reminder scheduled")?,
        }
        writeln!(f)?;
        write!(f, "{}", self.run)
    }
}

impl fmt::Display for DialogOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogOutcome::Created(run) => write!(f, "{}", CreateResult::new(run.as_ref().clone())),
            DialogOutcome::FieldErrors(errors) => {
                writeln!(f, "The dialog has errors:")?;
                let mut fields: Vec<_> = errors.iter().collect();
                fields.sort();
                for (field, message) in fields {
                    writeln!(f, "- {field}: {message}")?;
                }
                Ok(())
            }
        }
    }
}
