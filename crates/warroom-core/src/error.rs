//! Error types for playbook run operations.
//!
//! Every failure the service can report is a [`RunError`]. Callers that need
//! to translate failures for a transport (exit codes, MCP error codes, HTTP
//! statuses) classify them through [`RunError::kind`] instead of matching on
//! individual variants.

use std::path::PathBuf;

use thiserror::Error;

use crate::oracle::ChannelType;

/// Comprehensive error type for all run operations.
#[derive(Error, Debug)]
pub enum RunError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Requested entity does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },
    /// The requester lacks the capability the operation needs
    #[error("permissions error: {reason}")]
    Forbidden { reason: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// The requester may not create a channel of the visibility the run needs
    #[error("You are not able to create a {channel_type} channel: permissions error")]
    ChannelPermission { channel_type: ChannelType },
    /// The run feature is not enabled for the team
    #[error("Playbook runs are not enabled for team {team_id}")]
    FeatureDisabled { team_id: String },
    /// The installation is below the minimum license tier
    #[error("Playbook runs require a professional or enterprise license")]
    Unlicensed,
    /// A uniqueness constraint rejected the write
    #[error("Duplicate entry: {message}")]
    DuplicateEntry { message: String },
    /// The channel was provisioned but the run could not be stored
    #[error("Failed to save run for channel {channel_id}: {source}")]
    RunNotSaved {
        channel_id: String,
        #[source]
        source: Box<RunError>,
    },
    /// A host collaborator (directory, provisioner) failed
    #[error("Host error: {message}")]
    Host { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Coarse classification of a [`RunError`] for transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    BadRequest,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::BadRequest => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    ///
    /// Constraint violations become [`RunError::DuplicateEntry`] so callers
    /// can tell a lost race on a unique key from a broken database.
    pub fn with_source(self, source: rusqlite::Error) -> RunError {
        if is_constraint_violation(&source) {
            return RunError::DuplicateEntry {
                message: format!("{}: {source}", self.message),
            };
        }
        RunError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> RunError {
        RunError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl RunError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        RunError::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn run_not_found(id: impl Into<String>) -> Self {
        RunError::NotFound {
            entity: "Playbook run",
            id: id.into(),
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        RunError::Host {
            message: message.into(),
        }
    }

    /// Classifies the error for transports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::NotFound { .. } => ErrorKind::NotFound,
            RunError::Forbidden { .. } | RunError::Unlicensed => ErrorKind::Forbidden,
            RunError::InvalidInput { .. }
            | RunError::ChannelPermission { .. }
            | RunError::FeatureDisabled { .. } => ErrorKind::BadRequest,
            RunError::DuplicateEntry { .. } => ErrorKind::Conflict,
            RunError::RunNotSaved { source, .. } => match source.kind() {
                ErrorKind::Conflict => ErrorKind::Conflict,
                _ => ErrorKind::Internal,
            },
            RunError::Database { .. }
            | RunError::Host { .. }
            | RunError::FileSystem { .. }
            | RunError::XdgDirectory(_)
            | RunError::Serialization { .. }
            | RunError::Configuration { .. } => ErrorKind::Internal,
        }
    }
}

fn is_constraint_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| RunError::database(message).with_source(e))
    }
}

/// Result type alias for run operations
pub type Result<T> = std::result::Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_status_codes() {
        assert_eq!(RunError::run_not_found("r1").kind().status_code(), 404);
        assert_eq!(RunError::forbidden("nope").kind().status_code(), 403);
        assert_eq!(RunError::Unlicensed.kind().status_code(), 403);
        assert_eq!(
            RunError::invalid_input("name")
                .with_reason("must not be empty")
                .kind()
                .status_code(),
            400
        );
        assert_eq!(
            RunError::FeatureDisabled {
                team_id: "t1".to_string()
            }
            .kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(RunError::host("down").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_channel_permission_message() {
        let public = RunError::ChannelPermission {
            channel_type: ChannelType::Public,
        };
        assert_eq!(
            public.to_string(),
            "You are not able to create a public channel: permissions error"
        );

        let private = RunError::ChannelPermission {
            channel_type: ChannelType::Private,
        };
        assert_eq!(
            private.to_string(),
            "You are not able to create a private channel: permissions error"
        );
    }

    #[test]
    fn test_run_not_saved_inherits_conflict() {
        let duplicate = RunError::RunNotSaved {
            channel_id: "c1".to_string(),
            source: Box::new(RunError::DuplicateEntry {
                message: "channel_id".to_string(),
            }),
        };
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);

        let broken = RunError::RunNotSaved {
            channel_id: "c1".to_string(),
            source: Box::new(RunError::Configuration {
                message: "join".to_string(),
            }),
        };
        assert_eq!(broken.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_constraint_violation_maps_to_duplicate() {
        let source = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed: playbook_runs.channel_id".to_string()),
        );
        let error = RunError::database("Failed to insert run").with_source(source);
        assert!(matches!(error, RunError::DuplicateEntry { .. }));
    }
}
