//! Confirmation messages.

use std::fmt;

/// Success message for operations without a resource to show.
pub struct OperationStatus {
    pub message: String,
}

impl OperationStatus {
    pub fn success(message: String) -> Self {
        Self { message }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Success: {}", self.message)
    }
}
