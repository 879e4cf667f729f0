//! Best-effort delivery of run events to users and channels.

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{PlaybookRun, StatusPost},
};

/// Outbound notifications. Failures never undo the operation that caused
/// them; the service logs and carries on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Real-time "run created" event addressed to the owner.
    async fn publish_run_created(&self, owner_user_id: &str, run: &PlaybookRun) -> Result<()>;

    /// Message visible only to `user_id` in `channel_id`.
    async fn ephemeral(&self, user_id: &str, channel_id: &str, message: &str) -> Result<()>;

    /// Human-readable copy of a status update, posted in the run's channel.
    async fn status_posted(&self, run: &PlaybookRun, post: &StatusPost) -> Result<()>;
}

/// Notifier that drops everything.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn publish_run_created(&self, _owner_user_id: &str, _run: &PlaybookRun) -> Result<()> {
        Ok(())
    }

    async fn ephemeral(&self, _user_id: &str, _channel_id: &str, _message: &str) -> Result<()> {
        Ok(())
    }

    async fn status_posted(&self, _run: &PlaybookRun, _post: &StatusPost) -> Result<()> {
        Ok(())
    }
}
