use async_trait::async_trait;

use crate::reminder::OwnerId;

/// Transport that puts a notification in front of a user.
///
/// Errors are reported back so the scheduler can log them; a failed delivery
/// never blocks or corrupts scheduling state and is not retried.
#[async_trait]
pub trait DeliveryChannel: Send + Sync + 'static {
    /// The main notification, sent at the reminder's scheduled moment.
    async fn deliver_primary(&self, owner: OwnerId, text: &str) -> anyhow::Result<()>;

    /// The nudge sent ten minutes after the primary.
    async fn deliver_follow_up(&self, owner: OwnerId, text: &str) -> anyhow::Result<()>;
}
