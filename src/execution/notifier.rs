use crate::Result;
use async_trait::async_trait;

/// Sink for human-readable trade messages
///
/// Delivery failures never change a decision; callers log and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        tracing::info!(target: "rotabot::notify", "📣 {}", message);
        Ok(())
    }
}

/// Send a notification, logging instead of propagating any failure
pub async fn notify_quietly(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.notify(message).await {
        tracing::warn!("Notification failed: {}", e);
    }
}
