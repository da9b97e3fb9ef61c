use crate::publisher::PublishErrorKind;
use async_trait::async_trait;

/// Callback surface for publisher lifecycle events. Implementations must
/// not block; they are invoked from the connection's own tasks.
#[async_trait]
pub trait PublisherListener: Send + Sync {
    /// Fired exactly once, on the transition to Ready
    async fn on_init_complete(&self);

    /// Fired on every fatal condition
    async fn on_error(&self, kind: PublishErrorKind, detail: String);
}
