//! Out-of-band notification side channel.

use async_trait::async_trait;

/// Fire-and-forget notifier invoked by tool implementations.
///
/// `notify` never fails from the caller's point of view: transport errors,
/// missing credentials and non-success responses are handled (logged) inside
/// the implementation and the call returns normally.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, text: &str);
}
