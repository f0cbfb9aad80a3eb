//! Progress reporting

use async_trait::async_trait;

/// Receives human-readable progress lines from a running workflow
///
/// Delivery is best effort: a notifier never fails the workflow.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: String);
}
