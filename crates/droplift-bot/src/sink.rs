//! Outbound chat messages

use crate::telegram::TelegramClient;
use async_trait::async_trait;
use droplift_core::Notifier;
use std::sync::Arc;

/// Where replies and progress lines are delivered
///
/// Delivery is best effort. Failures are logged and never reach the caller.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str);
}

#[async_trait]
impl ChatSink for TelegramClient {
    async fn send(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.send_message(chat_id, text).await {
            tracing::warn!("Failed to send message to chat {}: {}", chat_id, e);
        }
    }
}

/// Forwards workflow progress to one chat
pub struct ChatNotifier {
    sink: Arc<dyn ChatSink>,
    chat_id: i64,
}

impl ChatNotifier {
    pub fn new(sink: Arc<dyn ChatSink>, chat_id: i64) -> Self {
        Self { sink, chat_id }
    }
}

#[async_trait]
impl Notifier for ChatNotifier {
    async fn notify(&self, message: String) {
        tracing::info!("{}", message);
        self.sink.send(self.chat_id, &message).await;
    }
}
