//! Droplift Bot
//!
//! Telegram front-end: a long-polling Bot API client feeds chat messages into
//! the `Dispatcher`, which runs at most one up/down workflow at a time and
//! reports progress and results back to the configured chat.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod sink;
pub mod telegram;

pub use command::Command;
pub use dispatcher::{Dispatcher, InboundMessage};
pub use error::{BotError, Result};
pub use sink::{ChatNotifier, ChatSink};
pub use telegram::{TelegramClient, spawn_poller};

use droplift_core::WorkflowRunner;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const INBOUND_CAPACITY: usize = 64;

/// Run the bot until `shutdown` fires
///
/// Fails only if the token is rejected at startup. Everything after that is
/// reported to the chat and logged.
pub async fn serve(
    client: Arc<TelegramClient>,
    target_chat: i64,
    runner: Arc<dyn WorkflowRunner>,
    shutdown: CancellationToken,
) -> Result<()> {
    let me = client.get_me().await?;
    let username = me.username.unwrap_or_default();
    tracing::info!("Authorized as @{}", username);

    let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
    let poller = spawn_poller(client.clone(), tx, shutdown.clone());

    Dispatcher::new(target_chat, username, client, runner)
        .run(rx, shutdown.clone())
        .await;

    shutdown.cancel();
    if let Err(e) = poller.await {
        tracing::warn!("Poller task failed: {}", e);
    }

    Ok(())
}
