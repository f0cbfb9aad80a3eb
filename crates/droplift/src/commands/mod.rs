pub mod bot;
pub mod down;
pub mod up;

use async_trait::async_trait;
use colored::Colorize;
use droplift_cloud_digitalocean::DigitalOceanClient;
use droplift_config::Settings;
use droplift_core::{Lifecycle, LifecycleError, Notifier};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Token cancelled on the first Ctrl-C
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupted, stopping at the next safe point");
                trigger.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    token
}

pub fn lifecycle(settings: &Settings, cancel: CancellationToken) -> anyhow::Result<Lifecycle> {
    let client = DigitalOceanClient::new(settings.api_token.clone())?;
    Ok(Lifecycle::new(Arc::new(client))
        .with_wait_config(settings.wait.clone())
        .with_cancellation(cancel))
}

/// Prints workflow progress to the terminal
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, message: String) {
        tracing::debug!("{}", message);
        println!("  {} {}", "•".cyan(), message);
    }
}

/// Turn a one-shot workflow result into the process outcome
pub fn finish(result: Result<(), LifecycleError>) -> anyhow::Result<()> {
    match result {
        Ok(()) => {
            println!();
            println!("{}", "Done!".green().bold());
            Ok(())
        }
        Err(e) => {
            if e.is_cancelled() {
                eprintln!("{}", "Stopped on Ctrl-C".yellow());
            }
            if e.is_partial() {
                eprintln!(
                    "{}",
                    "Some resources were changed before the failure; check the DigitalOcean console"
                        .yellow()
                );
            }
            Err(e.into())
        }
    }
}
