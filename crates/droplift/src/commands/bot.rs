use colored::Colorize;
use droplift_bot::TelegramClient;
use droplift_config::{Settings, process_env};
use droplift_core::LifecycleRunner;
use std::sync::Arc;

pub async fn handle() -> anyhow::Result<()> {
    let source = process_env();
    let settings = Settings::load(&source)?;
    let bot = settings.bot_config(&source)?;

    let shutdown = super::cancel_on_ctrl_c();
    let lifecycle = super::lifecycle(&settings, shutdown.clone())?;
    let runner = Arc::new(LifecycleRunner::new(lifecycle, bot.up, bot.down));
    let client = Arc::new(TelegramClient::new(bot.token)?);

    println!(
        "{}",
        format!("Serving chat {} (Ctrl-C to stop)", bot.chat_id).cyan()
    );

    droplift_bot::serve(client, bot.chat_id, runner, shutdown).await?;

    println!("{}", "Bot stopped".yellow());
    Ok(())
}
