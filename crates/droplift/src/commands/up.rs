use super::ConsoleNotifier;
use colored::Colorize;
use droplift_config::{Settings, process_env};

pub async fn handle() -> anyhow::Result<()> {
    let source = process_env();
    let settings = Settings::load(&source)?;
    let config = settings.up_config(&source)?;

    println!(
        "{}",
        format!(
            "Bringing up {} from snapshot {}...",
            config.droplet_name, config.snapshot_name
        )
        .yellow()
    );
    println!("Host: {}", config.host_name.cyan());
    println!();

    let lifecycle = super::lifecycle(&settings, super::cancel_on_ctrl_c())?;
    let result = lifecycle.up(&config, &ConsoleNotifier).await;

    super::finish(result)
}
