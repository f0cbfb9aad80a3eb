use super::ConsoleNotifier;
use colored::Colorize;
use droplift_config::{Settings, process_env};

pub async fn handle() -> anyhow::Result<()> {
    let settings = Settings::load(&process_env())?;
    let config = &settings.down;

    println!(
        "{}",
        format!(
            "Taking down {} into snapshot {}...",
            config.droplet_name, config.snapshot_name
        )
        .yellow()
    );
    println!("Host: {}", config.host_name.cyan());
    println!();

    let lifecycle = super::lifecycle(&settings, super::cancel_on_ctrl_c())?;
    let result = lifecycle.down(config, &ConsoleNotifier).await;

    super::finish(result)
}
