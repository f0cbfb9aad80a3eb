mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "droplift")]
#[command(
    about = "Park a DigitalOcean droplet as a snapshot and bring it back on demand",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore the droplet from its snapshot and publish its host name
    Up,
    /// Snapshot the droplet, destroy it and withdraw its host name
    Down,
    /// Serve /up and /down from a Telegram chat
    Bot,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env may carry RUST_LOG, so load it before the subscriber
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Up => commands::up::handle().await,
        Commands::Down => commands::down::handle().await,
        Commands::Bot => commands::bot::handle().await,
        Commands::Version => {
            println!("droplift {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
