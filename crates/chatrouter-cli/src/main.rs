use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

mod commands;
mod demo;

#[derive(Parser)]
#[command(name = "chatrouter")]
#[command(about = "chatrouter - route chat messages across prioritised providers")]
#[command(version)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let settings = match cli.config {
        Some(ref path) => chatrouter_core::Settings::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => chatrouter_core::Settings::load(),
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let output = commands::run(cli.command, &settings, &cancel).await?;
    println!("{output}");
    Ok(())
}
