use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use client_core::{config::DEFAULT_CONFIG_FILE, ClientConfig};
use tracing_subscriber::EnvFilter;

mod capabilities;
mod commands;
mod render;
mod screen;

#[derive(Parser, Debug)]
#[command(about = "Browse, create and delete catalog users from the terminal")]
struct Args {
    /// TOML file with `api_url`, `page_size`, `debounce_ms` and friends.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides the configured catalog API base URL.
    #[arg(long)]
    api_url: Option<String>,
    /// Used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::load_from(&args.config);
    if let Some(api_url) = args.api_url.as_deref() {
        config = config.with_base_url(api_url);
        if config.base_url.is_none() {
            anyhow::bail!("--api-url {api_url:?} is not an absolute http(s) URL");
        }
    }

    let input = capabilities::spawn_stdin_reader();
    screen::App::new(config, input).run().await
}
