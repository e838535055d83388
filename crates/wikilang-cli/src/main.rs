mod args;
mod commands;
mod display;
mod pipeline;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = args::Cli::parse();
    tracing::debug!("wikilang v{}", env!("CARGO_PKG_VERSION"));
    commands::run(cli).await
}
