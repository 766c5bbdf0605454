use crate::generator::workflow::launch;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod generator;
mod llm;
mod types;
mod utils;
mod workspace;

/// 初始化日志：RUST_LOG优先，否则默认info（--verbose时为debug），输出到stderr
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = cli::Args::parse();
    let config = args.into_config()?;
    init_tracing(config.verbose);

    launch(&config).await
}
