//! cfm - Cloudflare Multi-Account Manager
//!
//! Keeps several named API tokens in one YAML file and runs zone, DNS,
//! Workers, Pages, KV and R2 operations against whichever account is current.

mod api;
mod cli;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = cli::run(cli).await {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
