// Allow common clippy pedantic lints
#![allow(clippy::must_use_candidate)]

//! fivetran-fetch CLI
//!
//! Lists groups and connectors and prints table lineage

use clap::Parser;
use fivetran_fetch::cli::{Cli, Runner};
use tokio_util::sync::CancellationToken;
use tracing::{warn, Level};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for results
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding requests");
            on_interrupt.cancel();
        }
    });

    let runner = Runner::new(cli);
    if let Err(e) = runner.run(&cancel).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
