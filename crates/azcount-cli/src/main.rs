#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod shutdown;
mod telemetry;

use std::process;

use anyhow::Context;
use azcount_azblob::AzureBlobClient;
use azcount_core::PagedCounter;
use tokio_util::sync::CancellationToken;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "azcount_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "azcount_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "azcount_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "Count failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Parses configuration, counts the containers and prints the result.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(&cli.telemetry)?;
    cli.log();
    cli.validate()?;

    let authenticator = cli.auth.authenticator(&cli.storage.account_name);
    let client = AzureBlobClient::authenticate(cli.storage.clone(), authenticator.as_ref())
        .await
        .context("failed to create storage client")?;

    let counter = PagedCounter::new(client, cli.count.page_size, cli.count.timeout())
        .context("invalid count parameters")?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        account = %cli.storage.account_name,
        page_size = %counter.page_size(),
        timeout_ms = cli.count.timeout_ms,
        "Counting containers"
    );

    let cancel_token = CancellationToken::new();
    let signal_task = tokio::spawn(shutdown::cancel_on_signal(cancel_token.clone()));

    let result = counter.count_with_cancellation(cancel_token.clone()).await;
    cancel_token.cancel();
    if let Err(error) = signal_task.await {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "Signal watcher did not finish cleanly"
        );
    }

    let count = result.context("failed to count containers")?;
    println!("{}", summary_line(count));

    Ok(())
}

/// Line printed to stdout after a successful count.
fn summary_line(count: u64) -> String {
    format!("{count} containers found.")
}
