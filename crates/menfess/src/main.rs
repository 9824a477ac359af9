//! `menfess` - search anonymous menfess messages from the terminal.
//!
//! Messages come from the menfess search service; songs attached to them are
//! looked up on Spotify when client credentials are configured.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod browse;
mod cli;
mod render;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use menfess_core::{Config, HttpSearchController, SearchStatus};

use cli::{Cli, Command, SearchArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --json
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menfess=info,menfess_core=info,menfess_oauth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    cli.apply(&mut config);
    if let Err(e) = config.check_credentials() {
        warn!("{e}; track details will be unavailable");
    }

    let controller =
        HttpSearchController::from_config(&config).context("invalid configuration")?;
    info!(search_url = %config.search_url, "starting menfess");

    match cli.command {
        Command::Search(args) => search(&controller, &args).await,
        Command::Browse => browse::run(&controller).await,
    }
}

async fn search(controller: &HttpSearchController, args: &SearchArgs) -> Result<()> {
    let mut updates = controller.subscribe();

    controller.on_filter_change(args.to_update())?;
    if args.page > 1 {
        controller.go_to_page(args.page)?;
    } else {
        controller.refresh();
    }

    let state = updates
        .wait_for(|state| matches!(state.status, SearchStatus::Success | SearchStatus::Error))
        .await?
        .clone();
    controller.shutdown();

    if state.status == SearchStatus::Error {
        bail!(
            "search failed: {}",
            state.error.as_deref().unwrap_or("unknown error")
        );
    }

    let Some(page) = state.page() else {
        bail!("search finished without results");
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(page)?);
    } else {
        println!("{}", render::page(page));
    }
    Ok(())
}
