use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use sleepwalk::cli::Cli;
use sleepwalk::prelude::*;
use sleepwalk::{ENGINE_NAME, VERSION};
use std::env;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    print_banner();

    // 1. Initialize structured logging.
    let filter = cli
        .log_filter()
        .with_context(|| format!("invalid log filter {:?}", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // 2. Load the configuration once. It is never re-read.
    let config = SleepwalkConfig::load(&cli)?;

    // 3. Build the gateway to the cluster.
    let gateway = HttpGateway::from_config(&config)?;

    // 4. Pick the zone windows are evaluated in and run.
    match config.timezone {
        Some(zone) => start(config, gateway, SystemClock::new(zone), cli.once).await,
        None => start(config, gateway, SystemClock::new(chrono::Local), cli.once).await,
    }
}

async fn start<C: Clock + 'static>(
    config: SleepwalkConfig,
    gateway: HttpGateway,
    clock: C,
    once: bool,
) -> Result<()> {
    let engine = SleepwalkEngine::new(config, gateway, clock);
    spawn_event_listener(&engine);

    if once {
        let report = engine.run_once().await?;
        if !report.skipped.is_empty() {
            anyhow::bail!("{} template(s) could not be applied", report.skipped.len());
        }
        return Ok(());
    }

    engine.run().await
}

/// Mirrors the engine's event stream into the debug log.
fn spawn_event_listener<C: Clock + 'static>(engine: &SleepwalkEngine<HttpGateway, C>) {
    let mut event_rx = engine.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            debug!("[ENGINE] => {:?}", event);
        }
    });
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    let version = format!("v{}", VERSION);
    println!("{} {}", ENGINE_NAME.cyan().bold(), version.as_str().dimmed());
}
