//! hn-glance main entry point
//!
//! This is the command-line interface for the hn-glance front page watcher.

use anyhow::Context;
use clap::Parser;
use hn_glance::config::{load_config_with_hash, Config};
use hn_glance::display::render_snapshot;
use hn_glance::Orchestrator;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// hn-glance: a glanceable Hacker News front page
///
/// Scrapes the front page and the profiles of the listed authors on a fixed
/// schedule, keeping the top stories ready for display.
#[derive(Parser, Debug)]
#[command(name = "hn-glance")]
#[command(version)]
#[command(about = "A glanceable Hacker News front page", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run a single refresh, print the snapshot and exit
    #[arg(long, conflicts_with = "dry_run")]
    once: bool,

    /// Validate config and show the effective settings without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.once {
        handle_once(config).await?;
    } else {
        handle_watch(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hn_glance=info,warn"),
            1 => EnvFilter::new("hn_glance=debug,info"),
            2 => EnvFilter::new("hn_glance=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== hn-glance Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Max posts: {}", config.source.max_posts);

    println!("\nSchedule:");
    println!("  Tick interval: {}s", config.schedule.tick_interval_secs);
    println!("  Minimum fetch interval: {}s", config.schedule.min_fetch_interval_secs);
    println!("  Fetch timeout: {}s", config.schedule.fetch_timeout_secs);

    println!("\nProfiles:");
    println!("  Enabled: {}", config.profiles.enabled);
    println!("  Max concurrent: {}", config.profiles.max_concurrent);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

/// Handles the --once mode: one refresh, then print
async fn handle_once(config: Config) -> anyhow::Result<()> {
    let mut orchestrator = Orchestrator::new(config)?;
    let report = orchestrator.run_cycle().await.context("Refresh failed")?;
    tracing::info!(
        "Refreshed {} posts and {} of {} profiles",
        report.posts,
        report.profiles_refreshed,
        report.profiles_requested
    );

    print!(
        "{}",
        render_snapshot(&orchestrator.store().load(), orchestrator.links())
    );
    Ok(())
}

/// Handles the default mode: refresh on a schedule until Ctrl-C
async fn handle_watch(config: Config) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(config)?;
    let store = orchestrator.store();
    let links = orchestrator.links().clone();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let refresher = tokio::spawn(orchestrator.run(shutdown_rx));

    let mut published = store.subscribe();
    loop {
        tokio::select! {
            changed = published.changed() => {
                if changed.is_err() {
                    break;
                }
                tracing::info!("\n{}", render_snapshot(&store.load(), &links));
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, stopping");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    refresher.await.context("Refresh loop panicked")?;
    Ok(())
}
