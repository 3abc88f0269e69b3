use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use scout_app::{build_orchestrator, build_runtime, serve, AppConfig, ConfigOverrides, TriggerResponse};
use scout_core::Outcome;
use scout_logging::{scout_debug, scout_error, scout_info, LogDestination};

#[derive(Parser)]
#[command(name = "bounty_scout")]
#[command(about = "Announce the top new bounty from the listing page")]
#[command(version)]
struct Cli {
    /// RON config file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, env = "FIRECRAWL_API_KEY", hide_env_values = true, global = true)]
    firecrawl_api_key: Option<String>,

    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true, global = true)]
    slack_webhook_url: Option<String>,

    /// Only postings newer than this many hours are eligible
    #[arg(long, global = true)]
    window_hours: Option<u32>,

    /// File holding one announced link per line
    #[arg(long, global = true)]
    seen_store: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scrape-and-notify cycle and print the outcome (default)
    Run,
    /// Run a cycle, then sleep, forever
    Watch {
        #[arg(long, default_value_t = 3600)]
        interval_secs: u64,
    },
    /// Serve `GET /scrape`, running one cycle per request
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading config")?;
    config.apply_overrides(ConfigOverrides {
        firecrawl_api_key: cli.firecrawl_api_key,
        slack_webhook_url: cli.slack_webhook_url,
        window_hours: cli.window_hours,
        seen_store: cli.seen_store,
        log_file: cli.log_file,
    });

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = if config.log_file.is_some() {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    scout_logging::initialize(destination, level, config.log_file.as_deref());
    match cli.config.as_deref() {
        Some(path) => scout_info!("Loaded config from {:?}", path),
        None => scout_debug!("No config file given; using defaults"),
    }

    let config = config.validate().context("invalid configuration")?;
    let orchestrator = build_orchestrator(&config)?;
    let runtime = build_runtime().context("starting async runtime")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let outcome = runtime
                .block_on(orchestrator.run_cycle())
                .context("cycle failed")?;
            print_outcome(&outcome)?;
        }
        Commands::Watch { interval_secs } => {
            let interval = Duration::from_secs(interval_secs.max(1));
            scout_info!("Watching every {}s", interval.as_secs());
            loop {
                match runtime.block_on(orchestrator.run_cycle()) {
                    Ok(outcome) => print_outcome(&outcome)?,
                    Err(err) => scout_error!("Cycle failed: {}", err),
                }
                thread::sleep(interval);
            }
        }
        Commands::Serve { bind } => serve(&bind, &orchestrator, &runtime)?,
    }

    Ok(())
}

fn print_outcome(outcome: &Outcome) -> Result<()> {
    let body = serde_json::to_string_pretty(&TriggerResponse::from(outcome))?;
    println!("{body}");
    Ok(())
}
