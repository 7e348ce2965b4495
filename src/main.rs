use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scanstation::capture::CaptureMode;
use scanstation::protocol::{CatalogKind, Station};
use scanstation::station_config::StationConfig;

mod cmd;

#[derive(Parser)]
#[command(name = "scanstation")]
#[command(version, about = "Factory floor scanner station and order entry client")]
pub struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to station.toml. Searched for in ./.scanstation and the user config dir otherwise.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workflow server base URL. Overrides station.toml and SCANSTATION_SERVER_URL.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an interactive scanner station
    Scan {
        /// gluing or sewing. Defaults to scanner.default_station.
        station: Option<Station>,

        /// Capture submission mode: sequence or per-key
        #[arg(long)]
        mode: Option<CaptureMode>,
    },
    /// Complete the current task for an employee without scanning
    Complete {
        station: Station,
        /// Employee sequence as encoded on the badge, without parentheses
        employee_sequence: String,
        /// Task id for older gluing servers that expect it in the request
        #[arg(long)]
        task_id: Option<i64>,
    },
    /// Print a reference catalog
    Catalog {
        /// fabrics, springs, mattresses, nomenclatures or additions
        kind: CatalogKind,
    },
    /// Create and submit orders
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum OrderCommands {
    /// Submit an order described in a TOML draft file
    Submit {
        draft: PathBuf,
        /// Submit without asking for confirmation
        #[arg(long)]
        yes: bool,
        /// Print the JSON payload instead of submitting
        #[arg(long)]
        dry_run: bool,
    },
    /// Build an order interactively
    New,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Create a default station.toml
    Init,
    /// Validate station.toml
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    // Config commands must work even when station.toml is missing or broken.
    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(cli.config.as_deref(), &cwd, command.clone());
    }

    let mode = match &cli.command {
        Commands::Scan { mode, .. } => *mode,
        _ => None,
    };
    let config = StationConfig::discover(cli.config.as_deref(), &cwd)?
        .with_overrides(cli.server.clone(), mode);

    let log_guard = scanstation::logging::init(config.logging(), cli.verbose, cli.json_logs)?;
    tracing::debug!(source = ?config.source, server = %config.server().base_url, "configuration loaded");

    match &cli.command {
        Commands::Scan { station, .. } => {
            let station = station
                .or(config.toml.scanner.default_station)
                .context("No station given and scanner.default_station is not set")?;
            // The scan screen redraws stdout in place; stderr logs wait until it exits.
            let _hold = log_guard.hold_stderr();
            cmd::cmd_scan(&config, station).await?
        }
        Commands::Complete {
            station,
            employee_sequence,
            task_id,
        } => cmd::cmd_complete(&config, *station, employee_sequence, *task_id).await?,
        Commands::Catalog { kind } => cmd::cmd_catalog(&config, *kind).await?,
        Commands::Order { command } => match command {
            OrderCommands::Submit {
                draft,
                yes,
                dry_run,
            } => cmd::cmd_order_submit(&config, draft, *yes, *dry_run).await?,
            OrderCommands::New => cmd::cmd_order_new(&config).await?,
        },
        Commands::Config { .. } => unreachable!("handled before configuration is loaded"),
    }

    Ok(())
}
