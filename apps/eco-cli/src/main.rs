//! # eco-cli
//!
//! Command-line interface for household waste tracking.
//!
//! - `ecotrack event add/toggle/list` — log disposal events
//! - `ecotrack goal add/list` — set and inspect reduction goals
//! - `ecotrack evaluate` — re-run goal and achievement evaluation
//! - `ecotrack achievements/stats` — progress reports
//! - `ecotrack notifications list/read` — the user's inbox
//! - `ecotrack export` — events as CSV
//! - `ecotrack nearby/pickups/distance` — find collection facilities and schedules

mod commands;
mod host;
mod lock;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eco_engine::WasteCategory;
use tracing_subscriber::EnvFilter;

use crate::host::Host;

/// Household waste tracker — goals, achievements, and nearby facilities.
#[derive(Parser)]
#[command(name = "ecotrack", version, about)]
struct Cli {
    /// Directory holding config, facilities, and per-user data.
    #[arg(long, default_value = ".ecotrack")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log and manage disposal events.
    Event {
        #[command(subcommand)]
        command: commands::event::EventCommands,
    },
    /// Set and inspect goals.
    Goal {
        #[command(subcommand)]
        command: commands::goal::GoalCommands,
    },
    /// Re-evaluate goals and achievements for a user.
    Evaluate {
        #[arg(long)]
        user: String,
    },
    /// List the achievement catalog with unlock status.
    Achievements {
        #[arg(long)]
        user: String,
    },
    /// Show disposal statistics and estimated impact.
    Stats {
        #[arg(long)]
        user: String,
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List notifications and mark them read.
    Notifications {
        #[command(subcommand)]
        command: commands::notification::NotificationCommands,
    },
    /// Export a user's disposal events as CSV.
    Export {
        #[arg(long)]
        user: String,
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Find active facilities near a location.
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Search radius in km (defaults to the configured radius).
        #[arg(long)]
        radius: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
        /// Only facilities accepting this category.
        #[arg(long)]
        category: Option<WasteCategory>,
    },
    /// List active pickup schedules.
    Pickups {
        /// Only schedules whose area mentions this city.
        #[arg(long)]
        city: Option<String>,
    },
    /// Great-circle distance in km between two points.
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lng1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lng2: f64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("eco_cli=info".parse()?)
                .add_directive("eco_engine=info".parse()?)
                .add_directive("eco_progress=info".parse()?)
                .add_directive("eco_geo=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    // `distance` needs no data directory.
    let host = || Host::load(&cli.data_dir);

    match cli.command {
        Commands::Event { command } => commands::event::execute(&command, &host()?),
        Commands::Goal { command } => commands::goal::execute(&command, &host()?),
        Commands::Evaluate { user } => commands::progress::evaluate(&host()?, &user),
        Commands::Achievements { user } => commands::progress::achievements(&host()?, &user),
        Commands::Stats { user, json } => commands::progress::stats(&host()?, &user, json),
        Commands::Notifications { command } => {
            commands::notification::execute(&command, &host()?)
        }
        Commands::Export { user, output } => {
            commands::export::execute(&host()?, &user, output.as_deref())
        }
        Commands::Pickups { city } => commands::facility::pickups(&host()?, city.as_deref()),
        Commands::Nearby {
            lat,
            lng,
            radius,
            limit,
            category,
        } => commands::facility::nearby(&host()?, lat, lng, radius, limit, category),
        Commands::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
        } => commands::facility::distance(lat1, lng1, lat2, lng2),
    }
}
