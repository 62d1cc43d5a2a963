mod commands;
mod config;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::DaylineConfig;

#[derive(Parser)]
#[command(name = "dayline")]
#[command(about = "Today's events from all your calendars, live in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rest of today's schedule once
    Today {
        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep the schedule on screen, refreshing every second (default)
    Watch,
    /// List the calendars the provider can see and which ones are shown
    Calendars,
    /// Choose which calendars to show
    Select {
        /// Calendar ids, as listed by `dayline calendars`
        ids: Vec<String>,

        /// Show every readable calendar
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },
    /// Show config paths and effective settings
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they don't tear up the live view
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dayline=warn,dayline_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DaylineConfig::load()?;

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Today { json } => commands::today::run(&config, json).await,
        Commands::Watch => commands::watch::run(&config).await,
        Commands::Calendars => commands::calendars::run(&config).await,
        Commands::Select { ids, all } => commands::select::run(ids, all),
        Commands::Config => commands::config::run(&config),
    }
}
