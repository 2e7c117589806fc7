use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use slot_engine::{
    plan_slots, Date, EventSource, JsonEventSource, PlannerConfig, PlannerError, SlotQuery,
    TableProvider,
};
use tracing_subscriber::EnvFilter;

/// Find free weekday slots across calendars, ranked by added driving distance.
#[derive(Parser)]
#[command(name = "evplan", version, about)]
struct Cli {
    /// TOML configuration file (timezone, business hours, query defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the calendars in an export
    Calendars {
        /// JSON calendar export
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Find and rank free slots
    Slots(SlotArgs),
}

#[derive(clap::Args)]
struct SlotArgs {
    /// JSON calendar export
    #[arg(short, long)]
    events: PathBuf,

    /// JSON distance table: [{"from": .., "to": .., "meters": ..}]
    #[arg(short, long)]
    distances: PathBuf,

    /// First day to search (YYYY-MM-DD). Defaults to tomorrow.
    #[arg(long)]
    from: Option<Date>,

    /// Number of days to search
    #[arg(long)]
    days: Option<i64>,

    /// Minimum slot length in minutes
    #[arg(long)]
    duration: Option<i64>,

    /// Where the new event takes place
    #[arg(long)]
    event_location: Option<String>,

    /// Where the day's travel starts and ends
    #[arg(long)]
    start_location: Option<String>,

    /// Calendar id to include (repeatable)
    #[arg(long = "calendar")]
    calendars: Vec<String>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,
}

impl SlotArgs {
    /// Apply command-line overrides on top of the configured query.
    fn query(&self, defaults: &SlotQuery) -> SlotQuery {
        let mut query = defaults.clone();
        if let Some(days) = self.days {
            query.number_of_days = days;
        }
        if let Some(minutes) = self.duration {
            query.minimum_duration_minutes = minutes;
        }
        if let Some(location) = &self.event_location {
            query.event_location = location.clone();
        }
        if let Some(location) = &self.start_location {
            query.start_location = location.clone();
        }
        if !self.calendars.is_empty() {
            query.calendar_ids = self.calendars.clone();
        }
        query
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if is_validation(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn is_validation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PlannerError>()
        .is_some_and(PlannerError::is_validation)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let options = config.engine_options()?;

    match cli.command {
        Commands::Calendars { events } => {
            let source = JsonEventSource::from_file(&events, options.timezone)
                .with_context(|| format!("Failed to load events from {}", events.display()))?;
            let calendars = source.list_calendars()?;
            println!("{}", serde_json::to_string_pretty(&calendars)?);
        }
        Commands::Slots(args) => {
            let query = args.query(&config.query);
            let source = JsonEventSource::from_file(&args.events, options.timezone)
                .with_context(|| format!("Failed to load events from {}", args.events.display()))?;
            let table = std::fs::read_to_string(&args.distances)
                .with_context(|| format!("Failed to read {}", args.distances.display()))?;
            let provider = TableProvider::from_json_str(&table)?;

            let first_day = args.from.unwrap_or_else(|| {
                let today = Utc::now().with_timezone(&options.timezone).date_naive();
                Date::from_naive(today).add_days(1)
            });
            tracing::debug!(%first_day, days = query.number_of_days, "Searching");

            let ranked = plan_slots(&query, &options, &source, &provider, first_day)?;
            let output = if args.pretty {
                serde_json::to_string_pretty(&ranked)?
            } else {
                serde_json::to_string(&ranked)?
            };
            println!("{output}");
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    match path {
        Some(path) => PlannerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(PlannerConfig::default()),
    }
}
