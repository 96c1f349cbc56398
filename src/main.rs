mod commands;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use almanac_core::{EventKind, EventStore};
use almanac_core::config::AlmanacConfig;
use almanac_core::storage::{SlotLock, Storage};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "almanac")]
#[command(about = "Manage calendar events and their reminders")]
struct Cli {
    /// Use this config file instead of ~/.config/almanac/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event, prompting for anything not given
    Add {
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Start time (HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// Event type: text, image or video
        #[arg(long = "type", default_value = "text")]
        kind: EventKind,

        /// Media URL (required for image and video events)
        #[arg(long)]
        media_url: Option<String>,
    },
    /// Edit an existing event
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Start time (HH:MM)
        #[arg(long)]
        time: Option<String>,

        /// Event type: text, image or video
        #[arg(long = "type")]
        kind: Option<EventKind>,

        /// Media URL (pass "" to clear)
        #[arg(long)]
        media_url: Option<String>,
    },
    /// Delete an event
    Delete { id: String },
    /// Show one event in full
    Show { id: String },
    /// List events in chronological order
    List {
        /// Only events whose title or description contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only events of this type
        #[arg(long = "type")]
        kind: Option<EventKind>,

        /// Only events that have not started yet
        #[arg(long)]
        upcoming: bool,

        /// Show at most this many events
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a month grid with event markers
    Month {
        /// Month to show (YYYY-MM), defaults to the current month
        month: Option<String>,

        /// Go back this many months
        #[arg(long, default_value_t = 0)]
        prev: u32,

        /// Go forward this many months
        #[arg(long, default_value_t = 0)]
        next: u32,
    },
    /// Notify about events whose start time has passed
    Check,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AlmanacConfig::load_from(path),
        None => AlmanacConfig::load(),
    }
    .context("Failed to load almanac config")?;

    match cli.command {
        Commands::Add {
            title,
            description,
            date,
            time,
            kind,
            media_url,
        } => commands::add::run(
            &config,
            commands::add::AddArgs {
                title,
                description,
                date,
                time,
                kind,
                media_url,
            },
        ),
        Commands::Edit {
            id,
            title,
            description,
            date,
            time,
            kind,
            media_url,
        } => {
            let session = Session::open(&config)?;
            commands::edit::run(
                &session.store,
                &id,
                commands::edit::EditArgs {
                    title,
                    description,
                    date,
                    time,
                    kind,
                    media_url,
                },
            )
        }
        Commands::Delete { id } => {
            let session = Session::open(&config)?;
            commands::delete::run(&session.store, &id)
        }
        Commands::Show { id } => {
            let session = Session::open(&config)?;
            commands::show::run(&session.store, &id)
        }
        Commands::List {
            search,
            kind,
            upcoming,
            limit,
            json,
        } => {
            let session = Session::open(&config)?;
            commands::list::run(
                &session.store,
                commands::list::ListArgs {
                    search,
                    kind,
                    upcoming,
                    limit,
                    json,
                },
            )
        }
        Commands::Month { month, prev, next } => {
            let session = Session::open(&config)?;
            commands::month::run(&session.store, month.as_deref(), prev, next)
        }
        // The scheduler takes the slot lock for each tick itself.
        Commands::Check => commands::check::run(&config),
    }
}

/// The event store for one command, with the slot lock held until dropped
/// so the notifier daemon never interleaves with a read-modify-write.
pub struct Session {
    pub store: Arc<EventStore>,
    _lock: SlotLock,
}

impl Session {
    pub fn open(config: &AlmanacConfig) -> Result<Self> {
        let storage = Arc::new(config.event_storage());
        let lock = storage
            .lock()
            .with_context(|| format!("Failed to lock {}", storage.path().display()))?;
        let store = Arc::new(EventStore::load(storage));

        Ok(Session { store, _lock: lock })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
