mod desktop;

use std::path::PathBuf;
use std::sync::Arc;

use almanac_core::config::{AlmanacConfig, parse_period};
use almanac_core::scheduler::{Scheduler, TickReport};
use almanac_core::{EventStore, StoreChange};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::desktop::DesktopNotifier;

#[derive(Parser)]
#[command(name = "almanac-notify")]
#[command(about = "Show a desktop notification when each almanac event starts")]
struct Cli {
    /// Use this config file instead of ~/.config/almanac/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check interval, overriding poll_interval from config (e.g. "30s", "2m")
    #[arg(short, long)]
    interval: Option<String>,

    /// Check once for due events and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AlmanacConfig::load_from(path),
        None => AlmanacConfig::load(),
    }
    .context("Failed to load almanac config")?;

    let period = match cli.interval.as_deref() {
        Some(interval) => parse_period(interval)?,
        None => config.poll_period()?,
    };

    let storage = config.event_storage();
    info!(path = %storage.path().display(), "Using event storage");

    let store = Arc::new(EventStore::load(Arc::new(storage)));
    let notifier = Arc::new(DesktopNotifier::new(config.notifications));
    let scheduler = Scheduler::new(store.clone(), notifier)
        .with_policy(config.mark_policy)
        .with_icon(config.notification_icon.clone());

    if cli.once {
        let report = check_once(scheduler).await?;
        info!(
            due = report.due,
            delivered = report.delivered.len(),
            "Checked for due events"
        );
        return Ok(());
    }

    let change_log = log_changes(store.subscribe());
    let handle = scheduler.spawn(period);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down");
    handle.shutdown().await;
    change_log.abort();

    Ok(())
}

/// One permission check and tick, off the async worker threads.
async fn check_once(scheduler: Scheduler) -> Result<TickReport> {
    let report = tokio::task::spawn_blocking(move || {
        scheduler.ensure_permission();
        scheduler.tick()
    })
    .await
    .context("Scheduler tick panicked")??;

    Ok(report)
}

fn log_changes(mut changes: broadcast::Receiver<StoreChange>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => debug!(?change, "Events changed"),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Missed event change notifications")
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::{EventDraft, EventKind};
    use almanac_core::clock::FixedClock;
    use almanac_core::storage::MemoryStorage;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn config_and_once_flags_parse() {
        let cli = Cli::try_parse_from([
            "almanac-notify",
            "--config",
            "/tmp/almanac.toml",
            "--once",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/almanac.toml")));
        assert!(cli.once);
        assert!(cli.interval.is_none());
    }

    #[tokio::test]
    async fn check_once_marks_due_events() {
        let store = Arc::new(EventStore::load(Arc::new(MemoryStorage::new())));
        let id = store
            .add(EventDraft {
                title: "Standup".into(),
                description: "Daily sync".into(),
                date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                kind: EventKind::Text,
                media_url: None,
            })
            .unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();

        // Disabled notifications never reach the desktop service.
        let scheduler = Scheduler::new(store.clone(), Arc::new(DesktopNotifier::new(false)))
            .with_clock(Arc::new(FixedClock::utc(now)));

        let report = check_once(scheduler).await.unwrap();

        assert_eq!(report.due, 1);
        assert!(report.delivered.is_empty());
        assert!(store.get(&id).unwrap().notified);
    }
}
