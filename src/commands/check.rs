use std::sync::Arc;

use almanac_core::config::AlmanacConfig;
use almanac_core::notify::{Notification, Notifier, Permission};
use almanac_core::scheduler::{Scheduler, TickReport};
use almanac_core::{CalendarResult, EventStore};
use anyhow::Result;
use owo_colors::OwoColorize;

/// Prints notifications to stdout. A terminal needs no permission.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn notify(&self, notification: &Notification) -> CalendarResult<()> {
        println!("{} {}", "🔔".yellow(), notification.title.bold());
        println!("   {}", notification.body);
        Ok(())
    }
}

pub fn run(config: &AlmanacConfig) -> Result<()> {
    let store = Arc::new(EventStore::load(Arc::new(config.event_storage())));
    let scheduler = Scheduler::new(store, Arc::new(TerminalNotifier))
        .with_policy(config.mark_policy)
        .with_icon(config.notification_icon.clone());

    let report = scheduler.tick()?;
    println!("{}", summary(&report).dimmed());

    Ok(())
}

fn summary(report: &TickReport) -> String {
    match (report.due, report.unmarked) {
        (0, _) => "No events due".to_string(),
        (due, 0) => format!("{} event(s) due, {} notified", due, report.delivered.len()),
        (due, unmarked) => format!(
            "{} event(s) due, {} notified, {} left for a later check",
            due,
            report.delivered.len(),
            unmarked
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::clock::FixedClock;
    use almanac_core::storage::MemoryStorage;
    use almanac_core::{EventDraft, EventKind};
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn terminal_delivers_due_events_once() {
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
            .and_hms_opt(9, 1, 0)
            .unwrap();
        let scheduler = Scheduler::new(store.clone(), Arc::new(TerminalNotifier))
            .with_clock(Arc::new(FixedClock::utc(now)));

        let first = scheduler.tick().unwrap();
        assert_eq!(first.delivered, vec![id.clone()]);
        assert_eq!(summary(&first), "1 event(s) due, 1 notified");
        assert!(store.get(&id).unwrap().notified);

        let second = scheduler.tick().unwrap();
        assert_eq!(summary(&second), "No events due");
    }

    #[test]
    fn summary_mentions_deferred_events() {
        let report = TickReport {
            due: 2,
            delivered: Vec::new(),
            unmarked: 2,
        };
        assert_eq!(
            summary(&report),
            "2 event(s) due, 0 notified, 2 left for a later check"
        );
    }
}
