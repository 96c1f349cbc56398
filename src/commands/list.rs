use almanac_core::query::{self, EventQuery};
use almanac_core::{Event, EventKind, EventStore};
use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use owo_colors::OwoColorize;

use crate::render::Render;

pub struct ListArgs {
    pub search: Option<String>,
    pub kind: Option<EventKind>,
    pub upcoming: bool,
    pub limit: Option<usize>,
    pub json: bool,
}

pub fn run(store: &EventStore, args: ListArgs) -> Result<()> {
    let events = select(&store.snapshot(), &args, Local::now().naive_local());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut current_date: Option<NaiveDate> = None;

    for event in &events {
        if current_date != Some(event.date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label(event.date, today).bold());
            current_date = Some(event.date);
        }
        println!("  {}", event.render());
    }

    Ok(())
}

fn select(events: &[Event], args: &ListArgs, now: NaiveDateTime) -> Vec<Event> {
    let query = EventQuery::new()
        .search(args.search.clone().unwrap_or_default())
        .kind(args.kind);
    let matched = query.apply(events);
    let limit = args.limit.unwrap_or(usize::MAX);

    if args.upcoming {
        query::upcoming(&matched, now, limit)
    } else {
        matched.into_iter().take(limit).collect()
    }
}

/// "Today", "Tomorrow", or a short date like "Wed Feb 25 2026".
fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn event(id: &str, title: &str, date: &str, time: &str, kind: EventKind) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{title} notes"),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            kind,
            media_url: kind
                .has_media()
                .then(|| "https://example.com/m".to_string()),
            notified: false,
        }
    }

    fn defaults() -> ListArgs {
        ListArgs {
            search: None,
            kind: None,
            upcoming: false,
            limit: None,
            json: false,
        }
    }

    fn events() -> Vec<Event> {
        vec![
            event("c", "Launch", "2024-03-12", "08:00", EventKind::Video),
            event("a", "Standup", "2024-03-10", "09:00", EventKind::Text),
            event("b", "Photo walk", "2024-03-11", "17:30", EventKind::Image),
        ]
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn lists_everything_in_order() {
        assert_eq!(ids(&select(&events(), &defaults(), now())), vec!["a", "b", "c"]);
    }

    #[test]
    fn filters_combine() {
        let args = ListArgs {
            search: Some("WALK".into()),
            kind: Some(EventKind::Image),
            ..defaults()
        };
        assert_eq!(ids(&select(&events(), &args, now())), vec!["b"]);
    }

    #[test]
    fn upcoming_skips_started_events() {
        let args = ListArgs {
            upcoming: true,
            ..defaults()
        };
        assert_eq!(ids(&select(&events(), &args, now())), vec!["b", "c"]);

        let args = ListArgs {
            upcoming: true,
            limit: Some(1),
            ..defaults()
        };
        assert_eq!(ids(&select(&events(), &args, now())), vec!["b"]);
    }

    #[test]
    fn relative_date_labels() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 24).unwrap();
        assert_eq!(date_label(today, today), "Today");
        assert_eq!(date_label(today.succ_opt().unwrap(), today), "Tomorrow");
        assert_eq!(
            date_label(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(), today),
            "Wed Mar 4 2026"
        );
    }
}
