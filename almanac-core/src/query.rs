//! Searching and ordering events for list views.

use chrono::NaiveDateTime;

use crate::event::{Event, EventKind};

/// Filters for an event list. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Case-insensitive text looked up in title and description.
    pub search: Option<String>,
    pub kind: Option<EventKind>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() { None } else { Some(term) };
        self
    }

    pub fn kind(mut self, kind: Option<EventKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        let kind_matches = self.kind.is_none_or(|kind| event.kind == kind);

        let text_matches = match &self.search {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                event.title.to_lowercase().contains(&term)
                    || event.description.to_lowercase().contains(&term)
            }
        };

        kind_matches && text_matches
    }

    /// Matching events in chronological order.
    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        let mut matched: Vec<Event> = events.iter().filter(|e| self.matches(e)).cloned().collect();
        sort_chronologically(&mut matched);
        matched
    }
}

/// Sort by start, then title, so equal starts still list deterministically.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.local_start()
            .cmp(&b.local_start())
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Up to `limit` events starting at or after `now`, soonest first.
pub fn upcoming(events: &[Event], now: NaiveDateTime, limit: usize) -> Vec<Event> {
    let mut future: Vec<Event> = events
        .iter()
        .filter(|e| e.local_start() >= now)
        .cloned()
        .collect();
    sort_chronologically(&mut future);
    future.truncate(limit);
    future
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn event(id: &str, title: &str, description: &str, date: &str, time: &str, kind: EventKind) -> Event {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            kind,
            media_url: None,
            notified: false,
        }
    }

    fn sample() -> Vec<Event> {
        vec![
            event("1", "Team Standup", "daily sync", "2024-01-02", "09:00", EventKind::Text),
            event("2", "Photo walk", "bring the CAMERA", "2024-01-01", "15:00", EventKind::Image),
            event("3", "Launch video", "premiere", "2024-01-01", "08:00", EventKind::Video),
            event("4", "Retro", "what went well", "2024-01-02", "09:00", EventKind::Text),
        ]
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn empty_query_sorts_everything_chronologically() {
        let result = EventQuery::new().apply(&sample());
        assert_eq!(ids(&result), vec!["3", "2", "4", "1"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let events = sample();

        assert_eq!(ids(&EventQuery::new().search("camera").apply(&events)), vec!["2"]);
        assert_eq!(ids(&EventQuery::new().search("STANDUP").apply(&events)), vec!["1"]);
    }

    #[test]
    fn blank_search_matches_everything() {
        assert_eq!(EventQuery::new().search("   ").apply(&sample()).len(), 4);
    }

    #[test]
    fn kind_filter_combines_with_search() {
        let events = sample();

        let text = EventQuery::new().kind(Some(EventKind::Text)).apply(&events);
        assert_eq!(ids(&text), vec!["4", "1"]);

        let none = EventQuery::new()
            .kind(Some(EventKind::Video))
            .search("camera")
            .apply(&events);
        assert!(none.is_empty());
    }

    #[test]
    fn upcoming_skips_past_events_and_limits() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        assert_eq!(ids(&upcoming(&sample(), now, 2)), vec!["2", "4"]);
    }
}
