//! Calendar event types.
//!
//! `Event` is the only persisted entity. Its serialized shape (camelCase keys,
//! `HH:MM` times, lowercase `type`) is the on-disk format of the event slot.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// One-shot latch: set once a notification has been handled for this event.
    #[serde(default)]
    pub notified: bool,
}

/// Everything the UI submits for a new event; the store assigns the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub kind: EventKind,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Text,
    Image,
    Video,
}

impl Event {
    /// Build a fresh, not-yet-notified event from a draft.
    pub fn from_draft(id: String, draft: EventDraft) -> Self {
        Event {
            id,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            kind: draft.kind,
            media_url: draft.media_url,
            notified: false,
        }
    }

    /// Replace every editable field, keeping `id` and `notified`.
    pub fn apply(&mut self, draft: EventDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.date = draft.date;
        self.time = draft.time;
        self.kind = draft.kind;
        self.media_url = draft.media_url;
    }

    /// Wall-clock start in the host's local time (no timezone attached).
    pub fn local_start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// `HH:MM` rendering of the start time.
    pub fn time_label(&self) -> String {
        self.time.format(hh_mm::FORMAT).to_string()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Text, EventKind::Image, EventKind::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Text => "text",
            EventKind::Image => "image",
            EventKind::Video => "video",
        }
    }

    /// Image and video events carry a media URL.
    pub fn has_media(&self) -> bool {
        !matches!(self, EventKind::Text)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(EventKind::Text),
            "image" => Ok(EventKind::Image),
            "video" => Ok(EventKind::Video),
            other => Err(format!(
                "Unknown event type '{}'. Expected text, image or video",
                other
            )),
        }
    }
}

/// `HH:MM` serde format for times. Seconds are accepted when reading.
pub(crate) mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(s: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", raw))
        })
    }
}
