//! Event form validation.
//!
//! The store accepts any well-typed draft; required-field and media rules are
//! enforced here, at the UI boundary, before anything reaches the store.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::event::{Event, EventDraft, EventKind, hh_mm};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw form input, one string per field as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub kind: EventKind,
    pub media_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Description,
    Date,
    Time,
    MediaUrl,
}

/// Per-field validation messages. Never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<FormField, String>);

impl EventForm {
    /// Blank form for a new event on `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        EventForm {
            date: date.format(DATE_FORMAT).to_string(),
            ..Default::default()
        }
    }

    /// Form pre-filled from an existing event, for editing.
    pub fn from_event(event: &Event) -> Self {
        EventForm {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.format(DATE_FORMAT).to_string(),
            time: event.time_label(),
            kind: event.kind,
            media_url: event.media_url.clone().unwrap_or_default(),
        }
    }

    /// Check every field and build a draft, or report all problems at once.
    pub fn validate(&self) -> Result<EventDraft, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.insert(FormField::Title, "Title is required");
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.insert(FormField::Description, "Description is required");
        }

        let date = self.date.trim();
        let parsed_date = if date.is_empty() {
            errors.insert(FormField::Date, "Date is required");
            None
        } else {
            let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).ok();
            if parsed.is_none() {
                errors.insert(FormField::Date, "Date must be in YYYY-MM-DD format");
            }
            parsed
        };

        let time = self.time.trim();
        let parsed_time = if time.is_empty() {
            errors.insert(FormField::Time, "Time is required");
            None
        } else {
            let parsed = hh_mm::parse(time);
            if parsed.is_none() {
                errors.insert(FormField::Time, "Time must be in HH:MM format");
            }
            parsed
        };

        let media_url = self.media_url.trim();
        let media_url = if !self.kind.has_media() {
            None
        } else if media_url.is_empty() {
            errors.insert(
                FormField::MediaUrl,
                "Media URL is required for image/video events",
            );
            None
        } else if url::Url::parse(media_url).is_err() {
            errors.insert(FormField::MediaUrl, "Media URL must be a valid URL");
            None
        } else {
            Some(media_url.to_string())
        };

        match (parsed_date, parsed_time) {
            (Some(date), Some(time)) if errors.is_empty() => Ok(EventDraft {
                title: title.to_string(),
                description: description.to_string(),
                date,
                time,
                kind: self.kind,
                media_url,
            }),
            _ => Err(errors),
        }
    }
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Description => "description",
            FormField::Date => "date",
            FormField::Time => "time",
            FormField::MediaUrl => "media URL",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FormErrors {
    fn insert(&mut self, field: FormField, message: &str) {
        self.0.insert(field, message.to_string());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}
