//! Notification capability supplied by the host environment.

use std::fmt;

use crate::error::CalendarResult;
use crate::event::Event;

/// Whether the host currently lets us show notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    Default,
}

/// A one-shot alert shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
}

impl Notification {
    pub fn for_event(event: &Event, icon: Option<&str>) -> Self {
        Notification {
            title: event.title.clone(),
            body: event.description.clone(),
            icon: icon.map(str::to_string),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}

/// Something that can show notifications, e.g. the desktop notification
/// service or a terminal.
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask the user for permission. Returns the resulting state.
    fn request_permission(&self) -> Permission;

    fn notify(&self, notification: &Notification) -> CalendarResult<()>;
}
