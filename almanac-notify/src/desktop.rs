//! Desktop notifications through the platform notification service.

use almanac_core::notify::{Notification, Notifier, Permission};
use almanac_core::{CalendarError, CalendarResult};

const APP_NAME: &str = "almanac";

/// Shows notifications with `notify-rust`.
///
/// Desktops have no permission prompt, so permission simply mirrors the
/// `notifications` setting.
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        DesktopNotifier { enabled }
    }
}

impl Notifier for DesktopNotifier {
    fn permission(&self) -> Permission {
        if self.enabled {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    fn request_permission(&self) -> Permission {
        self.permission()
    }

    fn notify(&self, notification: &Notification) -> CalendarResult<()> {
        let mut desktop = notify_rust::Notification::new();
        desktop
            .appname(APP_NAME)
            .summary(&notification.title)
            .body(&notification.body);

        if let Some(icon) = &notification.icon {
            desktop.icon(icon);
        }

        desktop
            .show()
            .map(|_| ())
            .map_err(|e| CalendarError::Notify(e.to_string()))
    }
}
