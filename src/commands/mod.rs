pub mod add;
pub mod check;
pub mod delete;
pub mod edit;
pub mod list;
pub mod month;
pub mod show;

use almanac_core::CalendarError;
use almanac_core::validate::FormErrors;
use owo_colors::OwoColorize;
use tracing::warn;

use crate::render::Render;

/// Print field errors under a heading and fail the command.
fn reject(heading: &str, errors: &FormErrors) -> anyhow::Error {
    eprintln!("{}", heading.red());
    eprintln!("{}", errors.render());
    anyhow::anyhow!("{} invalid field(s)", errors.len())
}

/// A failed save leaves nothing on disk, so surface it as an error with the
/// storage message attached.
fn save_failed(err: CalendarError) -> anyhow::Error {
    match err {
        CalendarError::Persist { id, message } => {
            warn!(id = id.as_deref().unwrap_or("-"), error = %message, "Event change not saved");
            anyhow::anyhow!("Changes were not saved: {message}")
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_failure_reads_as_unsaved_changes() {
        let err = save_failed(CalendarError::Persist {
            id: Some("evt-1".to_string()),
            message: "Storage error: storage quota exceeded".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Changes were not saved: Storage error: storage quota exceeded"
        );

        let err = save_failed(CalendarError::Storage("disk gone".to_string()));
        assert_eq!(err.to_string(), "Storage error: disk gone");
    }
}
