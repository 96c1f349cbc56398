//! Error types for almanac.

use thiserror::Error;

use crate::validate::FormErrors;

/// Errors that can occur in almanac operations.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// The in-memory mutation was applied but could not be flushed to the slot.
    /// `id` names the added, updated or deleted event.
    #[error("Could not save events: {message}")]
    Persist { id: Option<String>, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid event: {0}")]
    Validation(#[from] FormErrors),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for almanac operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
