//! Global almanac configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};
use crate::scheduler::MarkPolicy;
use crate::storage::FileStorage;

static DEFAULT_DATA_DIR: &str = "~/.almanac";
static DEFAULT_POLL_INTERVAL: &str = "60s";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_poll_interval() -> String {
    DEFAULT_POLL_INTERVAL.to_string()
}

fn default_notifications() -> bool {
    true
}

/// Configuration at ~/.config/almanac/config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AlmanacConfig {
    /// Where the events slot is stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How often the scheduler scans for due events (e.g. "60s", "5m").
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    #[serde(default)]
    pub mark_policy: MarkPolicy,

    /// Set to false to keep the scheduler from showing anything.
    #[serde(default = "default_notifications")]
    pub notifications: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_icon: Option<String>,
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        AlmanacConfig {
            data_dir: default_data_dir(),
            poll_interval: default_poll_interval(),
            mark_policy: MarkPolicy::default(),
            notifications: default_notifications(),
            notification_icon: None,
        }
    }
}

impl AlmanacConfig {
    pub fn config_path() -> CalendarResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalendarError::Config("Could not determine config directory".into()))?
            .join("almanac");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/almanac/config.toml, creating a commented default on first run.
    pub fn load() -> CalendarResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> CalendarResult<Self> {
        let config: AlmanacConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| CalendarError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalendarError::Config(e.to_string()))?;

        config.poll_period()?;

        Ok(config)
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Storage slot for events under `data_dir`.
    pub fn event_storage(&self) -> FileStorage {
        FileStorage::events(&self.data_path())
    }

    /// Parsed `poll_interval`. Must be longer than zero.
    pub fn poll_period(&self) -> CalendarResult<Duration> {
        parse_period(&self.poll_interval)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalendarResult<()> {
        let contents = format!(
            "\
# almanac configuration

# Where events are stored:
# data_dir = \"{}\"

# How often to check for events that are due:
# poll_interval = \"{}\"

# When to mark a due event as notified: \"always\" or \"on_delivery\"
# mark_policy = \"always\"

# Set to false to silence notifications:
# notifications = true

# Icon shown with each notification (name or path):
# notification_icon = \"x-office-calendar\"
",
            DEFAULT_DATA_DIR, DEFAULT_POLL_INTERVAL
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalendarError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalendarError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// Parse a humantime period such as "60s" or "1m 30s".
pub fn parse_period(input: &str) -> CalendarResult<Duration> {
    let period = humantime::parse_duration(input.trim())
        .map_err(|e| CalendarError::Config(format!("Invalid interval '{}': {e}", input)))?;

    if period.is_zero() {
        return Err(CalendarError::Config(format!(
            "Interval '{}' must be longer than zero",
            input
        )));
    }

    Ok(period)
}
