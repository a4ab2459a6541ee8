//! Screener settings: the hot-reloadable DTO, its atomically swapped
//! holder, and the JSON file it is persisted in.
//!
//! A [`Settings`] value is never mutated in place. Updates build a new
//! value and swap it into the [`SettingsHandle`], so a tick that already
//! read the active settings keeps seeing a consistent snapshot.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SurgeError;

/// Default measurement window, in seconds.
pub const DEFAULT_INTERVAL: u64 = 60;

/// Default growth threshold, in percent.
pub const DEFAULT_MIN_GROWTH: f64 = 2.0;

/// Default spacing between two alerts for the same symbol, in seconds.
pub const DEFAULT_TIMEOUT: u64 = 60;

/// Screener settings, replaced as a whole on every update.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Width of the measurement window, in seconds.
    pub interval: u64,
    /// Growth threshold in percent; an alert needs a strictly larger change.
    pub min_growth: f64,
    /// Minimum spacing between two alerts for the same symbol, in seconds.
    pub timeout: u64,
    pub chat_id: Option<i64>,
    pub bot_token: Option<String>,
}

/// Where alerts go. Only exists when the settings are ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertTarget<'a> {
    pub bot_token: &'a str,
    pub chat_id: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            min_growth: DEFAULT_MIN_GROWTH,
            timeout: DEFAULT_TIMEOUT,
            chat_id: None,
            bot_token: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("interval", &self.interval)
            .field("min_growth", &self.min_growth)
            .field("timeout", &self.timeout)
            .field("chat_id", &self.chat_id)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Settings {
    /// Returns `true` when both the chat id and a non-empty bot token are set.
    pub fn is_ready(&self) -> bool {
        self.target().is_some()
    }

    /// Returns the alert destination, or `None` if the settings are not ready.
    pub fn target(&self) -> Option<AlertTarget<'_>> {
        match (self.chat_id, self.bot_token.as_deref()) {
            (Some(chat_id), Some(bot_token)) if !bot_token.is_empty() => {
                Some(AlertTarget { bot_token, chat_id })
            }
            _ => None,
        }
    }

    /// The per-symbol cooldown as a [`Duration`].
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Checks values the screener cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`SurgeError::Config`] if the window is zero or the growth
    /// threshold is not a finite number.
    pub fn validate(&self) -> crate::Result<()> {
        if self.interval == 0 {
            return Err(SurgeError::Config(
                "settings interval must be greater than zero".to_string(),
            ));
        }
        if !self.min_growth.is_finite() {
            return Err(SurgeError::Config(format!(
                "settings min_growth must be finite, got {}",
                self.min_growth
            )));
        }
        Ok(())
    }

    /// Loads and validates settings from a JSON file.
    ///
    /// Fields missing from the file take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SurgeError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let settings: Self = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Shared holder of the single live [`Settings`] value.
///
/// Cloning the handle shares the same slot. [`SettingsHandle::replace`]
/// swaps one `Arc`, so readers see either the old value or the new one.
#[derive(Clone)]
pub struct SettingsHandle {
    tx: Arc<watch::Sender<Arc<Settings>>>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        let (tx, _) = watch::channel(Arc::new(settings));
        Self { tx: Arc::new(tx) }
    }

    /// Returns the active settings.
    pub fn current(&self) -> Arc<Settings> {
        self.tx.borrow().clone()
    }

    /// Replaces the active settings with `settings`.
    pub fn replace(&self, settings: Settings) {
        self.tx.send_replace(Arc::new(settings));
    }
}

/// Polls a settings file and hands every valid new version to `on_change`.
///
/// Runs until the task is dropped. A file that disappears or fails to
/// parse is logged and the previously delivered settings stay in effect.
pub async fn watch_settings_file<F>(path: PathBuf, period: Duration, on_change: F)
where
    F: Fn(Settings) + Send + 'static,
{
    let mut last_modified = modified_at(&path);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick completes immediately; the startup load already covered it.
    ticker.tick().await;

    info!(path = %path.display(), every_secs = period.as_secs(), "Watching settings file");

    loop {
        ticker.tick().await;

        let modified = modified_at(&path);
        if modified.is_none() || modified == last_modified {
            continue;
        }
        last_modified = modified;

        match Settings::load(&path) {
            Ok(settings) => {
                debug!(?settings, "Settings file changed");
                on_change(settings);
            }
            Err(e) => warn!(path = %path.display(), "Ignoring settings file: {e}"),
        }
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ready() -> Settings {
        Settings {
            chat_id: Some(42),
            bot_token: Some("123:abc".to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn defaults_match_storage_model() {
        let settings = Settings::default();
        assert_eq!(settings.interval, 60);
        assert_eq!(settings.min_growth, 2.0);
        assert_eq!(settings.timeout, 60);
        assert!(!settings.is_ready());
    }

    #[test]
    fn ready_needs_chat_and_token() {
        assert!(ready().is_ready());

        let no_chat = Settings {
            chat_id: None,
            ..ready()
        };
        assert!(!no_chat.is_ready());

        let no_token = Settings {
            bot_token: None,
            ..ready()
        };
        assert!(!no_token.is_ready());

        let empty_token = Settings {
            bot_token: Some(String::new()),
            ..ready()
        };
        assert!(!empty_token.is_ready());
    }

    #[test]
    fn target_exposes_destination() {
        let settings = ready();
        let target = settings.target().unwrap();
        assert_eq!(target.chat_id, 42);
        assert_eq!(target.bot_token, "123:abc");
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", ready());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("123:abc"));
    }

    #[test]
    fn partial_json_inherits_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"min_growth": 5.5}"#).unwrap();
        assert_eq!(settings.min_growth, 5.5);
        assert_eq!(settings.interval, DEFAULT_INTERVAL);
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert!(settings.chat_id.is_none());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let settings = Settings {
            interval: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_nan_threshold() {
        let settings = Settings {
            min_growth: f64::NAN,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"interval": 30, "min_growth": 1.5, "timeout": 120, "chat_id": -100, "bot_token": "t"}}"#
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.interval, 30);
        assert_eq!(settings.timeout, 120);
        assert_eq!(settings.chat_id, Some(-100));
        assert!(settings.is_ready());
    }

    #[test]
    fn load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Settings::load(file.path()),
            Err(SurgeError::Json(_))
        ));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn handle_swaps_whole_value() {
        let handle = SettingsHandle::new(Settings::default());
        let before = handle.current();

        handle.replace(Settings {
            min_growth: 9.0,
            ..ready()
        });

        // A reader holding the old Arc is unaffected by the swap.
        assert_eq!(before.min_growth, DEFAULT_MIN_GROWTH);
        assert_eq!(handle.current().min_growth, 9.0);
        assert!(handle.clone().current().is_ready());
    }
}
