use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use queue_engine::ProcessorSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

/// Contents of the optional `ron` config file. Every field may be omitted.
///
/// ```ron
/// (
///     log: Some(Both),
///     data_dir: Some("/home/me/.local/share/chat-queue"),
///     timing: (poll_interval_ms: Some(500), timeout_secs: Some(600)),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log: Option<LogDestination>,
    pub data_dir: Option<PathBuf>,
    /// How often `serve` checks the page file for changes.
    pub page_poll_ms: Option<u64>,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub settle_delay_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub idle_confirmations: Option<u32>,
    pub grace_period_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub keystroke_wake_ms: Option<u64>,
    pub request_wake_ms: Option<u64>,
    pub mutation_wake_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("idle_confirmations must be at least 1")]
    NoConfirmations,
    #[error("{0} must be greater than 0")]
    ZeroInterval(&'static str),
}

const DEFAULT_PAGE_POLL: Duration = Duration::from_millis(250);

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    pub fn page_poll(&self) -> Result<Duration, ConfigError> {
        match self.page_poll_ms {
            Some(0) => Err(ConfigError::ZeroInterval("page_poll_ms")),
            Some(ms) => Ok(Duration::from_millis(ms)),
            None => Ok(DEFAULT_PAGE_POLL),
        }
    }

    pub fn processor_settings(&self) -> Result<ProcessorSettings, ConfigError> {
        self.timing.apply(ProcessorSettings::default())
    }
}

impl TimingConfig {
    /// Overlays the configured values on `settings`.
    pub fn apply(&self, mut settings: ProcessorSettings) -> Result<ProcessorSettings, ConfigError> {
        let millis = Duration::from_millis;
        if let Some(ms) = self.settle_delay_ms {
            settings.settle_delay = millis(ms);
        }
        if let Some(ms) = self.poll_interval_ms {
            if ms == 0 {
                return Err(ConfigError::ZeroInterval("poll_interval_ms"));
            }
            settings.completion.poll_interval = millis(ms);
        }
        if let Some(count) = self.idle_confirmations {
            if count == 0 {
                return Err(ConfigError::NoConfirmations);
            }
            settings.completion.idle_confirmations = count;
        }
        if let Some(ms) = self.grace_period_ms {
            settings.completion.grace_period = millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            settings.completion.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.keystroke_wake_ms {
            settings.keystroke_wake_delay = millis(ms);
        }
        if let Some(ms) = self.request_wake_ms {
            settings.request_wake_delay = millis(ms);
        }
        if let Some(ms) = self.mutation_wake_ms {
            settings.mutation_wake_delay = millis(ms);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_means_defaults() {
        let config = AppConfig::parse("()").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(
            config.processor_settings().unwrap(),
            ProcessorSettings::default()
        );
        assert_eq!(config.page_poll().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn partial_timing_overrides_only_named_fields() {
        let config = AppConfig::parse(
            "(log: Some(Both), timing: (poll_interval_ms: Some(500), timeout_secs: Some(60)))",
        )
        .unwrap();
        assert_eq!(config.log, Some(LogDestination::Both));

        let settings = config.processor_settings().unwrap();
        assert_eq!(settings.completion.poll_interval, Duration::from_millis(500));
        assert_eq!(settings.completion.timeout, Duration::from_secs(60));
        assert_eq!(settings.completion.idle_confirmations, 3);
        assert_eq!(settings.settle_delay, Duration::from_millis(150));
    }

    #[test]
    fn zero_confirmations_is_rejected() {
        let config = AppConfig::parse("(timing: (idle_confirmations: Some(0)))").unwrap();
        assert!(matches!(
            config.processor_settings(),
            Err(ConfigError::NoConfirmations)
        ));
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = AppConfig::parse("(timing: (poll_interval_ms: Some(0)))").unwrap();
        assert!(matches!(
            config.processor_settings(),
            Err(ConfigError::ZeroInterval("poll_interval_ms"))
        ));

        let config = AppConfig::parse("(page_poll_ms: Some(0))").unwrap();
        assert!(matches!(
            config.page_poll(),
            Err(ConfigError::ZeroInterval("page_poll_ms"))
        ));
        let message = config.page_poll().unwrap_err().to_string();
        assert_eq!(message, "page_poll_ms must be greater than 0");
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        assert!(AppConfig::parse("(colour: Some(1))").is_err());
    }
}
