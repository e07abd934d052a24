//! Application configuration management.

use std::path::PathBuf;

use chrono::FixedOffset;
use serde::Deserialize;
use thiserror::Error;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Sync engine configuration.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Replay binary configuration.
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Sync engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Number of most recent change-log entries exposed in the snapshot.
    #[serde(default = "default_log_view_limit")]
    pub log_view_limit: usize,
    /// Number of change-log entries retained for export (ring buffer capacity).
    #[serde(default = "default_log_retention")]
    pub log_retention: usize,
    /// Reject invalid changes instead of logging a warning and processing them.
    #[serde(default)]
    pub strict_validation: bool,
    /// Offset from UTC, in minutes, used for month labels and CSV timestamps.
    #[serde(default = "default_display_utc_offset_minutes")]
    pub display_utc_offset_minutes: i32,
    /// `chrono` format string for the CSV timestamp column.
    #[serde(default = "default_csv_timestamp_format")]
    pub csv_timestamp_format: String,
}

fn default_log_view_limit() -> usize {
    100
}

fn default_log_retention() -> usize {
    1000
}

fn default_display_utc_offset_minutes() -> i32 {
    -180 // America/Sao_Paulo
}

fn default_csv_timestamp_format() -> String {
    "%d/%m/%Y %H:%M:%S".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            log_view_limit: default_log_view_limit(),
            log_retention: default_log_retention(),
            strict_validation: false,
            display_utc_offset_minutes: default_display_utc_offset_minutes(),
            csv_timestamp_format: default_csv_timestamp_format(),
        }
    }
}

/// Inconsistent sync configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncConfigError {
    /// The exposed log view must hold at least one entry.
    #[error("log_view_limit must be greater than zero")]
    ZeroViewLimit,

    /// The exposed view cannot be larger than what is retained.
    #[error("log_view_limit ({view}) exceeds log_retention ({retention})")]
    ViewExceedsRetention {
        /// Configured view size.
        view: usize,
        /// Configured retention capacity.
        retention: usize,
    },

    /// UTC offset outside of +/- 24 hours.
    #[error("display_utc_offset_minutes out of range: {0}")]
    InvalidOffset(i32),

    /// Empty CSV timestamp format.
    #[error("csv_timestamp_format must not be empty")]
    EmptyTimestampFormat,
}

impl SyncConfig {
    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), SyncConfigError> {
        if self.log_view_limit == 0 {
            return Err(SyncConfigError::ZeroViewLimit);
        }
        if self.log_view_limit > self.log_retention {
            return Err(SyncConfigError::ViewExceedsRetention {
                view: self.log_view_limit,
                retention: self.log_retention,
            });
        }
        if self.display_offset().is_none() {
            return Err(SyncConfigError::InvalidOffset(
                self.display_utc_offset_minutes,
            ));
        }
        if self.csv_timestamp_format.trim().is_empty() {
            return Err(SyncConfigError::EmptyTimestampFormat);
        }
        Ok(())
    }

    /// Returns the display offset, or `None` if it is out of range.
    #[must_use]
    pub fn display_offset(&self) -> Option<FixedOffset> {
        self.display_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "finsync=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Replay binary configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// JSON ledger file to replay.
    #[serde(default = "default_replay_input")]
    pub input: PathBuf,
    /// CSV destination; stdout when unset.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

fn default_replay_input() -> PathBuf {
    PathBuf::from("ledger.json")
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input: default_replay_input(),
            output: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is inconsistent.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config: Self = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("FINSYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config
            .sync
            .validate()
            .map_err(|err| AppError::Config(err.to_string()))?;

        Ok(config)
    }
}
