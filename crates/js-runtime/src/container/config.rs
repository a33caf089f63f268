//! # Runtime Configuration
//!
//! Unified configuration for all subsystems, read from `JS_*` environment
//! variables on top of the subsystem defaults.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `JS_STORAGE_BACKEND` | `memory` (`rocksdb` needs the `rocksdb` feature) |
//! | `JS_DATA_DIR` | `./data` |
//! | `JS_EVENT_QUEUE_CAPACITY` | `1000` |
//! | `JS_HISTORY_PAGE_SIZE` | `64` |
//! | `JS_DISPATCH_MAX_ATTEMPTS` | `3` |
//! | `JS_DISPATCH_BASE_BACKOFF_MS` | `500` |
//! | `JS_DISPATCH_MAX_BACKOFF_MS` | `30000` |
//! | `JS_DISPATCH_CONCURRENCY` | `16` |
//! | `JS_NOTIFY_ON_REASSIGNMENT` | `true` |
//! | `JS_URGENT_VOTE_THRESHOLD` | `10` (`0` disables) |
//!
//! Telemetry variables are documented in `js-telemetry`.

use js_02_status_transition::TransitionConfig;
use js_04_notification_dispatch::DispatchConfig;
use js_telemetry::TelemetryConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not valid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("base backoff {base:?} exceeds the backoff cap {cap:?}")]
    BackoffOrder { base: Duration, cap: Duration },

    #[error("storage backend {0:?} is not compiled into this build")]
    BackendUnavailable(StorageBackendKind),

    #[error("data directory must not be empty")]
    EmptyDataDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackendKind {
    #[default]
    Memory,
    RocksDb,
}

impl FromStr for StorageBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "rocksdb" | "rocks" => Ok(Self::RocksDb),
            other => Err(format!("unknown backend {other:?}, expected memory or rocksdb")),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    /// RocksDB directory; unused by the memory backend.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub storage: StorageConfig,
    pub transition: TransitionConfig,
    pub dispatch: DispatchConfig,
    pub telemetry: TelemetryConfig,
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => Err(ConfigError::InvalidValue {
                var,
                reason: e.to_string(),
                value,
            }),
        },
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<bool>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                var,
                value,
                reason: "expected true or false".into(),
            }),
        },
    }
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|var| std::env::var(var).ok())?;
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Defaults overridden by whatever `lookup` returns.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(backend) = parse(&lookup, "JS_STORAGE_BACKEND")? {
            config.storage.backend = backend;
        }
        if let Some(dir) = lookup("JS_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }

        if let Some(capacity) = parse(&lookup, "JS_EVENT_QUEUE_CAPACITY")? {
            config.transition.event_queue_capacity = capacity;
        }
        if let Some(page) = parse(&lookup, "JS_HISTORY_PAGE_SIZE")? {
            config.transition.history_page_size = page;
        }

        let dispatch = &mut config.dispatch;
        if let Some(attempts) = parse(&lookup, "JS_DISPATCH_MAX_ATTEMPTS")? {
            dispatch.max_attempts = attempts;
        }
        if let Some(ms) = parse(&lookup, "JS_DISPATCH_BASE_BACKOFF_MS")? {
            dispatch.base_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = parse(&lookup, "JS_DISPATCH_MAX_BACKOFF_MS")? {
            dispatch.max_backoff = Duration::from_millis(ms);
        }
        if let Some(n) = parse(&lookup, "JS_DISPATCH_CONCURRENCY")? {
            dispatch.max_concurrent_deliveries = n;
        }
        if let Some(notify) = parse_flag(&lookup, "JS_NOTIFY_ON_REASSIGNMENT")? {
            dispatch.notify_on_reassignment = notify;
        }
        if let Some(threshold) = parse(&lookup, "JS_URGENT_VOTE_THRESHOLD")? {
            dispatch.urgent_vote_threshold = threshold;
        }

        Ok(config)
    }

    /// Reject configurations the subsystems cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transition.event_queue_capacity == 0 {
            return Err(ConfigError::Zero("event queue capacity"));
        }
        if self.transition.history_page_size == 0 {
            return Err(ConfigError::Zero("history page size"));
        }
        if self.dispatch.max_attempts == 0 {
            return Err(ConfigError::Zero("dispatch max attempts"));
        }
        if self.dispatch.max_concurrent_deliveries == 0 {
            return Err(ConfigError::Zero("dispatch concurrency"));
        }
        if self.dispatch.base_backoff > self.dispatch.max_backoff {
            return Err(ConfigError::BackoffOrder {
                base: self.dispatch.base_backoff,
                cap: self.dispatch.max_backoff,
            });
        }
        if self.storage.backend == StorageBackendKind::RocksDb {
            if !cfg!(feature = "rocksdb") {
                return Err(ConfigError::BackendUnavailable(StorageBackendKind::RocksDb));
            }
            if self.storage.data_dir.as_os_str().is_empty() {
                return Err(ConfigError::EmptyDataDir);
            }
        }
        Ok(())
    }
}
