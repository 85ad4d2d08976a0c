use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_INDENT;
use crate::logger::{LogLevel, Logger, TracingLogger};

/// Tunables for an opened [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Indentation unit for stored documents (default: tab followed by a space).
    pub indent: String,
    /// Permission bits for created directories (unix only, default: `0o755`).
    pub dir_mode: u32,
    /// Permission bits for record files (unix only, default: `0o644`).
    pub file_mode: u32,
    /// `fsync` the temporary file before it is renamed into place.
    pub sync_writes: bool,
    /// Threshold for the default logger. Ignored when a custom logger is supplied.
    pub log_level: LogLevel,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            dir_mode: 0o755,
            file_mode: 0o644,
            sync_writes: false,
            log_level: LogLevel::Info,
        }
    }
}

/// Options accepted by [`Store::with_options`](crate::Store::with_options).
#[derive(Clone, Default)]
pub struct StoreOptions {
    pub config: StoreConfig,
    /// Custom sink. When `None`, a [`TracingLogger`] at `config.log_level` is used.
    pub logger: Option<Arc<dyn Logger>>,
}

impl StoreOptions {
    /// Replace the store configuration.
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Route store diagnostics to `logger` instead of the default sink.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub(crate) fn into_parts(self) -> (StoreConfig, Arc<dyn Logger>) {
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger::new(self.config.log_level)));
        (self.config, logger)
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("config", &self.config)
            .field("custom_logger", &self.logger.is_some())
            .finish()
    }
}
