//! Pluggable logging sink.
//!
//! The store reports what it does through a [`Logger`] handle rather than
//! calling `tracing` directly, so embedders can route store diagnostics into
//! their own sink. The default [`TracingLogger`] forwards every message to
//! `tracing` events, which the host application renders with whatever
//! subscriber it installs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// `tracing` target of events emitted by [`TracingLogger`].
pub const TARGET: &str = "jsondrive_store";

/// Severity of a log message, most severe first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(Self::Fatal),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Leveled logging sink used by the store.
///
/// Implementors only provide [`Logger::log`]; the per-level methods forward to
/// it. Messages are passed as pre-captured [`fmt::Arguments`], so callers use
/// `format_args!` and nothing is allocated for messages a sink discards.
pub trait Logger: Send + Sync {
    /// Record `args` at `level`. Sinks may drop messages below their threshold.
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>);

    /// Log an unrecoverable condition.
    fn fatal(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Fatal, args);
    }

    /// Log a failed operation.
    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    /// Log a recoverable problem.
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    /// Log a notable event.
    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    /// Log a per-operation detail.
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    /// Log fine-grained internals.
    fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }
}

/// Default sink: forwards messages at or above `level` to `tracing`.
///
/// Events are emitted under the `jsondrive_store` target, so a subscriber
/// filter such as `RUST_LOG=jsondrive_store=debug` selects them. Hosts that
/// filter at the subscriber should construct this at [`LogLevel::Trace`].
/// `tracing` has no fatal level, so fatal messages are emitted as `ERROR`
/// events carrying a `fatal = true` field.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger {
    level: LogLevel,
}

impl TracingLogger {
    /// Create a logger that forwards messages at or above `level`.
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Threshold this logger was created with.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether a message at `level` passes this logger's threshold.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        match level {
            LogLevel::Fatal => tracing::error!(target: TARGET, fatal = true, "{}", args),
            LogLevel::Error => tracing::error!(target: TARGET, "{}", args),
            LogLevel::Warn => tracing::warn!(target: TARGET, "{}", args),
            LogLevel::Info => tracing::info!(target: TARGET, "{}", args),
            LogLevel::Debug => tracing::debug!(target: TARGET, "{}", args),
            LogLevel::Trace => tracing::trace!(target: TARGET, "{}", args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        lines: Mutex<Vec<(LogLevel, String)>>,
    }

    impl Logger for Capture {
        fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
            self.lines.lock().unwrap().push((level, args.to_string()));
        }
    }

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Fatal < LogLevel::Error);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn parse_and_display() {
        for level in [
            LogLevel::Fatal,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn provided_methods_forward_levels() {
        let sink = Capture::default();
        sink.fatal(format_args!("f{}", 1));
        sink.warn(format_args!("w"));
        sink.trace(format_args!("t"));

        let lines = sink.lines.lock().unwrap();
        assert_eq!(
            *lines,
            vec![
                (LogLevel::Fatal, "f1".to_string()),
                (LogLevel::Warn, "w".to_string()),
                (LogLevel::Trace, "t".to_string()),
            ]
        );
    }

    #[test]
    fn tracing_logger_threshold() {
        let logger = TracingLogger::new(LogLevel::Info);
        assert!(logger.enabled(LogLevel::Fatal));
        assert!(logger.enabled(LogLevel::Info));
        assert!(!logger.enabled(LogLevel::Debug));
        // Emitting without a subscriber installed is a no-op.
        logger.debug(format_args!("dropped"));
        logger.info(format_args!("kept"));
    }

    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_events(filter: &str, emit: impl FnOnce()) -> String {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn debug_events_reach_subscriber_filtering_at_debug() {
        let logger = TracingLogger::new(LogLevel::Trace);
        let out = capture_events("jsondrive_store=debug", || {
            logger.debug(format_args!("wrote users/A"));
            logger.trace(format_args!("too verbose"));
        });
        assert!(out.contains("wrote users/A"), "{out}");
        assert!(out.contains(TARGET), "{out}");
        assert!(!out.contains("too verbose"), "{out}");
    }

    #[test]
    fn threshold_drops_before_subscriber() {
        let logger = TracingLogger::new(LogLevel::Info);
        let out = capture_events("debug", || {
            logger.debug(format_args!("hidden"));
            logger.fatal(format_args!("boom"));
        });
        assert!(!out.contains("hidden"), "{out}");
        assert!(out.contains("boom") && out.contains("fatal=true"), "{out}");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&LogLevel::Debug).unwrap();
        assert_eq!(json, "\"debug\"");
        let parsed: LogLevel = serde_json::from_str("\"trace\"").unwrap();
        assert_eq!(parsed, LogLevel::Trace);
    }
}
