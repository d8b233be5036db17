//! Structured logging built on `slog`, matching the teacher's `flux::logging`
//! shape: a root logger constructed once at process start and threaded by
//! reference into every long-lived subsystem (`World`, `Endpoint`,
//! `LobbyManager`, ...), each of which calls `.new(o!())` to attach its own
//! context fields.

pub use slog::{debug, error, info, o, trace, warn, Logger};

use slog::Drain;
use std::str::FromStr;

/// Recognized `RT_LOG_LEVEL` values, mirroring the common slog level set.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(()),
        }
    }
}

impl From<Level> for slog::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => slog::Level::Trace,
            Level::Debug => slog::Level::Debug,
            Level::Info => slog::Level::Info,
            Level::Warn => slog::Level::Warning,
            Level::Error => slog::Level::Error,
        }
    }
}

/// Build the terminal-decorated root logger. Reads `RT_LOG_LEVEL` from the
/// environment if `level` is `None`, defaulting to `Info`.
pub fn init(level: Option<Level>) -> Logger {
    let level = level
        .or_else(|| std::env::var("RT_LOG_LEVEL").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(Level::Info);

    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog::LevelFilter::new(drain, level.into()).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!("component" => "rtype-server"))
}

/// A logger that discards everything, for tests and library defaults.
pub fn discard() -> Logger {
    Logger::root(slog::Discard, o!())
}
