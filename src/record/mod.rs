//! The unit every transport consumes: a level, the caller's argument list, a
//! timestamp, and where the record came from.

mod value;

pub use value::{ARRAY_MARKER, CIRCULAR_MARKER, OBJECT_MARKER, SharedValue, Value};

use crate::level::Level;
use chrono::{DateTime, Local};
use std::fmt;
use std::str::FromStr;

/// Which kind of process emitted the record. Picks the default log file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessKind {
    #[default]
    Main,
    Renderer,
    Worker,
}

impl ProcessKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Renderer => "renderer",
            Self::Worker => "worker",
        }
    }

    /// Each process role writes to its own file unless the caller overrides it.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Main => "main.log",
            Self::Renderer => "renderer.log",
            Self::Worker => "worker.log",
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" | "browser" => Ok(Self::Main),
            "renderer" => Ok(Self::Renderer),
            "worker" => Ok(Self::Worker),
            _ => Err(crate::Error::Format(format!("unknown process kind: {s}"))),
        }
    }
}

/// Origin metadata attached by the logger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Origin {
    pub process: ProcessKind,
    /// Optional subsystem name, rendered through the `{scope}` token.
    pub scope: Option<String>,
}

/// One log call. Transports only ever see it by shared reference.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub data: Vec<Value>,
    pub date: DateTime<Local>,
    pub origin: Origin,
}

impl LogRecord {
    /// Stamps the record with the current local time and a default (main, unscoped) origin.
    #[must_use]
    pub fn new(level: Level, data: Vec<Value>) -> Self {
        Self {
            level,
            data,
            date: Local::now(),
            origin: Origin::default(),
        }
    }

    /// Tests and replays need deterministic timestamps.
    #[must_use]
    pub const fn with_date(mut self, date: DateTime<Local>) -> Self {
        self.date = date;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.origin.scope = Some(scope.into());
        self
    }

    /// Best-effort flattening of the raw arguments, the last resort when rendering fails.
    #[must_use]
    pub fn raw_text(&self) -> String {
        self.data
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
