//! Severity levels that gate which records reach which transports.

use std::fmt;
use std::str::FromStr;

/// Derives `Ord` so a transport can compare a record's level against its own threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Firehose output; the default transport threshold lets everything through.
    Silly = 0,
    /// Diagnostics for developers chasing a specific problem.
    Debug = 1,
    /// Chatty operational detail that is still useful outside of debugging.
    Verbose = 2,
    /// Generic `console.log`-style output without a stronger severity.
    Log = 3,
    /// Normal operational milestones.
    #[default]
    Info = 4,
    /// Non-fatal anomalies; file-transport failures are reported at this level.
    Warn = 5,
    /// Failures that prevented an operation from completing.
    Error = 6,
}

impl Level {
    /// Lowercase because config files, CLI args and the `{level}` token use lowercase names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Silly => "silly",
            Self::Debug => "debug",
            Self::Verbose => "verbose",
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// All levels from least to most severe.
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Silly,
            Self::Debug,
            Self::Verbose,
            Self::Log,
            Self::Info,
            Self::Warn,
            Self::Error,
        ]
    }

    /// Warn and error go to stderr; everything else to stdout.
    #[must_use]
    pub const fn is_stderr(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `FromStr` so callers can distinguish "unknown level" from other parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level: '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl From<ParseLevelError> for crate::Error {
    fn from(e: ParseLevelError) -> Self {
        Self::InvalidLevel(e.0)
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silly" | "trace" => Ok(Self::Silly),
            "debug" => Ok(Self::Debug),
            "verbose" => Ok(Self::Verbose),
            "log" => Ok(Self::Log),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "err" => Ok(Self::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
