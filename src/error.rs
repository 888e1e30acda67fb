//! Unified error type for all scribe operations.

use std::path::PathBuf;

/// Error type for scribe operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error without a more specific file context.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// A render step could not produce output.
    Format(String),
    /// Invalid log level string.
    InvalidLevel(String),
    /// Size string that `parse_size` does not understand.
    InvalidSize(String),
    /// The log file (or its directory) could not be created.
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Appending or flushing a line failed.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Renaming the log file to its archive name failed.
    Rotate {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    /// Truncating the log file to its tail failed.
    Crop {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::Format(s) => write!(f, "format error: {s}"),
            Self::InvalidLevel(level) => write!(f, "invalid level: {level}"),
            Self::InvalidSize(size) => write!(f, "invalid size: {size}"),
            Self::Open { path, source } => {
                write!(f, "can't open {}: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "can't write to {}: {source}", path.display())
            }
            Self::Rotate { from, to, source } => write!(
                f,
                "can't rename {} to {}: {source}",
                from.display(),
                to.display()
            ),
            Self::Crop { path, source } => {
                write!(f, "couldn't crop file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            Self::Open { source, .. }
            | Self::Write { source, .. }
            | Self::Rotate { source, .. }
            | Self::Crop { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}
