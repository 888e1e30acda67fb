//! TOML configuration. Every field has a default, so an empty file (or no file)
//! still yields a working console + file logger.

mod size;
mod structs;

pub use size::{format_size, parse_size};
pub use structs::{ConsoleConfig, FileConfig, GeneralConfig};

use crate::internal;
use crate::level::Level;
use crate::record::ProcessKind;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "scribe.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl Config {
    /// Loads from the default location; a missing file yields the defaults.
    ///
    /// # Errors
    /// Fails if the config directory can't be determined, the file can't be
    /// read, or TOML parsing hits a syntax error.
    pub fn load() -> Result<Self, crate::Error> {
        internal::debug("CONFIG", "Loading config from default location");
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, crate::Error> {
        if !path.exists() {
            internal::debug("CONFIG", "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        internal::info("CONFIG", &format!("Config loaded from {}", path.display()));
        Ok(config)
    }

    /// # Errors
    /// Returns [`crate::Error::ConfigParse`] on invalid TOML or mistyped fields.
    pub fn parse(content: &str) -> Result<Self, crate::Error> {
        Ok(toml::from_str(content)?)
    }

    /// `<config_dir>/scribe/scribe.toml`, per platform conventions.
    ///
    /// # Errors
    /// Fails when the platform has no home directory to derive it from.
    pub fn config_path() -> Result<PathBuf, crate::Error> {
        directories::ProjectDirs::from("", "", "scribe")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(crate::Error::ConfigDirNotFound)
    }

    /// Unknown level names fall back to `Silly` so nothing gets lost.
    #[must_use]
    pub fn parse_level(&self) -> Level {
        parse_level_or(&self.general.level, Level::Silly)
    }

    #[must_use]
    pub fn parse_internal_level(&self) -> Level {
        parse_level_or(&self.general.internal_level, Level::Warn)
    }

    #[must_use]
    pub fn parse_process(&self) -> ProcessKind {
        self.general.process.parse().unwrap_or_else(|e| {
            internal::warn("CONFIG", &format!("{e}, using main"));
            ProcessKind::Main
        })
    }

    /// `file.max_size` in bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidSize`] when the string isn't a size.
    pub fn file_max_size(&self) -> Result<u64, crate::Error> {
        parse_size(&self.file.max_size)
            .ok_or_else(|| crate::Error::InvalidSize(self.file.max_size.clone()))
    }
}

pub(crate) fn parse_level_or(s: &str, default: Level) -> Level {
    s.parse().unwrap_or_else(|e| {
        internal::warn("CONFIG", &format!("{e}, using {default}"));
        default
    })
}
