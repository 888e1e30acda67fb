//! Configuration struct definitions.

use crate::render::DEFAULT_DEPTH;
use serde::Deserialize;

/// General configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logger-wide minimum level.
    pub level: String,
    /// Process kind (main, renderer, worker).
    pub process: String,
    /// Application name; feeds the default log directory.
    pub app_name: Option<String>,
    /// Minimum level for scribe's own diagnostics.
    pub internal_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            level: "silly".to_string(),
            process: "main".to_string(),
            app_name: None,
            internal_level: "warn".to_string(),
        }
    }
}

/// Console transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Enable console output.
    pub enabled: bool,
    /// Minimum level.
    pub level: String,
    /// Line template.
    pub format: String,
    /// Force ANSI styles on or off; absent means detect a TTY.
    pub use_styles: Option<bool>,
    /// Serialization depth; absent means the process default.
    pub depth: Option<usize>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "silly".to_string(),
            format: crate::transport::console_format(),
            use_styles: None,
            depth: None,
        }
    }
}

/// File transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Enable file output.
    pub enabled: bool,
    /// Minimum level.
    pub level: String,
    /// Line template.
    pub format: String,
    /// Rotation threshold ("1M", "512K", "0" disables).
    pub max_size: String,
    /// Write through on every record instead of buffering.
    pub sync: bool,
    /// File name; absent means the process default.
    pub file_name: Option<String>,
    /// Fixed file path; overrides `dir` and `file_name`.
    pub path: Option<String>,
    /// Directory override.
    pub dir: Option<String>,
    /// Serialization depth; 0 is unlimited.
    pub depth: usize,
    /// Permission bits for new files.
    pub mode: u32,
    /// Keep existing content (`false` truncates on first write).
    pub append: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "silly".to_string(),
            format: crate::render::FormatTemplate::default().as_str().to_string(),
            max_size: "1M".to_string(),
            sync: true,
            file_name: None,
            path: None,
            dir: None,
            depth: DEFAULT_DEPTH,
            mode: 0o666,
            append: true,
        }
    }
}
