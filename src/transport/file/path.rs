//! Where the log file lives.

use crate::record::LogRecord;
use std::path::{Path, PathBuf};

/// Platform locations available to a [`ResolvePath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVariables {
    pub app_name: String,
    /// Per-user application data root (`%APPDATA%`, `~/.config`, `~/Library/Application Support`).
    pub app_data: PathBuf,
    pub home: PathBuf,
    /// Conventional log directory for `app_name` on this platform.
    pub library_default_dir: PathBuf,
    pub temp: PathBuf,
    /// `app_data` joined with `app_name`.
    pub user_data: PathBuf,
    pub file_name: String,
}

impl PathVariables {
    /// Logs go under `~/Library/Logs/<app>` on macOS and `<app_data>/<app>/logs` elsewhere.
    #[must_use]
    pub fn detect(app_name: &str, file_name: &str) -> Self {
        let temp = std::env::temp_dir();

        let Some(dirs) = directories::BaseDirs::new() else {
            return Self {
                app_name: app_name.to_string(),
                app_data: PathBuf::from("."),
                home: PathBuf::from("."),
                library_default_dir: PathBuf::from("logs"),
                temp,
                user_data: PathBuf::from(app_name),
                file_name: file_name.to_string(),
            };
        };

        let home = dirs.home_dir().to_path_buf();
        let app_data = dirs.config_dir().to_path_buf();
        let user_data = app_data.join(app_name);
        let library_default_dir = if cfg!(target_os = "macos") {
            home.join("Library").join("Logs").join(app_name)
        } else {
            user_data.join("logs")
        };

        Self {
            app_name: app_name.to_string(),
            app_data,
            home,
            library_default_dir,
            temp,
            user_data,
            file_name: file_name.to_string(),
        }
    }
}

/// Name of the running executable, or `scribe` if it cannot be determined.
#[must_use]
pub fn default_app_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "scribe".to_string())
}

/// Picks the file for a record. Called on every write, so a resolver may route
/// records to different files.
///
/// Closures `Fn(&PathVariables, Option<&LogRecord>) -> PathBuf` implement this.
pub trait ResolvePath: Send + Sync {
    fn resolve(&self, vars: &PathVariables, record: Option<&LogRecord>) -> PathBuf;
}

impl<F> ResolvePath for F
where
    F: Fn(&PathVariables, Option<&LogRecord>) -> PathBuf + Send + Sync,
{
    fn resolve(&self, vars: &PathVariables, record: Option<&LogRecord>) -> PathBuf {
        self(vars, record)
    }
}

/// `library_default_dir/file_name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPath;

impl ResolvePath for DefaultPath {
    fn resolve(&self, vars: &PathVariables, _: Option<&LogRecord>) -> PathBuf {
        vars.library_default_dir.join(&vars.file_name)
    }
}

/// Always the same file.
#[derive(Debug, Clone)]
pub struct FixedPath(pub PathBuf);

impl FixedPath {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_path_buf())
    }
}

impl ResolvePath for FixedPath {
    fn resolve(&self, _: &PathVariables, _: Option<&LogRecord>) -> PathBuf {
        self.0.clone()
    }
}
