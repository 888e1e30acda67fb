//! Command-line interface: write a record, or inspect and maintain the log file
//! the config points at.

pub mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Log level for CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Silly,
    Debug,
    Verbose,
    Log,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for crate::level::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Silly => Self::Silly,
            LogLevel::Debug => Self::Debug,
            LogLevel::Verbose => Self::Verbose,
            LogLevel::Log => Self::Log,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

/// scribe - Structured logging to console and rotating files.
#[derive(Debug, Parser)]
#[command(name = "scribe", version, about = "Write and maintain log files")]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write one record through the configured transports.
    Log {
        #[arg(value_enum)]
        level: LogLevel,
        /// Scope rendered through `{scope}`
        #[arg(short, long)]
        scope: Option<String>,
        /// Message words, joined by spaces
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print the resolved log file path.
    Path,
    /// Print the log file's size.
    Size,
    /// Empty the log file.
    Clear,
    /// Archive the log file now.
    Rotate,
}

impl Cli {
    /// Loads the config the command line points at.
    ///
    /// # Errors
    /// Config read or parse errors.
    pub fn load_config(&self) -> Result<Config, crate::Error> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

/// Runs a parsed command line.
#[must_use]
pub fn run(cli: &Cli, config: &Config) -> ExitCode {
    match &cli.command {
        Command::Log { level, scope, text } => {
            commands::cmd_log(config, (*level).into(), scope.as_deref(), text)
        }
        Command::Path => commands::cmd_path(config),
        Command::Size => commands::cmd_size(config),
        Command::Clear => commands::cmd_clear(config),
        Command::Rotate => commands::cmd_rotate(config),
    }
}
