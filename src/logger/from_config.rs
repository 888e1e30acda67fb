//! Logger construction from a [`Config`].

use super::{Logger, LoggerBuilder};
use crate::config::{Config, ConsoleConfig, parse_level_or};
use crate::internal;
use crate::level::Level;
use crate::record::ProcessKind;
use crate::transport::file::{WriteFlag, WriteOptions};
use crate::transport::{ConsoleTransport, FileTransport};

impl Logger {
    /// Builds a logger from the config at the default location, or from defaults
    /// when there is none.
    #[must_use]
    pub fn from_default_config() -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            internal::warn("CONFIG", &format!("Using defaults: {e}"));
            Config::default()
        });
        Self::from_config(&config)
    }

    /// Invalid values fall back to their defaults with an internal warning,
    /// so a typo in the config never disables logging.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let process = config.parse_process();
        let mut builder = LoggerBuilder::new()
            .level(config.parse_level())
            .process(process);
        let mut transports: Vec<&str> = Vec::new();

        if config.console.enabled {
            builder = builder.with_console(ConsoleTransport::from_config(&config.console, process));
            transports.push("console");
        }

        if config.file.enabled {
            builder = builder.with_file(FileTransport::from_config(config));
            transports.push("file");
        }

        if transports.is_empty() {
            internal::warn("LOGGER", "No transports enabled");
        } else {
            internal::debug(
                "LOGGER",
                &format!("Transports enabled: [{}]", transports.join(", ")),
            );
        }

        builder.build()
    }
}

impl ConsoleTransport {
    #[must_use]
    pub fn from_config(config: &ConsoleConfig, process: ProcessKind) -> Self {
        let mut console = Self::for_process(process)
            .level(parse_level_or(&config.level, Level::Silly))
            .format(&config.format);
        if let Some(enabled) = config.use_styles {
            console = console.use_styles(enabled);
        }
        if let Some(depth) = config.depth {
            console = console.depth(Some(depth));
        }
        console
    }
}

impl FileTransport {
    /// Uses the global registry.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let file = &config.file;

        let max_size = config.file_max_size().unwrap_or_else(|e| {
            internal::warn("CONFIG", &format!("{e}, using 1M"));
            crate::transport::file::DEFAULT_MAX_SIZE
        });
        let flag = if file.append {
            WriteFlag::Append
        } else {
            WriteFlag::Truncate
        };

        let mut transport = Self::new()
            .process(config.parse_process())
            .level(parse_level_or(&file.level, Level::Silly))
            .format(&file.format)
            .depth((file.depth > 0).then_some(file.depth))
            .max_size(max_size)
            .sync(file.sync)
            .write_options(WriteOptions {
                flag,
                mode: file.mode,
            });

        if let Some(app_name) = &config.general.app_name {
            transport = transport.app_name(app_name);
        }
        if let Some(name) = &file.file_name {
            transport = transport.file_name(name.as_str());
        }
        if let Some(dir) = &file.dir {
            transport = transport.dir(shellexpand::tilde(dir).into_owned());
        }
        if let Some(path) = &file.path {
            transport = transport.path(shellexpand::tilde(path).into_owned());
        }

        internal::debug(
            "FILE",
            &format!("Logging to {}", transport.resolve_path(None).display()),
        );
        transport
    }
}
