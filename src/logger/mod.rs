//! The logger stamps each call into a [`LogRecord`] and fans it out to every
//! transport whose level admits it.

mod builder;
mod from_config;

pub use builder::{ConsoleBuilder, FileBuilder, LoggerBuilder};

use crate::level::Level;
use crate::record::{LogRecord, Origin, Value};
use crate::transport::Transport;
use std::sync::Arc;

/// Immutable after build, so it can be shared across threads without locks.
#[derive(Default)]
pub struct Logger {
    min_level: Level,
    transports: Vec<Arc<dyn Transport>>,
    origin: Origin,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Core dispatch: stamps a record and hands it to every transport.
    pub fn log(&self, level: Level, data: Vec<Value>) {
        if level < self.min_level {
            return;
        }
        self.dispatch(&LogRecord::new(level, data).with_origin(self.origin.clone()));
    }

    /// Dispatches a prebuilt record as is; only the level filters apply.
    pub fn log_record(&self, record: &LogRecord) {
        if record.level < self.min_level {
            return;
        }
        self.dispatch(record);
    }

    fn dispatch(&self, record: &LogRecord) {
        for transport in &self.transports {
            if record.level >= transport.min_level() {
                transport.handle(record);
            }
        }
    }

    pub fn error(&self, data: Vec<Value>) {
        self.log(Level::Error, data);
    }

    pub fn warn(&self, data: Vec<Value>) {
        self.log(Level::Warn, data);
    }

    pub fn info(&self, data: Vec<Value>) {
        self.log(Level::Info, data);
    }

    pub fn verbose(&self, data: Vec<Value>) {
        self.log(Level::Verbose, data);
    }

    pub fn debug(&self, data: Vec<Value>) {
        self.log(Level::Debug, data);
    }

    pub fn silly(&self, data: Vec<Value>) {
        self.log(Level::Silly, data);
    }

    /// A view that tags every record with `name`, rendered through `{scope}`.
    #[must_use]
    pub fn scope(&self, name: impl Into<String>) -> Scope<'_> {
        Scope {
            logger: self,
            name: name.into(),
        }
    }

    /// # Errors
    /// Returns the first error across all transports.
    pub fn flush(&self) -> Result<(), crate::Error> {
        for transport in &self.transports {
            transport.flush()?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn min_level(&self) -> Level {
        self.min_level
    }

    #[must_use]
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }

    #[must_use]
    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }
}

/// Borrowed from a [`Logger`] by [`Logger::scope`].
pub struct Scope<'a> {
    logger: &'a Logger,
    name: String,
}

impl Scope<'_> {
    pub fn log(&self, level: Level, data: Vec<Value>) {
        if level < self.logger.min_level {
            return;
        }
        let record = LogRecord::new(level, data)
            .with_origin(self.logger.origin.clone())
            .with_scope(self.name.as_str());
        self.logger.dispatch(&record);
    }

    pub fn error(&self, data: Vec<Value>) {
        self.log(Level::Error, data);
    }

    pub fn warn(&self, data: Vec<Value>) {
        self.log(Level::Warn, data);
    }

    pub fn info(&self, data: Vec<Value>) {
        self.log(Level::Info, data);
    }

    pub fn verbose(&self, data: Vec<Value>) {
        self.log(Level::Verbose, data);
    }

    pub fn debug(&self, data: Vec<Value>) {
        self.log(Level::Debug, data);
    }

    pub fn silly(&self, data: Vec<Value>) {
        self.log(Level::Silly, data);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
