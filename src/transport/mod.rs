//! Transports are the pluggable sinks behind the logger. The built-in console
//! and file transports cover the common cases; the `Transport` trait lets users
//! add their own.

mod console;
pub mod file;

pub use console::{ConsoleTransport, default_format as console_format};
pub use file::FileTransport;

use crate::level::Level;
use crate::record::LogRecord;

/// `Send + Sync` so one logger can be shared across threads.
pub trait Transport: Send + Sync {
    /// Renders and delivers one record.
    ///
    /// Failures stay inside the transport; nothing propagates to the log call.
    fn handle(&self, record: &LogRecord);

    /// Records below this level are skipped by the logger.
    fn min_level(&self) -> Level {
        Level::Silly
    }

    /// Pushes out anything buffered.
    ///
    /// # Errors
    /// I/O errors from the underlying sink.
    fn flush(&self) -> Result<(), crate::Error> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn handle(&self, record: &LogRecord) {
        (**self).handle(record);
    }

    fn min_level(&self) -> Level {
        (**self).min_level()
    }

    fn flush(&self) -> Result<(), crate::Error> {
        (**self).flush()
    }
}
