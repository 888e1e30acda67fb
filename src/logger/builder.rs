//! Stepwise construction. Each transport kind has a sub-builder that returns to
//! the parent through `done()`.

use super::Logger;
use crate::level::Level;
use crate::record::{Origin, ProcessKind};
use crate::render::Pipeline;
use crate::transport::file::{FileRegistry, ResolvePath, Rotation, WriteOptions};
use crate::transport::{ConsoleTransport, FileTransport, Transport};
use std::path::Path;
use std::sync::Arc;

#[derive(Default)]
pub struct LoggerBuilder {
    min_level: Level,
    origin: Origin,
    transports: Vec<Arc<dyn Transport>>,
    console: Option<Arc<ConsoleTransport>>,
    /// File transports whose failure warnings should go to the console.
    unrouted: Vec<Arc<FileTransport>>,
}

impl LoggerBuilder {
    /// Everything passes the logger; each transport applies its own level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_level: Level::Silly,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Set before `console()`/`file()`: it picks their depth and file name defaults.
    #[must_use]
    pub const fn process(mut self, process: ProcessKind) -> Self {
        self.origin.process = process;
        self
    }

    /// Tags every record from the built logger.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.origin.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn console(self) -> ConsoleBuilder {
        let output = ConsoleTransport::for_process(self.origin.process);
        ConsoleBuilder {
            parent: self,
            output,
        }
    }

    #[must_use]
    pub fn file(self) -> FileBuilder {
        let output = FileTransport::new().process(self.origin.process);
        FileBuilder {
            parent: self,
            output,
            routed: false,
        }
    }

    /// Adds a console transport built elsewhere; it receives file failure warnings.
    #[must_use]
    pub fn with_console(mut self, console: ConsoleTransport) -> Self {
        let console = Arc::new(console);
        self.console = Some(Arc::clone(&console));
        self.transports.push(console);
        self
    }

    /// Adds a file transport built elsewhere. Its failure warnings go to the
    /// console transport unless it already has a fallback.
    #[must_use]
    pub fn with_file(self, file: FileTransport) -> Self {
        self.push_file(file, false)
    }

    fn push_file(mut self, file: FileTransport, routed: bool) -> Self {
        let file = Arc::new(file);
        if !routed {
            self.unrouted.push(Arc::clone(&file));
        }
        self.transports.push(file);
        self
    }

    /// Any transport beyond the built-in two.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transports.push(Arc::new(transport));
        self
    }

    /// Wires file failure warnings to the console transport, if there is one.
    #[must_use]
    pub fn build(self) -> Logger {
        if let Some(console) = &self.console {
            for file in &self.unrouted {
                file.set_fallback(Arc::clone(console) as Arc<dyn Transport>);
            }
        }

        Logger {
            min_level: self.min_level,
            transports: self.transports,
            origin: self.origin,
        }
    }
}

pub struct ConsoleBuilder {
    parent: LoggerBuilder,
    output: ConsoleTransport,
}

impl ConsoleBuilder {
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.output = self.output.level(level);
        self
    }

    #[must_use]
    pub fn format(mut self, template: &str) -> Self {
        self.output = self.output.format(template);
        self
    }

    /// Overrides TTY detection.
    #[must_use]
    pub fn use_styles(mut self, enabled: bool) -> Self {
        self.output = self.output.use_styles(enabled);
        self
    }

    #[must_use]
    pub fn depth(mut self, depth: Option<usize>) -> Self {
        self.output = self.output.depth(depth);
        self
    }

    #[must_use]
    pub fn done(self) -> LoggerBuilder {
        self.parent.with_console(self.output)
    }
}

pub struct FileBuilder {
    parent: LoggerBuilder,
    output: FileTransport,
    /// An explicit fallback was set; `build()` leaves it alone.
    routed: bool,
}

impl FileBuilder {
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.output = self.output.level(level);
        self
    }

    #[must_use]
    pub fn format(mut self, template: &str) -> Self {
        self.output = self.output.format(template);
        self
    }

    #[must_use]
    pub fn depth(mut self, depth: Option<usize>) -> Self {
        self.output = self.output.depth(depth);
        self
    }

    #[must_use]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.output = self.output.pipeline(pipeline);
        self
    }

    /// `0` disables rotation.
    #[must_use]
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.output = self.output.max_size(bytes);
        self
    }

    #[must_use]
    pub fn sync(mut self, sync: bool) -> Self {
        self.output = self.output.sync(sync);
        self
    }

    #[must_use]
    pub fn write_options(mut self, options: WriteOptions) -> Self {
        self.output = self.output.write_options(options);
        self
    }

    #[must_use]
    pub fn app_name(mut self, name: &str) -> Self {
        self.output = self.output.app_name(name);
        self
    }

    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.output = self.output.file_name(name);
        self
    }

    #[must_use]
    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output = self.output.dir(dir);
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.output = self.output.path(path);
        self
    }

    #[must_use]
    pub fn resolve_with(mut self, resolver: impl ResolvePath + 'static) -> Self {
        self.output = self.output.resolve_with(resolver);
        self
    }

    #[must_use]
    pub fn rotation(mut self, rotation: impl Rotation + 'static) -> Self {
        self.output = self.output.rotation(rotation);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<FileRegistry>) -> Self {
        self.output = self.output.registry(registry);
        self
    }

    #[must_use]
    pub fn fallback(mut self, sink: Arc<dyn Transport>) -> Self {
        self.output = self.output.fallback(sink);
        self.routed = true;
        self
    }

    #[must_use]
    pub fn done(self) -> LoggerBuilder {
        self.parent.push_file(self.output, self.routed)
    }
}
