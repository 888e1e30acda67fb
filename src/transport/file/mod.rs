//! Appends rendered records to a log file, rotating it when it outgrows `max_size`.
//!
//! Files are shared through a [`FileRegistry`], so two transports writing the
//! same path serialize on one handle and agree on its size.

mod events;
mod handle;
mod path;
mod registry;
mod rotation;

pub use events::{ErrorEvents, Subscription};
pub use handle::{CROP_MARKER, FileGuard, FileHandle, LINE_ENDING, WriteFlag, WriteOptions};
pub use path::{DefaultPath, FixedPath, PathVariables, ResolvePath, default_app_name};
pub use registry::FileRegistry;
pub use rotation::{Archived, MAX_CROP_BYTES, OldFileRotation, Rotation, crop_target, old_path};

use super::{ConsoleTransport, Transport};
use crate::level::Level;
use crate::record::{LogRecord, ProcessKind, Value};
use crate::render::{DEFAULT_DEPTH, FormatTemplate, Pipeline};
use crate::{Error, internal};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock};

/// Rotate once the file passes 1 MiB.
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024;

const REPORT_PREFIX: &str = "scribe.transports.file: ";

/// Forwards the transport's own failures to another transport as `warn` records.
struct Reporter {
    sink: RwLock<Arc<dyn Transport>>,
}

impl Reporter {
    fn new(sink: Arc<dyn Transport>) -> Self {
        Self {
            sink: RwLock::new(sink),
        }
    }

    fn set(&self, sink: Arc<dyn Transport>) {
        *self.sink.write().unwrap_or_else(PoisonError::into_inner) = sink;
    }

    fn warn(&self, message: &str, error: &Error) {
        let record = LogRecord::new(
            Level::Warn,
            vec![
                Value::String(format!("{REPORT_PREFIX}{message}")),
                Value::from(error),
            ],
        );
        let sink = Arc::clone(&*self.sink.read().unwrap_or_else(PoisonError::into_inner));
        sink.handle(&record);
    }
}

pub struct FileTransport {
    level: Level,
    format: FormatTemplate,
    depth: Option<usize>,
    pipeline: Pipeline,
    max_size: u64,
    sync: bool,
    write_options: WriteOptions,
    vars: PathVariables,
    resolver: Arc<dyn ResolvePath>,
    rotation: Arc<dyn Rotation>,
    registry: Arc<FileRegistry>,
    reporter: Arc<Reporter>,
    _subscription: Subscription,
}

impl Default for FileTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTransport {
    /// Writes to `main.log` in the platform log directory, through the global registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(FileRegistry::global())
    }

    #[must_use]
    pub fn with_registry(registry: Arc<FileRegistry>) -> Self {
        let reporter = Arc::new(Reporter::new(Arc::new(ConsoleTransport::new())));
        let subscription = subscribe(&registry, &reporter);
        let format = FormatTemplate::default();
        let process = ProcessKind::default();

        Self {
            level: Level::Silly,
            pipeline: Pipeline::file(&format, Some(DEFAULT_DEPTH)),
            format,
            depth: Some(DEFAULT_DEPTH),
            max_size: DEFAULT_MAX_SIZE,
            sync: true,
            write_options: WriteOptions::default(),
            vars: PathVariables::detect(&default_app_name(), process.default_file_name()),
            resolver: Arc::new(DefaultPath),
            rotation: Arc::new(OldFileRotation),
            registry,
            reporter,
            _subscription: subscription,
        }
    }

    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn format(mut self, template: &str) -> Self {
        self.format = FormatTemplate::parse(template);
        self.pipeline = Pipeline::file(&self.format, self.depth);
        self
    }

    /// `None` serializes arbitrarily deep values.
    #[must_use]
    pub fn depth(mut self, depth: Option<usize>) -> Self {
        self.depth = depth;
        self.pipeline = Pipeline::file(&self.format, self.depth);
        self
    }

    /// Replaces the render chain entirely; `format` and `depth` no longer apply.
    #[must_use]
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// `0` disables rotation.
    #[must_use]
    pub const fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// `false` buffers writes. Only takes effect for the first transport to open a path.
    #[must_use]
    pub const fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    #[must_use]
    pub const fn write_options(mut self, options: WriteOptions) -> Self {
        self.write_options = options;
        self
    }

    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.vars.file_name = name.into();
        self
    }

    /// Uses the process kind's default file name.
    #[must_use]
    pub fn process(self, process: ProcessKind) -> Self {
        self.file_name(process.default_file_name())
    }

    /// Re-detects the platform directories for `app_name`.
    #[must_use]
    pub fn app_name(mut self, app_name: &str) -> Self {
        self.vars = PathVariables::detect(app_name, &self.vars.file_name);
        self
    }

    /// Directory used by the default resolver.
    #[must_use]
    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.vars.library_default_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Always writes to `path`, ignoring the directory and file name.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.resolver = Arc::new(FixedPath::new(path));
        self
    }

    #[must_use]
    pub fn resolve_with(mut self, resolver: impl ResolvePath + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    #[must_use]
    pub fn vars(mut self, vars: PathVariables) -> Self {
        self.vars = vars;
        self
    }

    #[must_use]
    pub fn rotation(mut self, rotation: impl Rotation + 'static) -> Self {
        self.rotation = Arc::new(rotation);
        self
    }

    /// Moves to another registry; error reporting follows.
    #[must_use]
    pub fn registry(mut self, registry: Arc<FileRegistry>) -> Self {
        self._subscription = subscribe(&registry, &self.reporter);
        self.registry = registry;
        self
    }

    /// Where failure warnings go.
    #[must_use]
    pub fn fallback(self, sink: Arc<dyn Transport>) -> Self {
        self.set_fallback(sink);
        self
    }

    /// Same as [`fallback`](Self::fallback), for a transport that is already shared.
    pub fn set_fallback(&self, sink: Arc<dyn Transport>) {
        self.reporter.set(sink);
    }

    #[must_use]
    pub fn resolve_path(&self, record: Option<&LogRecord>) -> PathBuf {
        self.resolver.resolve(&self.vars, record)
    }

    /// The handle `record` would be written to; `None` gives the default file.
    #[must_use]
    pub fn file_for(&self, record: Option<&LogRecord>) -> Arc<FileHandle> {
        self.registry
            .provide(self.resolve_path(record), self.write_options, !self.sync)
    }

    /// Archives the default file now, whatever its size. Failures are also
    /// reported to the fallback, as for a rotation triggered by a write.
    pub fn rotate_now(&self) -> Archived {
        let file = self.file_for(None);
        let (outcome, failure) = file.with_lock(|f| {
            let outcome = self.rotation.archive(f, self.max_size);
            (outcome, f.reset().err())
        });
        self.report_archive(&file, &outcome);
        if let Some(e) = failure {
            file.report(&e);
        }
        outcome
    }

    fn write_locked(&self, file: &mut FileGuard<'_>, record: &LogRecord) -> (Option<Archived>, Vec<Error>) {
        let mut failures = Vec::new();

        let archived = if self.max_size > 0 && file.size() > self.max_size {
            let outcome = self.rotation.archive(file, self.max_size);
            if let Err(e) = file.reset() {
                failures.push(e);
            }
            Some(outcome)
        } else {
            None
        };

        let line = self.pipeline.render_line(record);
        if let Err(e) = file.write_line(&line) {
            failures.push(e);
        }

        (archived, failures)
    }

    fn report_archive(&self, file: &FileHandle, outcome: &Archived) {
        match outcome {
            Archived::Renamed { .. } => {}
            Archived::Cropped { reason, kept } => {
                self.reporter.warn("Could not rotate log", reason);
                internal::info(
                    "ROTATE",
                    &format!("Cropped {} to its last {kept} bytes", file.path().display()),
                );
            }
            Archived::Unbounded { reason, crop } => {
                self.reporter.warn("Could not rotate log", reason);
                file.report(crop);
            }
        }
    }

    /// Bytes written to the default file since it was last opened or rotated.
    #[deprecated(note = "use `file_for(None).bytes_written()`")]
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        warn_deprecated("bytes_written", "file_for(None).bytes_written()");
        self.file_for(None).bytes_written()
    }

    #[deprecated(note = "use `resolve_path(None)`")]
    #[must_use]
    pub fn file(&self) -> PathBuf {
        warn_deprecated("file", "resolve_path(None)");
        self.resolve_path(None)
    }

    #[deprecated(note = "use the `path` builder")]
    pub fn set_file(&mut self, path: impl AsRef<Path>) {
        warn_deprecated("set_file", "path()");
        self.resolver = Arc::new(FixedPath::new(path));
    }

    #[deprecated(note = "use `file_for(None).size()`")]
    #[must_use]
    pub fn file_size(&self) -> u64 {
        warn_deprecated("file_size", "file_for(None).size()");
        self.file_for(None).size()
    }

    #[deprecated(note = "use `file_for(None).clear()`")]
    pub fn clear(&self) -> bool {
        warn_deprecated("clear", "file_for(None).clear()");
        self.file_for(None).clear()
    }

    #[deprecated(note = "use `resolve_path(None)`")]
    #[must_use]
    pub fn find_log_path(&self) -> PathBuf {
        warn_deprecated("find_log_path", "resolve_path(None)");
        self.resolve_path(None)
    }

    /// Files are opened lazily on first write; this only warms up the handle.
    #[deprecated(note = "no longer needed")]
    pub fn init(&self) {
        warn_deprecated("init", "nothing");
        let _ = self.file_for(None);
    }
}

impl Transport for FileTransport {
    fn handle(&self, record: &LogRecord) {
        let file = self.file_for(Some(record));
        let (archived, failures) = file.with_lock(|f| self.write_locked(f, record));

        if let Some(outcome) = archived {
            self.report_archive(&file, &outcome);
        }
        for e in &failures {
            file.report(e);
        }
    }

    fn min_level(&self) -> Level {
        self.level
    }

    fn flush(&self) -> Result<(), Error> {
        self.registry.flush_all()
    }
}

impl std::fmt::Debug for FileTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTransport")
            .field("level", &self.level)
            .field("format", &self.format.as_str())
            .field("depth", &self.depth)
            .field("max_size", &self.max_size)
            .field("sync", &self.sync)
            .field("path", &self.resolve_path(None))
            .finish_non_exhaustive()
    }
}

fn subscribe(registry: &FileRegistry, reporter: &Arc<Reporter>) -> Subscription {
    let reporter = Arc::clone(reporter);
    registry.on_error(move |path, error| {
        reporter.warn(&format!("Can't write to {}", path.display()), error);
    })
}

fn warn_deprecated(name: &'static str, replacement: &str) {
    static WARNED: LazyLock<Mutex<HashSet<&'static str>>> =
        LazyLock::new(|| Mutex::new(HashSet::new()));

    let first = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name);
    if first {
        internal::warn(
            "DEPRECATED",
            &format!("FileTransport::{name} is deprecated, use {replacement}"),
        );
    }
}
