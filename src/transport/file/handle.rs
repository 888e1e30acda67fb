//! One on-disk log file.
//!
//! The handle tracks the file's size in memory (stat once, then count bytes
//! written) so the rotation check on every record costs no syscall. Another
//! process appending to the same path makes the count drift; the next
//! `reset()` re-stats.

use super::events::ErrorEvents;
use crate::Error;

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// First line of a cropped file.
pub const CROP_MARKER: &str = "[log cropped]";

const ASYNC_BUFFER_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFlag {
    /// Keep existing content and append.
    #[default]
    Append,
    /// Truncate on the first write of this process, then append.
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub flag: WriteFlag,
    /// Permission bits for newly created files (Unix only; umask still applies).
    pub mode: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            flag: WriteFlag::Append,
            mode: 0o666,
        }
    }
}

impl WriteOptions {
    fn open_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.mode);
        }
        #[cfg(not(unix))]
        let _ = self.mode;
        options
    }

    fn open_append(self, path: &Path) -> io::Result<File> {
        self.open_options().append(true).open(path)
    }

    fn open_truncate(self, path: &Path) -> io::Result<File> {
        self.open_options().write(true).truncate(true).open(path)
    }

    /// Creates missing parent directories and checks the file can be opened for append.
    pub(crate) fn probe(self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        self.open_append(path).map(drop)
    }
}

enum Writer {
    Direct(File),
    Buffered(BufWriter<File>),
}

impl Writer {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self {
            Self::Direct(file) => file.write_all(bytes),
            Self::Buffered(buf) => buf.write_all(bytes),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Direct(file) => file.flush(),
            Self::Buffered(buf) => buf.flush(),
        }
    }
}

struct FileState {
    writer: Option<Writer>,
    /// On-disk size when first observed; `None` until stat'd.
    initial_size: Option<u64>,
    bytes_written: u64,
    truncate_pending: bool,
}

/// Shared by every writer of one path; hand it around as `Arc<FileHandle>`.
pub struct FileHandle {
    path: PathBuf,
    options: WriteOptions,
    allow_async: bool,
    /// Set when the file could not be created; writes are dropped.
    null: bool,
    events: Arc<ErrorEvents>,
    state: Mutex<FileState>,
}

impl FileHandle {
    pub(crate) fn new(
        path: PathBuf,
        options: WriteOptions,
        allow_async: bool,
        events: Arc<ErrorEvents>,
    ) -> Self {
        Self {
            path,
            options,
            allow_async,
            null: false,
            events,
            state: Mutex::new(FileState {
                writer: None,
                initial_size: None,
                bytes_written: 0,
                truncate_pending: options.flag == WriteFlag::Truncate,
            }),
        }
    }

    pub(crate) fn null(path: PathBuf, events: Arc<ErrorEvents>) -> Self {
        let mut handle = Self::new(path, WriteOptions::default(), false, events);
        handle.null = true;
        handle
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn options(&self) -> WriteOptions {
        self.options
    }

    /// Whether writes are buffered instead of reaching the OS before returning.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        self.allow_async
    }

    /// Whether this is a placeholder for a file that could not be created.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.null
    }

    /// Runs `f` with exclusive access, so check-then-act sequences (size check,
    /// rotate, write) cannot interleave with other writers of this path.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut FileGuard<'_>) -> R) -> R {
        let mut guard = FileGuard {
            handle: self,
            state: self.state.lock().unwrap_or_else(PoisonError::into_inner),
        };
        f(&mut guard)
    }

    /// Broadcasts `error` to the registry's error listeners.
    pub fn report(&self, error: &Error) {
        self.events.emit(&self.path, error);
    }

    fn run(&self, op: impl FnOnce(&mut FileGuard<'_>) -> Result<(), Error>) -> bool {
        match self.with_lock(op) {
            Ok(()) => true,
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Appends `text` and a line ending. Failures go to the error listeners.
    pub fn write_line(&self, text: &str) -> bool {
        self.run(|file| file.write_line(text))
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.with_lock(|file| file.size())
    }

    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.with_lock(|file| file.bytes_written())
    }

    /// Keeps only the trailing `bytes_after` bytes.
    pub fn crop(&self, bytes_after: u64) -> bool {
        self.run(|file| file.crop(bytes_after))
    }

    pub fn clear(&self) -> bool {
        self.run(|file| file.clear())
    }

    pub fn reset(&self) -> bool {
        self.run(|file| file.reset())
    }

    pub fn flush(&self) -> bool {
        self.run(|file| file.flush())
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("async", &self.allow_async)
            .field("null", &self.null)
            .finish_non_exhaustive()
    }
}

/// Exclusive access to a [`FileHandle`], obtained through [`FileHandle::with_lock`].
pub struct FileGuard<'a> {
    handle: &'a FileHandle,
    state: MutexGuard<'a, FileState>,
}

impl<'a> FileGuard<'a> {
    #[must_use]
    pub fn path(&self) -> &'a Path {
        &self.handle.path
    }

    /// Size on disk when first observed plus everything written since.
    pub fn size(&mut self) -> u64 {
        if self.handle.null {
            return 0;
        }
        let path = self.path();
        let initial = *self
            .state
            .initial_size
            .get_or_insert_with(|| fs::metadata(path).map_or(0, |m| m.len()));
        initial + self.state.bytes_written
    }

    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.state.bytes_written
    }

    /// # Errors
    /// [`Error::Write`] when the file cannot be opened or appended to. The open
    /// writer is dropped, so the next call reopens the file.
    pub fn write_line(&mut self, text: &str) -> Result<(), Error> {
        if self.handle.null {
            return Ok(());
        }

        // Pin the on-disk size before our own bytes land there
        self.size();

        let mut line = String::with_capacity(text.len() + LINE_ENDING.len());
        line.push_str(text);
        line.push_str(LINE_ENDING);

        let result = self
            .writer()
            .and_then(|writer| writer.write_all(line.as_bytes()));

        match result {
            Ok(()) => {
                self.state.bytes_written += line.len() as u64;
                Ok(())
            }
            Err(source) => {
                self.state.writer = None;
                Err(Error::Write {
                    path: self.path().to_path_buf(),
                    source,
                })
            }
        }
    }

    fn writer(&mut self) -> io::Result<&mut Writer> {
        let path = self.path();
        let options = self.handle.options;
        let allow_async = self.handle.allow_async;
        let state = &mut *self.state;

        let writer = match state.writer.take() {
            Some(writer) => writer,
            None => {
                let file = if state.truncate_pending {
                    let file = options.open_truncate(path)?;
                    state.truncate_pending = false;
                    state.initial_size = Some(0);
                    state.bytes_written = 0;
                    file
                } else {
                    options.open_append(path)?
                };
                if allow_async {
                    Writer::Buffered(BufWriter::with_capacity(ASYNC_BUFFER_SIZE, file))
                } else {
                    Writer::Direct(file)
                }
            }
        };

        Ok(state.writer.insert(writer))
    }

    /// # Errors
    /// [`Error::Write`] when buffered bytes cannot be written out.
    pub fn flush(&mut self) -> Result<(), Error> {
        let Some(writer) = self.state.writer.as_mut() else {
            return Ok(());
        };
        writer.flush().map_err(|source| Error::Write {
            path: self.handle.path.clone(),
            source,
        })
    }

    /// Flushes and closes the open file; the next write reopens it by path.
    ///
    /// # Errors
    /// The flush error, if any. The file is closed either way.
    pub fn close(&mut self) -> Result<(), Error> {
        let flushed = self.flush();
        self.state.writer = None;
        flushed
    }

    /// Closes the file and forgets the tracked size; the next `size()` re-stats.
    ///
    /// # Errors
    /// The flush error from closing, if any.
    pub fn reset(&mut self) -> Result<(), Error> {
        let closed = self.close();
        self.state.initial_size = None;
        self.state.bytes_written = 0;
        closed
    }

    /// Empties the file. A file that does not exist counts as cleared.
    ///
    /// # Errors
    /// [`Error::Write`] when the file exists but cannot be truncated.
    pub fn clear(&mut self) -> Result<(), Error> {
        if self.handle.null {
            return Ok(());
        }

        self.state.writer = None;
        match self.handle.options.open_truncate(self.path()) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(Error::Write {
                    path: self.path().to_path_buf(),
                    source,
                });
            }
        }

        self.state.truncate_pending = false;
        self.state.initial_size = Some(0);
        self.state.bytes_written = 0;
        Ok(())
    }

    /// Rewrites the file as a [`CROP_MARKER`] line followed by its trailing bytes,
    /// `bytes_after` bytes in total at most.
    ///
    /// # Errors
    /// [`Error::Crop`] when the file cannot be read or rewritten.
    pub fn crop(&mut self, bytes_after: u64) -> Result<(), Error> {
        if self.handle.null {
            return Ok(());
        }

        let path = self.path();
        let crop_error = |source| Error::Crop {
            path: path.to_path_buf(),
            source,
        };

        // Buffered lines must be on disk before the tail is read
        if let Err(e) = self.close() {
            crate::internal::warn("FILE", &format!("Flush before crop failed: {e}"));
        }

        let marker_len = (CROP_MARKER.len() + LINE_ENDING.len()) as u64;
        let content = if bytes_after > marker_len {
            let tail = read_tail(path, bytes_after - marker_len).map_err(crop_error)?;
            let mut content = Vec::with_capacity(marker_len as usize + tail.len());
            content.extend_from_slice(CROP_MARKER.as_bytes());
            content.extend_from_slice(LINE_ENDING.as_bytes());
            content.extend_from_slice(&tail);
            content
        } else {
            Vec::new()
        };

        let mut file = self
            .handle
            .options
            .open_truncate(path)
            .map_err(crop_error)?;
        file.write_all(&content).map_err(crop_error)?;

        self.state.truncate_pending = false;
        self.state.initial_size = Some(content.len() as u64);
        self.state.bytes_written = 0;
        Ok(())
    }
}

/// Reads at most the last `len` bytes, skipping a split UTF-8 sequence at the start.
fn read_tail(path: &Path, len: u64) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    file.seek(SeekFrom::Start(size.saturating_sub(len)))?;

    let mut tail = Vec::with_capacity(usize::try_from(len.min(size)).unwrap_or(0));
    file.take(len).read_to_end(&mut tail)?;

    let split = tail.iter().take_while(|&&b| b & 0xC0 == 0x80).count();
    tail.drain(..split);
    Ok(tail)
}
