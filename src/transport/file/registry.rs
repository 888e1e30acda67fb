//! Path → handle map. Every writer of one path shares one [`FileHandle`], so
//! size tracking and rotation see all of them.

use super::events::{ErrorEvents, Subscription};
use super::handle::{FileHandle, WriteOptions};
use crate::{Error, internal};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static GLOBAL: OnceLock<Arc<FileRegistry>> = OnceLock::new();

#[derive(Debug, Default)]
struct Store {
    /// Keyed by the resolved path.
    files: HashMap<PathBuf, Arc<FileHandle>>,
    /// Absolute path as requested → resolved key, so repeat lookups skip the filesystem.
    aliases: HashMap<PathBuf, PathBuf>,
}

#[derive(Debug)]
pub struct FileRegistry {
    store: Mutex<Store>,
    events: Arc<ErrorEvents>,
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FileRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
            events: Arc::new(ErrorEvents::new()),
        }
    }

    /// Process-wide registry used by transports that were not given their own.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the handle for `path`, creating it on first request.
    ///
    /// First use creates missing parent directories and probe-opens the file.
    /// If that fails the error goes to the [`on_error`](Self::on_error)
    /// listeners and a null handle is cached, which drops every write.
    /// Options and `allow_async` of the first request win.
    pub fn provide(
        &self,
        path: impl AsRef<Path>,
        options: WriteOptions,
        allow_async: bool,
    ) -> Arc<FileHandle> {
        let requested = absolute(path.as_ref());
        let mut failure = None;

        let handle = {
            let mut store = self.lock();
            if let Some(key) = store.aliases.get(&requested)
                && let Some(handle) = store.files.get(key)
            {
                return Arc::clone(handle);
            }

            let probed = options.probe(&requested);
            let key = canonical(&requested);
            store.aliases.insert(requested, key.clone());

            if let Some(handle) = store.files.get(&key) {
                return Arc::clone(handle);
            }

            let handle = match probed {
                Ok(()) => {
                    internal::debug("REGISTRY", &format!("Opened {}", key.display()));
                    FileHandle::new(key.clone(), options, allow_async, Arc::clone(&self.events))
                }
                Err(source) => {
                    failure = Some(Error::Open {
                        path: key.clone(),
                        source,
                    });
                    FileHandle::null(key.clone(), Arc::clone(&self.events))
                }
            };

            let handle = Arc::new(handle);
            store.files.insert(key, Arc::clone(&handle));
            handle
        };

        // Listeners may log, which may call back into provide()
        if let Some(error) = failure {
            self.events.emit(handle.path(), &error);
        }

        handle
    }

    /// Subscribes to errors from every handle in this registry.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_error(&self, listener: impl Fn(&Path, &Error) + Send + Sync + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    /// The handle for `path` if one was provided before.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<FileHandle>> {
        let requested = absolute(path.as_ref());
        let store = self.lock();
        let key = store
            .aliases
            .get(&requested)
            .cloned()
            .unwrap_or_else(|| canonical(&requested));
        store.files.get(&key).map(Arc::clone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().files.is_empty()
    }

    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.lock().files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Flushes every buffered handle.
    ///
    /// # Errors
    /// The first flush error; the remaining handles are still flushed.
    pub fn flush_all(&self) -> Result<(), Error> {
        let handles: Vec<Arc<FileHandle>> = self.lock().files.values().map(Arc::clone).collect();
        let mut first = None;
        for handle in handles {
            if let Err(e) = handle.with_lock(|file| file.flush()) {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

/// `~` expanded, made absolute against the working directory.
fn absolute(path: &Path) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) if s.starts_with('~') => PathBuf::from(shellexpand::tilde(s).into_owned()),
        _ => path.to_path_buf(),
    };
    std::path::absolute(&expanded).unwrap_or(expanded)
}

/// Resolves symlinks and `..` in the parent; the file itself may not exist yet.
fn canonical(path: &Path) -> PathBuf {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    parent
        .canonicalize()
        .map_or_else(|_| path.to_path_buf(), |dir| dir.join(name))
}
