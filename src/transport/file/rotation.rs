//! What happens to a log file that grew past its size limit.

use super::handle::FileGuard;
use crate::{Error, internal};

use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound for what a crop keeps.
pub const MAX_CROP_BYTES: u64 = 256 * 1024;

/// Outcome of one archive attempt.
#[derive(Debug)]
pub enum Archived {
    /// The file moved to `to`; the next write starts a fresh file.
    Renamed { to: PathBuf },
    /// Rename failed, so the file was cut down to its last `kept` bytes.
    Cropped { reason: Error, kept: u64 },
    /// Both rename and crop failed. The file keeps growing.
    Unbounded { reason: Error, crop: Error },
}

/// Runs with the file's lock held, after the writer noticed the size limit was
/// exceeded. The transport calls `reset()` on the file afterwards.
///
/// Closures `Fn(&mut FileGuard<'_>, u64) -> Archived` implement this.
pub trait Rotation: Send + Sync {
    fn archive(&self, file: &mut FileGuard<'_>, max_size: u64) -> Archived;
}

impl<F> Rotation for F
where
    F: Fn(&mut FileGuard<'_>, u64) -> Archived + Send + Sync,
{
    fn archive(&self, file: &mut FileGuard<'_>, max_size: u64) -> Archived {
        self(file, max_size)
    }
}

/// Keeps one previous generation: `main.log` → `main.old.log`, replacing any
/// earlier archive. Falls back to cropping when the rename fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OldFileRotation;

impl Rotation for OldFileRotation {
    fn archive(&self, file: &mut FileGuard<'_>, max_size: u64) -> Archived {
        let from = file.path().to_path_buf();
        let to = old_path(&from);

        if let Err(e) = file.close() {
            internal::warn("ROTATE", &format!("Flush before rotation failed: {e}"));
        }

        match fs::rename(&from, &to) {
            Ok(()) => {
                internal::debug(
                    "ROTATE",
                    &format!("Archived {} to {}", from.display(), to.display()),
                );
                Archived::Renamed { to }
            }
            Err(source) => {
                let reason = Error::Rotate { from, to, source };
                let kept = crop_target(max_size);
                match file.crop(kept) {
                    Ok(()) => Archived::Cropped { reason, kept },
                    Err(crop) => Archived::Unbounded { reason, crop },
                }
            }
        }
    }
}

/// `dir/name.ext` → `dir/name.old.ext`; `dir/name` → `dir/name.old`.
#[must_use]
pub fn old_path(path: &Path) -> PathBuf {
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push(".old");
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// A quarter of the limit, rounded, capped at [`MAX_CROP_BYTES`].
#[must_use]
pub const fn crop_target(max_size: u64) -> u64 {
    let quarter = max_size / 4 + if max_size % 4 >= 2 { 1 } else { 0 };
    if quarter < MAX_CROP_BYTES {
        quarter
    } else {
        MAX_CROP_BYTES
    }
}
