//! Tests for a single file handle: size tracking, crop, clear, reset, async buffering.

use scribe::transport::file::{CROP_MARKER, FileRegistry, LINE_ENDING, WriteFlag, WriteOptions};
use scribe::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn line_len(text: &str) -> u64 {
    (text.len() + LINE_ENDING.len()) as u64
}

fn collect_errors(registry: &FileRegistry) -> (Arc<Mutex<Vec<(PathBuf, String)>>>, scribe::transport::file::Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = registry.on_error(move |path, error| {
        sink.lock().unwrap().push((path.to_path_buf(), error.to_string()));
    });
    (seen, subscription)
}

#[test]
fn write_line_appends_line_ending_and_counts_bytes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    assert!(file.write_line("hello"));
    assert!(file.write_line("wörld"));

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, format!("hello{LINE_ENDING}wörld{LINE_ENDING}"));
    assert_eq!(file.bytes_written(), line_len("hello") + line_len("wörld"));
    assert_eq!(file.size(), content.len() as u64);
}

#[test]
fn size_counts_existing_content_once() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    fs::write(&path, "x".repeat(10)).unwrap();

    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);
    assert!(file.write_line("ab"));

    assert_eq!(file.size(), 10 + line_len("ab"));
    assert_eq!(file.bytes_written(), line_len("ab"));
}

#[test]
fn size_is_stated_lazily() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    // Someone else wrote before our first size check
    fs::write(&path, "12345").unwrap();
    assert_eq!(file.size(), 5);
}

#[test]
fn reset_forgets_tracked_size() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    assert!(file.write_line("before"));
    fs::rename(&path, tmp.path().join("moved.log")).unwrap();
    assert!(file.size() > 0);

    assert!(file.reset());
    assert_eq!(file.size(), 0);
    assert_eq!(file.bytes_written(), 0);

    assert!(file.write_line("after"));
    assert_eq!(fs::read_to_string(&path).unwrap(), format!("after{LINE_ENDING}"));
}

#[test]
fn clear_empties_the_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    assert!(file.write_line("one"));
    assert!(file.write_line("two"));
    assert!(file.clear());

    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert_eq!(file.size(), 0);

    assert!(file.write_line("three"));
    assert_eq!(file.size(), line_len("three"));
}

#[test]
fn clear_on_missing_file_succeeds() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    fs::remove_file(&path).unwrap();
    assert!(file.clear());
    assert_eq!(file.size(), 0);
}

#[test]
fn crop_keeps_tail_behind_marker() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    for i in 0..100 {
        assert!(file.write_line(&format!("line {i:02}")));
    }
    assert!(file.crop(50));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.len() <= 50, "{} bytes", content.len());
    assert!(content.starts_with(&format!("{CROP_MARKER}{LINE_ENDING}")));
    assert!(content.ends_with(&format!("line 99{LINE_ENDING}")));
    assert_eq!(file.size(), content.len() as u64);
}

#[test]
fn crop_skips_split_utf8_sequence() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    fs::write(&path, "é".repeat(20)).unwrap();
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    // Five tail bytes start in the middle of a two-byte character
    let budget = (CROP_MARKER.len() + LINE_ENDING.len() + 5) as u64;
    assert!(file.crop(budget));

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, format!("{CROP_MARKER}{LINE_ENDING}éé"));
}

#[test]
fn crop_below_marker_size_empties_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    fs::write(&path, "some content\n").unwrap();
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    assert!(file.crop(3));
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert_eq!(file.size(), 0);
}

#[test]
fn truncate_flag_discards_old_content_on_first_write() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    fs::write(&path, "old content\n").unwrap();

    let options = WriteOptions {
        flag: WriteFlag::Truncate,
        ..WriteOptions::default()
    };
    let file = FileRegistry::new().provide(&path, options, false);

    assert!(file.write_line("new"));
    assert!(file.write_line("newer"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        format!("new{LINE_ENDING}newer{LINE_ENDING}")
    );
    assert_eq!(file.size(), line_len("new") + line_len("newer"));
}

#[cfg(unix)]
#[test]
fn new_files_get_configured_mode() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("private.log");
    let options = WriteOptions {
        mode: 0o600,
        ..WriteOptions::default()
    };
    let file = FileRegistry::new().provide(&path, options, false);
    assert!(file.write_line("secret"));

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn async_writes_reach_disk_on_flush() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), true);
    assert!(file.is_async());

    assert!(file.write_line("buffered"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    assert_eq!(file.size(), line_len("buffered"));

    assert!(file.flush());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        format!("buffered{LINE_ENDING}")
    );
}

#[test]
fn guard_runs_operations_atomically() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("a.log");
    let file = FileRegistry::new().provide(&path, WriteOptions::default(), false);

    let size = file.with_lock(|f| -> Result<u64, Error> {
        f.write_line("a")?;
        f.write_line("b")?;
        Ok(f.size())
    });
    assert_eq!(size.unwrap(), line_len("a") + line_len("b"));
}

#[test]
fn write_failure_is_reported_not_raised() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("sub");
    let path = dir.join("a.log");
    let registry = FileRegistry::new();
    let (errors, _subscription) = collect_errors(&registry);

    let file = registry.provide(&path, WriteOptions::default(), false);
    assert!(!file.is_null());
    fs::remove_dir_all(&dir).unwrap();

    assert!(!file.write_line("lost"));
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, file.path());
    assert!(errors[0].1.starts_with("can't write to"), "{}", errors[0].1);
}

#[test]
fn guard_write_returns_typed_error() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("sub");
    let file = FileRegistry::new().provide(dir.join("a.log"), WriteOptions::default(), false);
    fs::remove_dir_all(&dir).unwrap();

    let result = file.with_lock(|f| f.write_line("lost"));
    assert!(matches!(result, Err(Error::Write { .. })));
    assert_eq!(file.bytes_written(), 0);
}
