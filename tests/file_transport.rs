//! Tests for the file transport: rotation, failure reporting, path resolution.

use scribe::transport::file::{
    Archived, FileGuard, FileRegistry, LINE_ENDING, ResolvePath, Rotation, PathVariables, old_path,
};
use scribe::{Error, FileTransport, Level, LogRecord, ProcessKind, Transport, args};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

#[derive(Default)]
struct Memory {
    records: Mutex<Vec<LogRecord>>,
}

impl Memory {
    fn texts(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(LogRecord::raw_text)
            .collect()
    }
}

impl Transport for Memory {
    fn handle(&self, record: &LogRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

fn transport(path: &Path) -> FileTransport {
    FileTransport::with_registry(Arc::new(FileRegistry::new()))
        .path(path)
        .format("{text}")
}

fn info(text: &str) -> LogRecord {
    LogRecord::new(Level::Info, args![text])
}

fn line(text: &str) -> String {
    format!("{text}{LINE_ENDING}")
}

#[test]
fn oversized_file_rotates_before_next_write() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    fs::write(&path, "x".repeat(150)).unwrap();

    let file = transport(&path).max_size(100);
    file.handle(&info("0123456789"));

    assert_eq!(fs::read_to_string(&path).unwrap(), line("0123456789"));
    assert_eq!(fs::metadata(old_path(&path)).unwrap().len(), 150);
    assert_eq!(file.file_for(None).size(), line("0123456789").len() as u64);
}

#[test]
fn file_under_limit_is_left_alone() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let file = transport(&path).max_size(100);

    for _ in 0..9 {
        file.handle(&info("0123456789"));
    }

    assert!(!old_path(&path).exists());
    assert_eq!(fs::read_to_string(&path).unwrap(), line("0123456789").repeat(9));
}

#[test]
fn file_at_exactly_max_size_is_not_rotated() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    fs::write(&path, "x".repeat(100)).unwrap();

    let file = transport(&path).max_size(100);
    file.handle(&info("tail"));

    assert!(!old_path(&path).exists());
    assert_eq!(file.file_for(None).size(), 100 + line("tail").len() as u64);
}

#[test]
fn growing_file_rotates_exactly_once() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let file = transport(&path).max_size(100);

    // Ten 10-byte lines reach the limit; the eleventh passes it
    for i in 0..12 {
        file.handle(&info(&format!("line {i:04}")));
    }

    let archived = fs::read_to_string(old_path(&path)).unwrap();
    let current = fs::read_to_string(&path).unwrap();
    assert_eq!(archived.lines().count(), 11);
    assert_eq!(current, line("line 0011"));
}

#[test]
fn zero_max_size_never_rotates() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    fs::write(&path, "x".repeat(500)).unwrap();

    let file = transport(&path).max_size(0);
    file.handle(&info("more"));

    assert!(!old_path(&path).exists());
    assert_eq!(file.file_for(None).size(), 500 + line("more").len() as u64);
}

#[test]
fn failed_rotation_crops_and_warns_fallback() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    fs::write(&path, "x".repeat(150)).unwrap();
    let blocked = old_path(&path);
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("keep"), "").unwrap();

    let fallback = Arc::new(Memory::default());
    let file = transport(&path)
        .max_size(100)
        .fallback(Arc::clone(&fallback) as Arc<dyn Transport>);
    file.handle(&info("after"));

    let texts = fallback.texts();
    assert_eq!(texts.len(), 1, "{texts:?}");
    assert!(
        texts[0].starts_with("scribe.transports.file: Could not rotate log can't rename"),
        "{}",
        texts[0]
    );
    assert_eq!(fallback.records.lock().unwrap()[0].level, Level::Warn);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.ends_with(&line("after")));
    assert!(content.len() <= 25 + line("after").len());
}

#[test]
fn rotate_now_ignores_size() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let file = transport(&path);

    file.handle(&info("small"));
    let outcome = file.rotate_now();
    assert!(matches!(outcome, Archived::Renamed { .. }), "{outcome:?}");

    assert_eq!(fs::read_to_string(old_path(&path)).unwrap(), line("small"));
    assert_eq!(file.file_for(None).size(), 0);

    file.handle(&info("next"));
    assert_eq!(fs::read_to_string(&path).unwrap(), line("next"));
}

#[test]
fn write_failure_warns_fallback() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("logs");
    let path = dir.join("main.log");

    let fallback = Arc::new(Memory::default());
    let file = transport(&path).fallback(Arc::clone(&fallback) as Arc<dyn Transport>);
    let handle = file.file_for(None);
    fs::remove_dir_all(&dir).unwrap();

    file.handle(&info("lost"));

    let texts = fallback.texts();
    assert_eq!(texts.len(), 1, "{texts:?}");
    let expected = format!("scribe.transports.file: Can't write to {}", handle.path().display());
    assert!(texts[0].starts_with(&expected), "{}", texts[0]);
}

#[test]
fn unopenable_file_drops_writes() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("plain-file");
    fs::write(&blocker, "").unwrap();

    let fallback = Arc::new(Memory::default());
    let file = transport(&blocker.join("main.log"))
        .fallback(Arc::clone(&fallback) as Arc<dyn Transport>);

    file.handle(&info("one"));
    file.handle(&info("two"));

    assert!(file.file_for(None).is_null());
    let texts = fallback.texts();
    assert_eq!(texts.len(), 1, "open failure is reported once: {texts:?}");
    assert!(texts[0].contains("can't open"), "{}", texts[0]);
}

struct PerScope(PathBuf);

impl ResolvePath for PerScope {
    fn resolve(&self, _: &PathVariables, record: Option<&LogRecord>) -> PathBuf {
        let scope = record
            .and_then(|r| r.origin.scope.as_deref())
            .unwrap_or("main");
        self.0.join(format!("{scope}.log"))
    }
}

#[test]
fn resolver_routes_records_per_scope() {
    let tmp = TempDir::new().unwrap();
    let file = transport(&tmp.path().join("unused.log")).resolve_with(PerScope(tmp.path().to_path_buf()));

    file.handle(&info("plain"));
    file.handle(&info("request").with_scope("net"));

    assert_eq!(fs::read_to_string(tmp.path().join("main.log")).unwrap(), line("plain"));
    assert_eq!(fs::read_to_string(tmp.path().join("net.log")).unwrap(), line("request"));
    assert!(!tmp.path().join("unused.log").exists());
}

#[test]
fn default_path_uses_dir_and_process_file_name() {
    let tmp = TempDir::new().unwrap();
    let file = FileTransport::with_registry(Arc::new(FileRegistry::new()))
        .dir(tmp.path())
        .process(ProcessKind::Renderer);

    assert_eq!(file.resolve_path(None), tmp.path().join("renderer.log"));

    let file = file.file_name("custom.log");
    assert_eq!(file.resolve_path(None), tmp.path().join("custom.log"));
}

#[test]
fn default_format_has_timestamp_prefix() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let file = FileTransport::with_registry(Arc::new(FileRegistry::new())).path(&path);

    file.handle(&LogRecord::new(Level::Warn, args!["disk", serde_json::json!({ "free": 3 })]));

    let content = fs::read_to_string(&path).unwrap();
    let re = regex::Regex::new(r"^\[\d{4}-\d\d-\d\d \d\d:\d\d:\d\d\.\d{3}\] \[warn\] disk \{.free.:3\}\r?\n$")
        .unwrap();
    assert!(re.is_match(&content), "{content}");
}

#[test]
fn buffered_writes_land_on_flush() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let file = transport(&path).sync(false);

    file.handle(&info("buffered"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "");

    file.flush().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), line("buffered"));
}

#[test]
fn transports_on_one_path_share_a_handle() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let registry = Arc::new(FileRegistry::new());
    let a = FileTransport::with_registry(Arc::clone(&registry)).path(&path).format("{text}");
    let b = FileTransport::with_registry(Arc::clone(&registry)).path(&path).format("{text}");

    assert!(Arc::ptr_eq(&a.file_for(None), &b.file_for(None)));

    a.handle(&info("from a"));
    b.handle(&info("from b"));
    assert_eq!(
        a.file_for(None).size(),
        (line("from a").len() + line("from b").len()) as u64
    );
}

#[test]
fn concurrent_logging_keeps_size_exact() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let file = Arc::new(transport(&path).max_size(0));

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let file = Arc::clone(&file);
            thread::spawn(move || {
                for i in 0..25 {
                    file.handle(&info(&format!("worker {t} record {i}")));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 200);
    assert_eq!(file.file_for(None).size(), content.len() as u64);
}

struct Stuck;

impl Rotation for Stuck {
    fn archive(&self, file: &mut FileGuard<'_>, _: u64) -> Archived {
        let path = file.path().to_path_buf();
        Archived::Unbounded {
            reason: Error::Rotate {
                from: path.clone(),
                to: old_path(&path),
                source: io::Error::other("rename refused"),
            },
            crop: Error::Crop {
                path,
                source: io::Error::other("crop refused"),
            },
        }
    }
}

#[test]
fn unbounded_archive_reports_both_failures() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    fs::write(&path, "x".repeat(50)).unwrap();

    let fallback = Arc::new(Memory::default());
    let file = transport(&path)
        .max_size(10)
        .rotation(Stuck)
        .fallback(Arc::clone(&fallback) as Arc<dyn Transport>);
    file.handle(&info("still here"));

    let texts = fallback.texts();
    assert_eq!(texts.len(), 2, "{texts:?}");
    assert!(texts[0].contains("Could not rotate log"));
    assert!(texts[0].contains("rename refused"));
    assert!(texts[1].contains("Can't write to"));
    assert!(texts[1].contains("crop refused"));
    assert!(fs::read_to_string(&path).unwrap().ends_with(&line("still here")));
}

#[test]
fn rotate_now_returns_unbounded_outcome() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let fallback = Arc::new(Memory::default());
    let file = transport(&path)
        .rotation(Stuck)
        .fallback(Arc::clone(&fallback) as Arc<dyn Transport>);

    let outcome = file.rotate_now();
    assert!(matches!(outcome, Archived::Unbounded { .. }), "{outcome:?}");
    assert_eq!(fallback.texts().len(), 2);
}

#[test]
fn level_is_exposed_to_the_logger() {
    let tmp = TempDir::new().unwrap();
    let file = transport(&tmp.path().join("main.log")).level(Level::Warn);
    assert_eq!(file.min_level(), Level::Warn);
}

#[test]
#[allow(deprecated)]
fn deprecated_accessors_still_work() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("main.log");
    let mut file = transport(&path);

    file.init();
    file.handle(&info("abc"));
    assert_eq!(file.bytes_written(), line("abc").len() as u64);
    assert_eq!(file.file_size(), line("abc").len() as u64);
    assert_eq!(file.file(), file.find_log_path());

    assert!(file.clear());
    assert_eq!(file.file_size(), 0);

    let other = tmp.path().join("other.log");
    file.set_file(&other);
    assert_eq!(file.file(), other);
}
