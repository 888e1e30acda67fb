#![no_main]
use libfuzzer_sys::fuzz_target;
use scribe::render::{Pipeline, RemoveStyles, style};
use scribe::{Level, LogRecord, Value};

fuzz_target!(|data: &str| {
    // Stripping never grows the input
    assert!(style::strip_ansi(data).len() <= data.len());

    // Must not panic on dangling `%c` directives without a style argument
    let record = LogRecord::new(Level::Info, vec![Value::from(data), Value::from("color: red")]);
    let _ = Pipeline::new().step(RemoveStyles).render_line(&record);
});
