#![no_main]
use libfuzzer_sys::fuzz_target;
use scribe::render::FormatTemplate;
use scribe::{Level, LogRecord, Value};

fuzz_target!(|data: &str| {
    // Must not panic on any template string, including unbalanced braces
    let template = FormatTemplate::parse(data);

    let record = LogRecord::new(Level::Info, vec![Value::from("hello")]).with_scope("fuzz");
    let (prefix, suffix) = template.render_parts(&record);
    assert_eq!(suffix.is_some(), template.has_text());
    let _ = (prefix, template.render(&record, "hello"));
});
