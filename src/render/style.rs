//! `%c` style directives.
//!
//! A `%c` inside a string argument consumes the next argument as a CSS-like
//! style (`"color: red"`). Destinations that understand ANSI get the matching
//! escape code; everything else gets the directive and its style removed.

use super::Step;
use crate::record::{LogRecord, Value};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Every printf-like directive counts as an argument slot, but only `%c` is rewritten.
static DIRECTIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[1cdfiOos]").expect("Invalid directive regex"));

static ANSI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("Invalid ANSI regex"));

static COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"color:\s*(\w+)").expect("Invalid color regex"));

pub const ANSI_RESET: &str = "\x1b[0m";

/// Whether `text` contains any printf-like directive.
#[must_use]
pub fn has_directive(text: &str) -> bool {
    DIRECTIVE_REGEX.is_match(text)
}

/// Removes raw ANSI SGR escapes.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    ANSI_REGEX.replace_all(text, "").into_owned()
}

/// Maps a CSS `color:` declaration to an ANSI foreground code; unknown colors map to nothing.
#[must_use]
pub fn style_to_ansi(style: &str) -> &'static str {
    let color = COLOR_REGEX
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase());

    match color.as_deref() {
        Some("unset") => ANSI_RESET,
        Some("black") => "\x1b[30m",
        Some("red") => "\x1b[31m",
        Some("green") => "\x1b[32m",
        Some("yellow") => "\x1b[33m",
        Some("blue") => "\x1b[34m",
        Some("magenta") => "\x1b[35m",
        Some("cyan") => "\x1b[36m",
        Some("white") => "\x1b[37m",
        _ => "",
    }
}

/// Rewrites each `%c` whose matching argument is a string, dropping that argument.
fn transform_styles(
    data: &[Value],
    on_style: impl Fn(&str) -> String,
    reset_after: bool,
) -> Vec<Value> {
    let mut consumed = vec![false; data.len()];
    let mut out = Vec::with_capacity(data.len());

    for (index, item) in data.iter().enumerate() {
        if consumed[index] {
            continue;
        }

        let Value::String(text) = item else {
            out.push(item.clone());
            continue;
        };

        let mut value_index = index;
        let mut applied = false;
        let mut rewritten = DIRECTIVE_REGEX
            .replace_all(text, |caps: &Captures<'_>| {
                value_index += 1;
                let directive = &caps[0];
                if directive != "%c" {
                    return directive.to_string();
                }
                match data.get(value_index) {
                    Some(Value::String(style)) => {
                        consumed[value_index] = true;
                        applied = true;
                        on_style(style)
                    }
                    _ => directive.to_string(),
                }
            })
            .into_owned();

        if applied && reset_after {
            rewritten.push_str(ANSI_RESET);
        }
        out.push(Value::String(rewritten));
    }

    out
}

/// For destinations that cannot render color: drops `%c` styles and any raw ANSI escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveStyles;

impl Step for RemoveStyles {
    fn apply(&self, data: Vec<Value>, _record: &LogRecord) -> Result<Vec<Value>, crate::Error> {
        Ok(transform_styles(&data, |_| String::new(), false)
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Value::String(strip_ansi(&s)),
                other => other,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "remove_styles"
    }
}

/// For ANSI-capable terminals: turns `%c` styles into escape codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyAnsiStyles;

impl Step for ApplyAnsiStyles {
    fn apply(&self, data: Vec<Value>, _record: &LogRecord) -> Result<Vec<Value>, crate::Error> {
        Ok(transform_styles(
            &data,
            |style| style_to_ansi(style).to_string(),
            true,
        ))
    }

    fn name(&self) -> &'static str {
        "apply_ansi_styles"
    }
}
