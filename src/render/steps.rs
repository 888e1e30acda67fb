//! Template expansion, concatenation, depth limiting, and final serialization.

use super::Step;
use super::style::has_directive;
use super::template::FormatTemplate;
use crate::record::{LogRecord, Value};

/// Expands a [`FormatTemplate`] around the record's arguments.
///
/// Text before `{text}` is glued onto the first argument and text after it onto
/// the last, when those arguments are strings. Without `{text}` the rendered
/// template becomes a new leading element.
#[derive(Debug, Clone)]
pub struct CustomFormatter {
    template: FormatTemplate,
}

impl CustomFormatter {
    #[must_use]
    pub const fn new(template: FormatTemplate) -> Self {
        Self { template }
    }
}

impl Step for CustomFormatter {
    fn apply(&self, data: Vec<Value>, record: &LogRecord) -> Result<Vec<Value>, crate::Error> {
        let (prefix, suffix) = self.template.render_parts(record);

        let Some(suffix) = suffix else {
            let mut out = Vec::with_capacity(data.len() + 1);
            out.push(Value::String(prefix));
            out.extend(data);
            return Ok(out);
        };

        if data.is_empty() {
            return Ok(vec![Value::String(prefix + &suffix)]);
        }

        let mut out = data;

        if let Some(Value::String(first)) = out.first_mut() {
            first.insert_str(0, &prefix);
        } else {
            let prefix = prefix.trim_end();
            if !prefix.is_empty() {
                out.insert(0, Value::String(prefix.to_string()));
            }
        }

        if let Some(Value::String(last)) = out.last_mut() {
            last.push_str(&suffix);
        } else {
            let suffix = suffix.trim_start();
            if !suffix.is_empty() {
                out.push(Value::String(suffix.to_string()));
            }
        }

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "custom_formatter"
    }
}

/// Merges leading string arguments into one, space-separated.
///
/// Stops at the first non-string, and never merges into a string that still
/// carries a `%` directive (its arguments must stay positional).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatFirstStrings;

impl Step for ConcatFirstStrings {
    fn apply(&self, data: Vec<Value>, _record: &LogRecord) -> Result<Vec<Value>, crate::Error> {
        let mut iter = data.into_iter().peekable();
        let mut out = Vec::new();

        if let Some(Value::String(mut head)) = iter.next_if(Value::is_string) {
            while !has_directive(&head)
                && let Some(Value::String(next)) = iter.next_if(Value::is_string)
            {
                head.push(' ');
                head.push_str(&next);
            }
            out.push(Value::String(head));
        }

        out.extend(iter);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "concat_first_strings"
    }
}

/// Replaces every non-string argument with a depth-limited, cycle-free copy.
#[derive(Debug, Clone, Copy)]
pub struct MaxDepth {
    depth: Option<usize>,
}

impl MaxDepth {
    /// `None` disables the depth limit; cycles are still cut.
    #[must_use]
    pub const fn new(depth: Option<usize>) -> Self {
        Self { depth }
    }
}

impl Default for MaxDepth {
    fn default() -> Self {
        Self::new(Some(super::DEFAULT_DEPTH))
    }
}

impl Step for MaxDepth {
    fn apply(&self, data: Vec<Value>, _record: &LogRecord) -> Result<Vec<Value>, crate::Error> {
        Ok(data
            .into_iter()
            .map(|item| match item {
                Value::String(_) => item,
                other => Value::from(other.to_json(self.depth)),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "max_depth"
    }
}

/// Collapses all arguments into one space-joined string; the file target's final step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Join;

impl Step for Join {
    fn apply(&self, data: Vec<Value>, _record: &LogRecord) -> Result<Vec<Value>, crate::Error> {
        let text = data
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Ok(vec![Value::String(text)])
    }

    fn name(&self) -> &'static str {
        "join"
    }
}

/// Keeps a structured argument list but guarantees it is acyclic. The console target's final step.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToArgs;

impl Step for ToArgs {
    fn apply(&self, data: Vec<Value>, _record: &LogRecord) -> Result<Vec<Value>, crate::Error> {
        Ok(data
            .into_iter()
            .map(|item| match item {
                Value::String(_) => item,
                other => Value::from(other.to_json(None)),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "to_args"
    }
}
