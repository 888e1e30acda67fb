//! The render pipeline: an ordered list of pure steps that turns a record's
//! arguments into the output a transport delivers.
//!
//! Each step receives the previous step's output. A step that fails aborts the
//! chain and the pipeline falls back to the record's raw text, so rendering
//! never surfaces an error to the logging call.

mod steps;
pub mod style;
mod template;

pub use steps::{ConcatFirstStrings, CustomFormatter, Join, MaxDepth, ToArgs};
pub use style::{ApplyAnsiStyles, RemoveStyles};
pub use template::{FormatSegment, FormatTemplate, Placeholder};

use crate::internal;
use crate::record::{LogRecord, Value};
use std::fmt;
use std::sync::Arc;

/// Depth limit used by the file target and main-process console output.
pub const DEFAULT_DEPTH: usize = 4;

/// One transform in a [`Pipeline`].
///
/// Closures of the shape `Fn(Vec<Value>, &LogRecord) -> Result<Vec<Value>, Error>`
/// implement this directly.
pub trait Step: Send + Sync {
    /// # Errors
    /// Any error aborts the pipeline and triggers the raw-text fallback.
    fn apply(&self, data: Vec<Value>, record: &LogRecord) -> Result<Vec<Value>, crate::Error>;

    /// Shows up in diagnostics when the step fails.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> Step for F
where
    F: Fn(Vec<Value>, &LogRecord) -> Result<Vec<Value>, crate::Error> + Send + Sync,
{
    fn apply(&self, data: Vec<Value>, record: &LogRecord) -> Result<Vec<Value>, crate::Error> {
        self(data, record)
    }
}

#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    /// An empty pipeline returns the record's arguments unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step to the end of the chain.
    #[must_use]
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Plain text, template-formatted, depth-limited, joined into a single line.
    #[must_use]
    pub fn file(template: &FormatTemplate, depth: Option<usize>) -> Self {
        Self::new()
            .step(RemoveStyles)
            .step(CustomFormatter::new(template.clone()))
            .step(ConcatFirstStrings)
            .step(MaxDepth::new(depth))
            .step(Join)
    }

    /// Styled or plain depending on the destination, kept as an argument list.
    #[must_use]
    pub fn console(template: &FormatTemplate, use_styles: bool, depth: Option<usize>) -> Self {
        let pipeline = Self::new().step(CustomFormatter::new(template.clone()));
        let pipeline = if use_styles {
            pipeline.step(ApplyAnsiStyles)
        } else {
            pipeline.step(RemoveStyles)
        };
        pipeline
            .step(ConcatFirstStrings)
            .step(MaxDepth::new(depth))
            .step(ToArgs)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order; on the first failure returns the raw-text fallback.
    #[must_use]
    pub fn render(&self, record: &LogRecord) -> Vec<Value> {
        let mut data = record.data.clone();

        for step in &self.steps {
            match step.apply(data, record) {
                Ok(next) => data = next,
                Err(e) => {
                    internal::warn(
                        "RENDER",
                        &format!("Step '{}' failed, using raw text: {e}", step.name()),
                    );
                    return fallback(record);
                }
            }
        }

        data
    }

    /// Renders and joins the output into one line.
    #[must_use]
    pub fn render_line(&self, record: &LogRecord) -> String {
        let data = self.render(record);
        match data.as_slice() {
            [Value::String(line)] => line.clone(),
            items => items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

/// Best-effort output when a step fails: the raw arguments, joined.
#[must_use]
pub fn fallback(record: &LogRecord) -> Vec<Value> {
    vec![Value::String(record.raw_text())]
}
