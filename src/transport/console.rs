//! Console output: immediate feedback on stdout/stderr. Also the destination
//! for the file transport's own failure warnings.

use super::Transport;
use crate::level::Level;
use crate::record::{LogRecord, ProcessKind};
use crate::render::{DEFAULT_DEPTH, FormatTemplate, Pipeline};

use std::io::{self, IsTerminal, Write};

/// `›` renders as garbage in the legacy Windows console.
const SEPARATOR: &str = if cfg!(windows) { ">" } else { "›" };

/// Time, separator, text.
#[must_use]
pub fn default_format() -> String {
    format!("{{h}}:{{i}}:{{s}}.{{ms}} {SEPARATOR} {{text}}")
}

#[derive(Debug, Clone)]
pub struct ConsoleTransport {
    level: Level,
    format: FormatTemplate,
    /// `None` detects a TTY per stream at write time.
    use_styles: Option<bool>,
    depth: Option<usize>,
    styled: Pipeline,
    plain: Pipeline,
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::for_process(ProcessKind::Main)
    }

    /// Main-process output is depth-limited; renderer and worker output is not.
    #[must_use]
    pub fn for_process(process: ProcessKind) -> Self {
        let depth = match process {
            ProcessKind::Main => Some(DEFAULT_DEPTH),
            ProcessKind::Renderer | ProcessKind::Worker => None,
        };
        let format = FormatTemplate::parse(&default_format());
        Self {
            level: Level::Silly,
            styled: Pipeline::console(&format, true, depth),
            plain: Pipeline::console(&format, false, depth),
            format,
            use_styles: None,
            depth,
        }
    }

    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn format(mut self, template: &str) -> Self {
        self.format = FormatTemplate::parse(template);
        self.rebuild();
        self
    }

    /// Forces styles on or off instead of detecting a TTY.
    #[must_use]
    pub const fn use_styles(mut self, enabled: bool) -> Self {
        self.use_styles = Some(enabled);
        self
    }

    #[must_use]
    pub fn depth(mut self, depth: Option<usize>) -> Self {
        self.depth = depth;
        self.rebuild();
        self
    }

    fn rebuild(&mut self) {
        self.styled = Pipeline::console(&self.format, true, self.depth);
        self.plain = Pipeline::console(&self.format, false, self.depth);
    }

    fn styles_for(&self, level: Level) -> bool {
        self.use_styles.unwrap_or_else(|| {
            if level.is_stderr() {
                io::stderr().is_terminal()
            } else {
                io::stdout().is_terminal()
            }
        })
    }

    /// The exact line `handle` would print.
    #[must_use]
    pub fn render(&self, record: &LogRecord) -> String {
        let pipeline = if self.styles_for(record.level) {
            &self.styled
        } else {
            &self.plain
        };
        pipeline.render_line(record)
    }
}

impl Transport for ConsoleTransport {
    fn handle(&self, record: &LogRecord) {
        let line = self.render(record);
        // A closed stdout/stderr has nowhere left to report to
        if record.level.is_stderr() {
            let _ = writeln!(io::stderr(), "{line}");
        } else {
            let _ = writeln!(io::stdout(), "{line}");
        }
    }

    fn min_level(&self) -> Level {
        self.level
    }

    fn flush(&self) -> Result<(), crate::Error> {
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }
}
