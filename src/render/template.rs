//! Format templates such as `[{y}-{m}-{d} {h}:{i}:{s}.{ms}] [{level}] {text}`.
//! Templates are parsed into segments once and rendered against every record.

use crate::record::LogRecord;
use chrono::{Datelike, SecondsFormat, Timelike, Utc};

/// Closed set of known substitution tokens; unknown `{names}` pass through as literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millis,
    Zone,
    Iso,
    Level,
    Text,
    Scope,
    Process,
}

impl Placeholder {
    /// The name between the braces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Year => "y",
            Self::Month => "m",
            Self::Day => "d",
            Self::Hour => "h",
            Self::Minute => "i",
            Self::Second => "s",
            Self::Millis => "ms",
            Self::Zone => "z",
            Self::Iso => "iso",
            Self::Level => "level",
            Self::Text => "text",
            Self::Scope => "scope",
            Self::Process => "process",
        }
    }

    pub const ALL: &'static [Self] = &[
        Self::Year,
        Self::Month,
        Self::Day,
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Millis,
        Self::Zone,
        Self::Iso,
        Self::Level,
        Self::Text,
        Self::Scope,
        Self::Process,
    ];

    fn render(self, record: &LogRecord, out: &mut String) {
        let date = &record.date;
        match self {
            Self::Year => out.push_str(&date.year().to_string()),
            Self::Month => out.push_str(&format!("{:02}", date.month())),
            Self::Day => out.push_str(&format!("{:02}", date.day())),
            Self::Hour => out.push_str(&format!("{:02}", date.hour())),
            Self::Minute => out.push_str(&format!("{:02}", date.minute())),
            Self::Second => out.push_str(&format!("{:02}", date.second())),
            // Leap seconds report 1000+ millis
            Self::Millis => out.push_str(&format!("{:03}", date.timestamp_subsec_millis().min(999))),
            Self::Zone => out.push_str(&date.format("%:z").to_string()),
            Self::Iso => out.push_str(
                &date
                    .with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            Self::Level => out.push_str(record.level.as_str()),
            Self::Scope => out.push_str(record.origin.scope.as_deref().unwrap_or("")),
            Self::Process => out.push_str(record.origin.process.as_str()),
            // Handled by the caller: it splits the template instead of substituting.
            Self::Text => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Pre-parsed template: parse once, render many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    source: String,
    segments: Vec<FormatSegment>,
}

impl FormatTemplate {
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut i = 0;
        let chars: Vec<char> = template.chars().collect();

        while i < chars.len() {
            if chars[i] == '{'
                && let Some(end) = chars[i..].iter().position(|&c| c == '}')
            {
                let end = i + end;
                let name: String = chars[i + 1..end].iter().collect();

                // A later `{` opens the real token; this one is literal
                if name.contains('{') {
                    current.push('{');
                    i += 1;
                    continue;
                }

                if let Some(ph) = Self::match_placeholder(&name) {
                    if !current.is_empty() {
                        segments.push(FormatSegment::Literal(std::mem::take(&mut current)));
                    }
                    segments.push(FormatSegment::Placeholder(ph));
                } else {
                    current.push_str(&format!("{{{name}}}"));
                }

                i = end + 1;
                continue;
            }

            current.push(chars[i]);
            i += 1;
        }

        if !current.is_empty() {
            segments.push(FormatSegment::Literal(current));
        }

        Self {
            source: template.to_string(),
            segments,
        }
    }

    fn match_placeholder(name: &str) -> Option<Placeholder> {
        Placeholder::ALL.iter().copied().find(|ph| ph.as_str() == name)
    }

    #[must_use]
    pub fn segments(&self) -> &[FormatSegment] {
        &self.segments
    }

    /// The string this template was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn has_text(&self) -> bool {
        self.segments
            .contains(&FormatSegment::Placeholder(Placeholder::Text))
    }

    /// Renders everything except `{text}`.
    ///
    /// Returns the text before the first `{text}` and, if the template has one,
    /// the text after it. Later `{text}` tokens render as nothing.
    #[must_use]
    pub fn render_parts(&self, record: &LogRecord) -> (String, Option<String>) {
        let mut prefix = String::new();
        let mut suffix: Option<String> = None;

        for segment in &self.segments {
            let out = suffix.as_mut().unwrap_or(&mut prefix);
            match segment {
                FormatSegment::Literal(s) => out.push_str(s),
                FormatSegment::Placeholder(Placeholder::Text) => {
                    if suffix.is_none() {
                        suffix = Some(String::new());
                    }
                }
                FormatSegment::Placeholder(ph) => ph.render(record, out),
            }
        }

        (prefix, suffix)
    }

    /// Renders the whole template with `{text}` replaced by `text`.
    #[must_use]
    pub fn render(&self, record: &LogRecord, text: &str) -> String {
        let (prefix, suffix) = self.render_parts(record);
        match suffix {
            Some(suffix) => format!("{prefix}{text}{suffix}"),
            None => prefix,
        }
    }
}

impl Default for FormatTemplate {
    fn default() -> Self {
        Self::parse("[{y}-{m}-{d} {h}:{i}:{s}.{ms}] [{level}] {text}")
    }
}
