//! Parses settings templates into validated `Setting` records.
//!
//! A template alternates a time-range line with a setting line:
//!
//! ```text
//! 09:00-17:00
//! {"persistent":{"cluster.routing.allocation.enable":"none"}}
//! 23:00-01:00
//! {"transient":{"indices.recovery.max_bytes_per_sec":"200mb"}}
//! ```
//!
//! Validation is all-or-nothing: the first bad line rejects the whole
//! template, so a partially valid template never yields a partial list.

use crate::common::{ClockTime, TemplateName};
use crate::error::{ParseError, ParseErrorKind, TemplateError};
use crate::window::Window;
use std::path::Path;
use tracing::debug;

/// One declared rule: push `value` while the clock is inside `window`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub window: Window,
    /// The raw JSON object, forwarded verbatim to the gateway.
    pub value: String,
    /// 1-based source line of the time range.
    pub line: usize,
}

/// The ordered settings read from one template source.
#[derive(Debug, Clone)]
pub struct Template {
    name: TemplateName,
    settings: Vec<Setting>,
}

impl Template {
    /// Parses template text. A leading byte-order mark and blank lines are
    /// ignored; line numbers in errors refer to the physical source line.
    pub fn parse(name: TemplateName, source: &str) -> Result<Self, ParseError> {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        match parse_lines(source.lines()) {
            Ok(settings) => Ok(Self { name, settings }),
            Err((line, kind)) => Err(ParseError {
                template: name,
                line,
                kind,
            }),
        }
    }

    pub fn name(&self) -> &TemplateName {
        &self.name
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }
}

/// Reads and parses `dir/name`.
pub async fn read_template(dir: &Path, name: &TemplateName) -> Result<Template, TemplateError> {
    let path = dir.join(name.as_str());
    let source = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| TemplateError::Read { path, source })?;
    let template = Template::parse(name.clone(), &source)?;
    debug!(template = %name, settings = template.settings.len(), "Parsed template");
    Ok(template)
}

fn parse_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Setting>, (usize, ParseErrorKind)> {
    let lines: Vec<(usize, &str)> = lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let mut settings = Vec::with_capacity(lines.len() / 2);
    for pair in lines.chunks(2) {
        let (range_line, range, value_line, value) = match *pair {
            [(range_line, range), (value_line, value)] => (range_line, range, value_line, value),
            _ => return Err((pair[0].0, ParseErrorKind::UnpairedLine)),
        };

        let window = parse_time_range(range)
            .ok_or_else(|| (range_line, ParseErrorKind::MalformedTimeRange(range.to_string())))?;

        serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(value)
            .map_err(|e| (value_line, ParseErrorKind::InvalidValue(e.to_string())))?;

        settings.push(Setting {
            window,
            value: value.to_string(),
            line: range_line,
        });
    }
    Ok(settings)
}

/// `HH:MM-HH:MM`, no whitespace, no other delimiters.
fn parse_time_range(range: &str) -> Option<Window> {
    let (start, end) = range.split_once('-')?;
    Some(Window::new(parse_clock_time(start)?, parse_clock_time(end)?))
}

fn parse_clock_time(time: &str) -> Option<ClockTime> {
    let (hour, minute) = time.split_once(':')?;
    Some(ClockTime::new(two_digits(hour)?, two_digits(minute)?))
}

fn two_digits(component: &str) -> Option<u8> {
    match *component.as_bytes() {
        [tens, ones] if tens.is_ascii_digit() && ones.is_ascii_digit() => {
            Some((tens - b'0') * 10 + (ones - b'0'))
        }
        _ => None,
    }
}
