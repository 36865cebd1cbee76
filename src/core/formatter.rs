//! Record rendering: built-in line formats, templates and functions

use super::error::{DiaryError, Result};
use super::line_format::LineFormat;
use super::record::Record;
use chrono::format::{Item, StrftimeItems};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Rendering function applied to a record
pub type FormatFn = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// How a record turns into one line of text.
///
/// Formatters are immutable once built; a `Template` is parsed and validated
/// when it is created, so rendering only has to resolve field values.
#[derive(Clone)]
pub enum Formatter {
    Line(LineFormat),
    Template(Template),
    Function(FormatFn),
}

impl Formatter {
    /// Parse a template such as `"[{level}] {payload}"`
    pub fn template(source: impl Into<String>) -> Result<Self> {
        Template::parse(source).map(Formatter::Template)
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        Formatter::Function(Arc::new(f))
    }

    pub fn render(&self, record: &Record) -> Result<String> {
        match self {
            Formatter::Line(format) => Ok(format.format(record)),
            Formatter::Template(template) => template.render(record),
            Formatter::Function(f) => Ok(f(record)),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Line(LineFormat::default())
    }
}

impl From<LineFormat> for Formatter {
    fn from(format: LineFormat) -> Self {
        Formatter::Line(format)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatter::Line(format) => f.debug_tuple("Line").field(format).finish(),
            Formatter::Template(template) => {
                f.debug_tuple("Template").field(&template.source).finish()
            }
            Formatter::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Accepts a built-in line format name, or a template containing placeholders.
impl FromStr for Formatter {
    type Err = DiaryError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(format) = s.parse::<LineFormat>() {
            return Ok(Formatter::Line(format));
        }
        if s.contains('{') {
            return Formatter::template(s);
        }
        Err(DiaryError::invalid_formatter(
            s,
            "neither a line format name nor a template",
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { name: String, spec: Option<String> },
}

/// A parsed `{field}` template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let segments = parse_segments(&source)
            .map_err(|reason| DiaryError::invalid_formatter(source.as_str(), reason))?;
        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of the fields this template reads, in order of appearance
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn render(&self, record: &Record) -> Result<String> {
        let mut out = String::with_capacity(self.source.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { name, spec } => {
                    out.push_str(&record.field_text(name, spec.as_deref())?)
                }
            }
        }
        Ok(out)
    }
}

fn parse_segments(source: &str) -> std::result::Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '{' => {
                let mut placeholder = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => return Err("nested '{' in placeholder".to_string()),
                        Some(ch) => placeholder.push(ch),
                        None => return Err("unclosed placeholder".to_string()),
                    }
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(parse_placeholder(&placeholder)?);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err("single '}' encountered".to_string()),
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_placeholder(placeholder: &str) -> std::result::Result<Segment, String> {
    let (name, spec) = match placeholder.split_once(':') {
        Some((name, spec)) => (name.trim(), Some(spec)),
        None => (placeholder.trim(), None),
    };

    if name.is_empty() {
        return Err("empty placeholder".to_string());
    }

    if let Some(spec) = spec {
        if name != "timestamp" {
            return Err(format!("format spec is only supported for 'timestamp', not '{}'", name));
        }
        if StrftimeItems::new(spec).any(|item| matches!(item, Item::Error)) {
            return Err(format!("invalid timestamp format '{}'", spec));
        }
    }

    Ok(Segment::Field {
        name: name.to_string(),
        spec: spec.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Level;
    use chrono::NaiveDate;

    fn record() -> Record {
        let ts = NaiveDate::from_ymd_opt(2016, 7, 30)
            .and_then(|d| d.and_hms_opt(20, 18, 9))
            .expect("valid datetime");
        Record::new("example text", Level::Info).with_timestamp(ts)
    }

    #[test]
    fn test_template_render() {
        let formatter = Formatter::template("[{level}] {payload} @ {timestamp}").unwrap();
        assert_eq!(
            formatter.render(&record()).unwrap(),
            "[INFO] example text @ 2016-07-30 20:18:09"
        );
    }

    #[test]
    fn test_template_escapes_and_spec() {
        let formatter = Formatter::template("{{{level}}} {timestamp:%H:%M}").unwrap();
        assert_eq!(formatter.render(&record()).unwrap(), "{INFO} 20:18");
    }

    #[test]
    fn test_template_syntax_errors() {
        for bad in ["{payload", "payload}", "{}", "{a{b}}", "{payload:%Y}", "{timestamp:%Q}"] {
            let err = Formatter::template(bad).unwrap_err();
            assert!(
                matches!(err, DiaryError::InvalidFormatter { ref formatter, .. } if formatter == bad),
                "expected invalid formatter for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_field_names() {
        let template = Template::parse("{user}/{payload}/{user}").unwrap();
        let names: Vec<&str> = template.field_names().collect();
        assert_eq!(names, vec!["user", "payload", "user"]);
    }

    #[test]
    fn test_function_formatter() {
        let formatter = Formatter::function(|r| format!("({})({})", r.level, r.payload_text()));
        assert_eq!(formatter.render(&record()).unwrap(), "(INFO)(example text)");
        assert_eq!(format!("{:?}", formatter), "Function(..)");
    }

    #[test]
    fn test_from_str() {
        assert!(matches!(
            "minimal".parse::<Formatter>().unwrap(),
            Formatter::Line(LineFormat::Minimal)
        ));
        assert!(matches!(
            "{level}".parse::<Formatter>().unwrap(),
            Formatter::Template(_)
        ));
        let err = "5".parse::<Formatter>().unwrap_err();
        assert!(err.to_string().contains("\"5\""));
    }
}
