//! Record structure

use super::error::{DiaryError, Result};
use super::formatter::Formatter;
use super::level::Level;
use chrono::{Local, NaiveDateTime, Timelike};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Format a timestamp the way the text sink and database show it:
/// `YYYY-MM-DD HH:MM:SS`, with `.ffffff` only when the fraction is non-zero.
pub fn display_timestamp(timestamp: &NaiveDateTime) -> String {
    if timestamp.nanosecond() / 1_000 == 0 {
        timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        timestamp.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

/// Render a JSON value as plain text: strings verbatim, everything else as JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One log occurrence.
///
/// `fields` holds extension values beyond the three core fields; templates
/// can reference them by name and the JSON line format emits them.
#[derive(Clone)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    pub level: Level,
    pub payload: Value,
    pub fields: BTreeMap<String, Value>,
    formatter: Option<Formatter>,
}

impl Record {
    pub fn new(payload: impl Into<Value>, level: Level) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            level,
            payload: payload.into(),
            fields: BTreeMap::new(),
            formatter: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = Some(formatter);
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    pub fn formatter(&self) -> Option<&Formatter> {
        self.formatter.as_ref()
    }

    /// Render with this record's own formatter.
    ///
    /// Fails with [`DiaryError::FormatterUnavailable`] when none was set.
    pub fn formatted(&self) -> Result<String> {
        match self.formatter {
            Some(ref formatter) => formatter.render(self),
            None => Err(DiaryError::FormatterUnavailable),
        }
    }

    /// Render with this record's formatter, falling back to `default`
    pub fn render_with(&self, default: &Formatter) -> Result<String> {
        match self.formatter {
            Some(ref formatter) => formatter.render(self),
            None => default.render(self),
        }
    }

    pub fn payload_text(&self) -> String {
        value_text(&self.payload)
    }

    /// Append a block of text to the payload, turning it into a string
    pub fn append_to_payload(&mut self, text: &str) {
        let mut payload = self.payload_text();
        if !payload.is_empty() {
            payload.push('\n');
        }
        payload.push_str(text);
        self.payload = Value::String(payload);
    }

    /// Resolve a template placeholder against this record
    pub(crate) fn field_text(&self, name: &str, spec: Option<&str>) -> Result<String> {
        match name {
            "payload" => Ok(self.payload_text()),
            "level" => Ok(self.level.to_string()),
            "timestamp" => match spec {
                Some(spec) => {
                    use std::fmt::Write;
                    let mut out = String::new();
                    write!(out, "{}", self.timestamp.format(spec)).map_err(|_| {
                        DiaryError::invalid_formatter(spec, "invalid timestamp format")
                    })?;
                    Ok(out)
                }
                None => Ok(display_timestamp(&self.timestamp)),
            },
            _ => self
                .fields
                .get(name)
                .map(value_text)
                .ok_or_else(|| DiaryError::missing_field(name)),
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("timestamp", &self.timestamp)
            .field("level", &self.level)
            .field("payload", &self.payload)
            .field("fields", &self.fields)
            .field("formatter", &self.formatter)
            .finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formatted() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

/// Conversion of log call content into a [`Record`].
///
/// Existing records pass through untouched; plain content is wrapped in a
/// new record at the requested level.
pub trait IntoRecord {
    fn into_record(self, level: Level) -> Record;
}

impl IntoRecord for Record {
    fn into_record(self, _level: Level) -> Record {
        self
    }
}

impl IntoRecord for &str {
    fn into_record(self, level: Level) -> Record {
        Record::new(self, level)
    }
}

impl IntoRecord for String {
    fn into_record(self, level: Level) -> Record {
        Record::new(self, level)
    }
}

impl IntoRecord for &String {
    fn into_record(self, level: Level) -> Record {
        Record::new(self.as_str(), level)
    }
}

impl IntoRecord for Value {
    fn into_record(self, level: Level) -> Record {
        Record::new(self, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1901, 2, 3)
            .and_then(|d| d.and_hms_opt(4, 5, 6))
            .expect("valid datetime")
    }

    #[test]
    fn test_defaults_to_creation_time() {
        let before = Local::now().naive_local();
        let record = Record::new("something was logged", Level::custom("critical"));
        assert!(record.timestamp >= before);
        assert_eq!(record.level.to_string(), "CRITICAL");
        assert!(record.formatter().is_none());
    }

    #[test]
    fn test_display_timestamp_fraction() {
        let ts = fixed_timestamp();
        assert_eq!(display_timestamp(&ts), "1901-02-03 04:05:06");

        let with_micros = ts + chrono::Duration::microseconds(401_149);
        assert_eq!(display_timestamp(&with_micros), "1901-02-03 04:05:06.401149");
    }

    #[test]
    fn test_formatted_without_formatter_fails() {
        let record = Record::new("x", Level::Info);
        assert!(matches!(
            record.formatted(),
            Err(DiaryError::FormatterUnavailable)
        ));
        // Display falls back to the debug representation
        assert!(record.to_string().starts_with("Record {"));
    }

    #[test]
    fn test_template_tracks_current_state() {
        let formatter = Formatter::template("({level})({payload})").unwrap();
        let mut record = Record::new("something", Level::Warn).with_formatter(formatter);
        assert_eq!(record.formatted().unwrap(), "(WARN)(something)");
        assert_eq!(record.formatted().unwrap(), "(WARN)(something)");

        record.payload = Value::String(String::new());
        assert_eq!(record.formatted().unwrap(), "(WARN)()");
        assert_eq!(record.to_string(), "(WARN)()");
    }

    #[test]
    fn test_extension_fields_and_missing_field() {
        let formatter = Formatter::template("{user}: {payload}").unwrap();
        let record = Record::new("login", Level::Info)
            .with_field("user", "alice")
            .with_formatter(formatter.clone());
        assert_eq!(record.formatted().unwrap(), "alice: login");

        let bare = Record::new("login", Level::Info).with_formatter(formatter);
        assert!(matches!(
            bare.formatted(),
            Err(DiaryError::MissingField { ref field }) if field == "user"
        ));
    }

    #[test]
    fn test_append_to_payload() {
        let mut record = Record::new(serde_json::json!({"code": 7}), Level::Error);
        record.append_to_payload("trace line");
        assert_eq!(record.payload_text(), "{\"code\":7}\ntrace line");
    }

    #[test]
    fn test_into_record_keeps_existing_level() {
        let record = Record::new("kept", Level::Warn).into_record(Level::Info);
        assert_eq!(record.level, Level::Warn);

        let wrapped = "fresh".into_record(Level::Error);
        assert_eq!(wrapped.level, Level::Error);
        assert_eq!(wrapped.payload_text(), "fresh");
    }
}
