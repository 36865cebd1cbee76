//! Built-in line formats for records
//!
//! - Standard: `[INFO]:[2016-07-30 20:18:09.401149]: example text`
//! - Minimal: `INFO: 07/30/16 20:15:48: example text`
//! - Alarms: `!!!ERROR!!!2016-07-31 21:55:00.165649!!!NOOOOO!!!`
//! - EasyRead: `|INFO| On 07/30/16 @ 08:18.55PM | example text`
//! - Json: one JSON object per line

use super::level::Level;
use super::record::{display_timestamp, Record};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFormat {
    #[default]
    Standard,
    Minimal,
    Alarms,
    EasyRead,
    Json,
}

impl LineFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineFormat::Standard => "standard",
            LineFormat::Minimal => "minimal",
            LineFormat::Alarms => "alarms",
            LineFormat::EasyRead => "easy_read",
            LineFormat::Json => "json",
        }
    }

    /// Format a record according to this line format
    pub fn format(&self, record: &Record) -> String {
        match self {
            LineFormat::Standard => format!(
                "[{}]:[{}]: {}",
                record.level,
                display_timestamp(&record.timestamp),
                payload(record)
            ),
            LineFormat::Minimal => format!(
                "{}: {}: {}",
                record.level,
                record.timestamp.format("%m/%d/%y %H:%M:%S"),
                payload(record)
            ),
            LineFormat::Alarms => {
                let sep = if record.level == Level::Error { "!!!" } else { " - " };
                format!(
                    "{sep}{}{sep}{}{sep}{}{sep}",
                    record.level,
                    display_timestamp(&record.timestamp),
                    payload(record),
                    sep = sep
                )
            }
            LineFormat::EasyRead => format!(
                "|{}| On {} | {}",
                record.level,
                record.timestamp.format("%m/%d/%y @ %I:%M.%S%p"),
                payload(record)
            ),
            LineFormat::Json => format_json(record),
        }
    }
}

fn payload(record: &Record) -> String {
    record.payload_text().trim().to_string()
}

fn format_json(record: &Record) -> String {
    let mut json_obj = serde_json::Map::new();

    json_obj.insert(
        "timestamp".to_string(),
        serde_json::Value::String(display_timestamp(&record.timestamp)),
    );
    json_obj.insert(
        "level".to_string(),
        serde_json::Value::String(record.level.to_string()),
    );
    json_obj.insert("payload".to_string(), record.payload.clone());

    // Extension fields never shadow the core ones
    for (key, value) in &record.fields {
        json_obj
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }

    serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
}

impl fmt::Display for LineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(LineFormat::Standard),
            "minimal" => Ok(LineFormat::Minimal),
            "alarms" => Ok(LineFormat::Alarms),
            "easy_read" => Ok(LineFormat::EasyRead),
            "json" => Ok(LineFormat::Json),
            _ => Err(format!("Invalid line format: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(level: Level) -> Record {
        let ts = NaiveDate::from_ymd_opt(1901, 2, 3)
            .and_then(|d| d.and_hms_opt(4, 5, 6))
            .expect("valid datetime");
        Record::new("event is logged ", level).with_timestamp(ts)
    }

    #[test]
    fn test_standard() {
        assert_eq!(
            LineFormat::Standard.format(&record(Level::custom("critical"))),
            "[CRITICAL]:[1901-02-03 04:05:06]: event is logged"
        );
    }

    #[test]
    fn test_minimal() {
        assert_eq!(
            LineFormat::Minimal.format(&record(Level::custom("critical"))),
            "CRITICAL: 02/03/01 04:05:06: event is logged"
        );
    }

    #[test]
    fn test_alarms() {
        assert_eq!(
            LineFormat::Alarms.format(&record(Level::custom("critical"))),
            " - CRITICAL - 1901-02-03 04:05:06 - event is logged - "
        );
        assert_eq!(
            LineFormat::Alarms.format(&record(Level::Error)),
            "!!!ERROR!!!1901-02-03 04:05:06!!!event is logged!!!"
        );
        assert_eq!(
            LineFormat::Alarms.format(&record(Level::custom("error"))),
            LineFormat::Alarms.format(&record(Level::Error))
        );
        assert_eq!(
            LineFormat::Alarms.format(&record(Level::Custom("ERROR".to_string()))),
            "!!!ERROR!!!1901-02-03 04:05:06!!!event is logged!!!"
        );
    }

    #[test]
    fn test_easy_read() {
        assert_eq!(
            LineFormat::EasyRead.format(&record(Level::Info)),
            "|INFO| On 02/03/01 @ 04:05.06AM | event is logged"
        );
    }

    #[test]
    fn test_json_includes_extension_fields() {
        let entry = record(Level::Warn).with_field("request_id", "abc-123");
        let parsed: serde_json::Value =
            serde_json::from_str(&LineFormat::Json.format(&entry)).unwrap();
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["payload"], "event is logged ");
        assert_eq!(parsed["request_id"], "abc-123");
        assert_eq!(parsed["timestamp"], "1901-02-03 04:05:06");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("easy-read".parse::<LineFormat>().unwrap(), LineFormat::EasyRead);
        assert_eq!("JSON".parse::<LineFormat>().unwrap(), LineFormat::Json);
        assert!("fancy".parse::<LineFormat>().is_err());
        assert_eq!(LineFormat::default(), LineFormat::Standard);
    }
}
