//! Console echo sink

use crate::core::{Formatter, Level, Record, Result, Sink};
#[cfg(feature = "console")]
use colored::Colorize;

/// Echoes rendered records to the terminal.
///
/// ERROR goes to stderr, everything else to stdout.
pub struct ConsoleSink {
    use_colors: bool,
    formatter: Formatter,
}

impl ConsoleSink {
    pub fn new(formatter: Formatter) -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            formatter,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors && cfg!(feature = "console");
        self
    }

    fn uses_stderr(level: &Level) -> bool {
        *level == Level::Error
    }

    #[cfg(feature = "console")]
    fn paint(&self, line: String, level: &Level) -> String {
        if self.use_colors {
            line.color(level.color_code()).to_string()
        } else {
            line
        }
    }

    #[cfg(not(feature = "console"))]
    fn paint(&self, line: String, _level: &Level) -> String {
        line
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, record: &Record) -> Result<()> {
        let line = self.paint(record.render_with(&self.formatter)?, &record.level);

        if Self::uses_stderr(&record.level) {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_write() {
        let mut sink = ConsoleSink::new(Formatter::default()).with_colors(false);
        assert!(sink.write(&Record::new("to stdout", Level::Info)).is_ok());
        assert!(sink.write(&Record::new("to stderr", Level::Error)).is_ok());
        assert!(sink.flush().is_ok());
        assert_eq!(sink.name(), "console");
    }

    #[test]
    fn test_error_by_any_spelling_goes_to_stderr() {
        assert!(ConsoleSink::uses_stderr(&Level::Error));
        assert!(ConsoleSink::uses_stderr(&Level::custom("error")));
        assert!(ConsoleSink::uses_stderr(&Level::Custom("ERROR".to_string())));
        assert!(!ConsoleSink::uses_stderr(&Level::Warn));
    }

    #[test]
    fn test_console_render_error_propagates() {
        let mut sink = ConsoleSink::new(Formatter::template("{missing}").unwrap());
        assert!(sink.write(&Record::new("x", Level::Info)).is_err());
    }
}
