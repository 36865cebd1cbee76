//! Text file sink

use crate::core::{DiaryError, Formatter, Record, Result, Sink};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Look up a text encoding by its WHATWG label (`utf-8`, `latin1`, `utf-16`, ...)
///
/// Labels that can only be decoded (`replacement`, `iso-2022-kr`, ...) are rejected.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| DiaryError::config("encoding", format!("unknown label '{}'", label)))?;

    if is_utf16(encoding) || encoding.output_encoding() == encoding {
        Ok(encoding)
    } else {
        Err(DiaryError::config(
            "encoding",
            format!("'{}' ({}) cannot be used for writing", label, encoding.name()),
        ))
    }
}

fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}

/// Encode a line, failing on characters the encoding cannot represent
fn encode_line<'a>(encoding: &'static Encoding, line: &'a str) -> Result<Cow<'a, [u8]>> {
    if encoding == UTF_16LE {
        return Ok(Cow::Owned(line.encode_utf16().flat_map(u16::to_le_bytes).collect()));
    }
    if encoding == UTF_16BE {
        return Ok(Cow::Owned(line.encode_utf16().flat_map(u16::to_be_bytes).collect()));
    }

    let (bytes, _, had_errors) = encoding.encode(line);
    if had_errors {
        return Err(DiaryError::config(
            "encoding",
            format!("{} cannot represent every character of {:?}", encoding.name(), line.trim_end()),
        ));
    }
    Ok(bytes)
}

/// Appends each rendered record and a newline to a text file
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    formatter: Formatter,
    encoding: &'static Encoding,
}

impl FileSink {
    pub fn open(path: impl Into<PathBuf>, formatter: Formatter) -> Result<Self> {
        Self::with_encoding(path, formatter, encoding_rs::UTF_8)
    }

    pub fn with_encoding(
        path: impl Into<PathBuf>,
        formatter: Formatter,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| DiaryError::io_operation("opening log file", &path, e))?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            formatter,
            encoding,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write(&mut self, record: &Record) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(DiaryError::LoggerStopped)?;

        let mut line = record.render_with(&self.formatter)?;
        line.push('\n');

        let bytes = encode_line(self.encoding, &line)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, LineFormat};
    use tempfile::TempDir;

    #[test]
    fn test_appends_rendered_text_and_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = FileSink::open(&path, Formatter::template("{level} {payload}").unwrap())
            .unwrap();

        sink.write(&Record::new("first", Level::Info)).unwrap();
        sink.write(&Record::new("second\\n", Level::Warn)).unwrap();
        let multi_line = Record::new("body", Level::Info)
            .with_formatter(Formatter::function(|r| format!("HEAD\n{}", r.payload_text())));
        sink.write(&multi_line).unwrap();
        sink.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "INFO first\nWARN second\\n\nHEAD\nbody\n");
    }

    #[test]
    fn test_record_formatter_overrides_sink_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = FileSink::open(&path, Formatter::Line(LineFormat::Standard)).unwrap();

        let record = Record::new("custom", Level::Info)
            .with_formatter(Formatter::function(|r| format!(">> {}", r.payload_text())));
        sink.write(&record).unwrap();
        sink.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), ">> custom\n");
    }

    #[test]
    fn test_encoding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin.txt");
        let encoding = resolve_encoding("latin1").unwrap();
        let mut sink = FileSink::with_encoding(
            &path,
            Formatter::template("{payload}").unwrap(),
            encoding,
        )
        .unwrap();
        sink.write(&Record::new("café", Level::Info)).unwrap();
        sink.close().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"caf\xe9\n");
        assert!(resolve_encoding("klingon").is_err());
        assert!(resolve_encoding("replacement").is_err());
    }

    #[test]
    fn test_utf16_encoding() {
        let dir = TempDir::new().unwrap();
        let template = Formatter::template("{payload}").unwrap();

        let little = dir.path().join("le.txt");
        let mut sink =
            FileSink::with_encoding(&little, template.clone(), resolve_encoding("utf-16").unwrap())
                .unwrap();
        sink.write(&Record::new("hi", Level::Info)).unwrap();
        sink.close().unwrap();
        assert_eq!(std::fs::read(&little).unwrap(), vec![104, 0, 105, 0, 10, 0]);

        let big = dir.path().join("be.txt");
        let mut sink =
            FileSink::with_encoding(&big, template, resolve_encoding("utf-16be").unwrap()).unwrap();
        sink.write(&Record::new("hi", Level::Info)).unwrap();
        sink.close().unwrap();
        assert_eq!(std::fs::read(&big).unwrap(), vec![0, 104, 0, 105, 0, 10]);
    }

    #[test]
    fn test_unmappable_character_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin.txt");
        let mut sink = FileSink::with_encoding(
            &path,
            Formatter::template("{payload}").unwrap(),
            resolve_encoding("latin1").unwrap(),
        )
        .unwrap();

        let err = sink.write(&Record::new("snow \u{2603}", Level::Info)).unwrap_err();
        assert!(matches!(err, DiaryError::InvalidConfiguration { .. }));
        sink.write(&Record::new("plain", Level::Info)).unwrap();
        sink.close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"plain\n");
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::open(dir.path().join("x.txt"), Formatter::default()).unwrap();
        sink.close().unwrap();
        assert!(sink.write(&Record::new("late", Level::Info)).is_err());
    }

    #[test]
    fn test_missing_parent_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = FileSink::open(dir.path().join("no/such/dir.txt"), Formatter::default())
            .err()
            .unwrap();
        assert!(matches!(err, DiaryError::IoOperation { .. }));
    }
}
