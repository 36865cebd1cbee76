//! Logs the outcome of (pretend) file processing into a custom `files`
//! table, with a template for the text log and a raising ERROR for the
//! run that must stop the batch.
//!
//! Run with `cargo run --example file_processing -- [dir]`.

use diary::prelude::*;
use rusqlite::{params, Connection};

const RESULTS: [&str; 4] = ["Success", "Unsuccessful", "Error", "Could not process"];

struct FileProcessSchema;

impl Schema for FileProcessSchema {
    fn create_table(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS files \
             (inputDT TIMESTAMP, level TEXT, info TEXT, path TEXT, success INT)",
            [],
        )?;
        Ok(())
    }

    fn insert(&self, conn: &Connection, record: &Record) -> Result<()> {
        let path = record.fields.get("path").and_then(|v| v.as_str()).unwrap_or_default();
        let success = record.fields.get("success").and_then(|v| v.as_i64()).unwrap_or(0);
        conn.execute(
            "INSERT INTO files (inputDT, level, info, path, success) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.timestamp,
                record.level.to_string(),
                record.payload_text(),
                path,
                success
            ],
        )?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("batch aborted: {0}")]
struct BatchAborted(String);

fn file_event(info: &str, success: i64, path: &str) -> Record {
    let result = match success {
        1..=3 => RESULTS[(success - 1) as usize],
        _ => RESULTS[3],
    };
    Record::new(info, Level::Info)
        .with_field("success", success)
        .with_field("path", path)
        .with_field("result", result)
}

/// Deterministic stand-in for real work
fn process_file(index: usize) -> i64 {
    match index % 7 {
        3 => 2,
        6 => 3,
        _ => 1,
    }
}

fn main() -> Result<()> {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "file_info".to_string());
    std::fs::create_dir_all(&dir)?;

    let logger = Logger::builder(&dir)
        .file_name("file_processes.log")
        .db_name("file_processes.db")
        .schema(FileProcessSchema)
        .formatter(Formatter::template("|{timestamp}|{level}|{result}|{path} : {payload}")?)
        .build()?;

    let abort = LevelOptions::new().raises_with(|message| Box::new(BatchAborted(message)));

    for index in 0..10 {
        let path = format!("data/file_{}.csv", index);
        let outcome = match process_file(index) {
            1 => logger.info(file_event("Success!", 1, &path)),
            2 => logger.warn(file_event("The goal was not achieved", 2, &path)),
            3 => logger.error_with(file_event("An error occurred", 3, &path), &abort),
            other => logger.error(file_event("Unknown result", other, &path)),
        };

        if let Err(err) = outcome {
            if let Some(aborted) = err.raised_as::<BatchAborted>() {
                eprintln!("{}", aborted);
                break;
            }
            return Err(err);
        }
    }

    logger.close()?;
    println!("Processed files logged under {}", dir);
    Ok(())
}
