use clap::{Parser, Subcommand, ValueEnum};
use diary::sinks::{DatabaseSink, Sink};
use diary::{DiaryError, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "Create empty diary log targets.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty database (with the logs table) or an empty text log
    Generate {
        #[arg(value_enum)]
        kind: Kind,
        path: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Sqlite,
    Db,
    Text,
    Log,
}

fn generate(kind: Kind, path: &Path) -> Result<()> {
    match kind {
        Kind::Sqlite | Kind::Db => {
            let mut sink = DatabaseSink::open(path)?;
            sink.close()
        }
        Kind::Text | Kind::Log => {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DiaryError::io_operation("creating log file", path, e))?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.cmd {
        Command::Generate { kind, ref path } => generate(kind, path),
    };

    match result {
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(1)
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}
