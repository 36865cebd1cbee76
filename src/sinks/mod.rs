//! Sink implementations

pub mod console;
pub mod database;
pub mod file;

pub use console::ConsoleSink;
pub use database::{DatabaseSink, DefaultSchema, Schema};
pub use file::FileSink;

pub use crate::core::Sink;
