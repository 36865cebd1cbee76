//! Logging macros for ergonomic log message formatting.
//!
//! These macros format their arguments like `format!` and hand the result
//! to any [`Log`](crate::Log) implementor ([`Logger`](crate::Logger) or
//! [`Producer`](crate::Producer)). Each expands to the `Result<()>` of the
//! underlying call.
//!
//! # Examples
//!
//! ```
//! use diary::prelude::*;
//! use diary::info;
//!
//! let dir = tempfile::TempDir::new()?;
//! let logger = Logger::builder(dir.path()).async_mode(false).build()?;
//!
//! // Basic logging
//! info!(logger, "Server started")?;
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port)?;
//! # logger.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Log a message at the given [`Severity`](crate::Severity).
///
/// # Examples
///
/// ```
/// # use diary::prelude::*;
/// # let dir = tempfile::TempDir::new().unwrap();
/// # let logger = Logger::builder(dir.path()).async_mode(false).build().unwrap();
/// use diary::log;
/// log!(logger, &Severity::info(), "Simple message").unwrap();
/// log!(logger, &Severity::custom("audit"), "User {} exported a report", 42).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {{
        use $crate::Log as _;
        $logger.log(format!($($arg)+), $severity)
    }};
}

/// Log a debug-level message; skipped when debug is disabled.
///
/// # Examples
///
/// ```
/// # use diary::prelude::*;
/// # let dir = tempfile::TempDir::new().unwrap();
/// # let logger = Logger::builder(dir.path()).async_mode(false).build().unwrap();
/// use diary::debug;
/// debug!(logger, "Counter value: {}", 10).unwrap();
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {{
        use $crate::Log as _;
        $logger.debug(format!($($arg)+))
    }};
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use diary::prelude::*;
/// # let dir = tempfile::TempDir::new().unwrap();
/// # let logger = Logger::builder(dir.path()).async_mode(false).build().unwrap();
/// use diary::info;
/// info!(logger, "Processing {} items", 100).unwrap();
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {{
        use $crate::Log as _;
        $logger.info(format!($($arg)+))
    }};
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use diary::prelude::*;
/// # let dir = tempfile::TempDir::new().unwrap();
/// # let logger = Logger::builder(dir.path()).async_mode(false).build().unwrap();
/// use diary::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5).unwrap();
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {{
        use $crate::Log as _;
        $logger.warn(format!($($arg)+))
    }};
}

/// Log an error-level message (without raising).
///
/// # Examples
///
/// ```
/// # use diary::prelude::*;
/// # let dir = tempfile::TempDir::new().unwrap();
/// # let logger = Logger::builder(dir.path()).async_mode(false).build().unwrap();
/// use diary::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error").unwrap();
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {{
        use $crate::Log as _;
        $logger.error(format!($($arg)+))
    }};
}
