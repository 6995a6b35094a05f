//! Logging setup.
//!
//! Every `log` record goes to an in-memory [`Logger`] buffer the TUI can
//! display, and to one sink: stderr for the server, an optional file for the
//! TUI (which owns the terminal).

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;

use crate::config::LoggingConfig;
use crate::constants::LOG_BUFFER_CAPACITY;

static LOGGER: OnceCell<Logger> = OnceCell::new();

/// Shared in-memory log buffer that can be used across the application
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

/// Where log lines go besides the in-memory buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// The configured log file, if any
    File,
}

impl Logger {
    pub fn new() -> Self {
        Self::with_capacity(LOG_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            logs: Arc::new(Mutex::new(VecDeque::new())),
            capacity,
        }
    }

    /// Add a log entry, evicting the oldest one when full
    pub fn log(&self, message: String) {
        let timestamp = Utc::now().format("%H:%M:%S%.3f").to_string();
        let formatted_message = format!("[{}] {}", timestamp, message);

        if let Ok(mut logs) = self.logs.lock() {
            if logs.len() == self.capacity {
                logs.pop_front();
            }
            logs.push_back(formatted_message);
        }
    }

    /// Get all logs sorted by date (newest first)
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            logs.iter().rev().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide buffer fed by [`init`].
pub fn global() -> &'static Logger {
    LOGGER.get_or_init(Logger::new)
}

/// Install the global `log` backend.
///
/// # Errors
/// Fails on an invalid level, an unwritable log file, or when a logger is
/// already installed.
pub fn init(config: &LoggingConfig, target: LogTarget) -> Result<()> {
    let level = config.level_filter()?;
    let buffer = global().clone();

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        // sqlx logs every statement at info
        .level_for("sqlx", log::LevelFilter::Warn)
        .level_for("sea_orm", log::LevelFilter::Warn)
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| out.finish(format_args!("{} {}", record.level(), message)))
                .chain(fern::Output::call(move |record| buffer.log(record.args().to_string()))),
        );

    match (target, &config.file) {
        (LogTarget::Stderr, _) => {
            dispatch = dispatch.chain(fern::Dispatch::new().format(format_line).chain(std::io::stderr()));
        }
        (LogTarget::File, Some(path)) => {
            dispatch = dispatch.chain(fern::Dispatch::new().format(format_line).chain(open_log_file(path)?));
        }
        (LogTarget::File, None) => {}
    }

    dispatch.apply().context("Failed to install logger")?;
    Ok(())
}

fn format_line(out: fern::FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    out.finish(format_args!(
        "[{} {:<5} {}] {}",
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        record.level(),
        record.target(),
        message
    ))
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_newest_entries_first() {
        let logger = Logger::with_capacity(2);
        logger.log("one".to_string());
        logger.log("two".to_string());
        logger.log("three".to_string());

        let logs = logger.get_logs();
        assert_eq!(logs.len(), 2);
        assert!(logs[0].ends_with("three"));
        assert!(logs[1].ends_with("two"));

        logger.clear();
        assert!(logger.get_logs().is_empty());
    }
}
