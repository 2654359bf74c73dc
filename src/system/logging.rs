//! Logging system initialization
//!
//! Builds the global tracing subscriber from [`LoggingConfig`]. Call once,
//! after configuration has been loaded.

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const DEFAULT_LOG_FILE_NAME: &str = "shortly.log";

/// Where log lines end up.
#[derive(Debug, PartialEq, Eq)]
enum LogTarget<'a> {
    Stdout,
    File(&'a str),
    Rolling(&'a str),
}

fn log_target(config: &LoggingConfig) -> LogTarget<'_> {
    match config.file.as_deref() {
        Some(file) if !file.is_empty() && config.enable_rotation => LogTarget::Rolling(file),
        Some(file) if !file.is_empty() => LogTarget::File(file),
        _ => LogTarget::Stdout,
    }
}

fn build_writer(target: &LogTarget<'_>, max_backups: u32) -> Result<Box<dyn Write + Send + Sync>> {
    match *target {
        LogTarget::Stdout => Ok(Box::new(std::io::stdout())),
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            Ok(Box::new(file))
        }
        LogTarget::Rolling(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let filename = path
                .file_name()
                .and_then(OsStr::to_str)
                .unwrap_or(DEFAULT_LOG_FILE_NAME);

            let appender = rolling::Builder::new()
                .rotation(rolling::Rotation::DAILY)
                .filename_prefix(filename.trim_end_matches(".log"))
                .filename_suffix("log")
                .max_log_files(max_backups.max(1) as usize)
                .build(dir)
                .with_context(|| format!("Failed to create rolling log appender in {:?}", dir))?;
            Ok(Box::new(appender))
        }
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the non-blocking writer on drop and must be
/// held for the life of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let target = log_target(config);
    let writer = build_writer(&target, config.max_backups)?;

    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);

    let builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(target == LogTarget::Stdout);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}
