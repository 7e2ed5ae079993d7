#![deny(missing_docs)]
//! Shared logging utilities for the funnel workspace.
//!
//! This crate provides the `funnel_*` logging macros used across the codebase,
//! the logger initializer used by the command-line driver, and a minimal test
//! initializer for the global logger.

use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Default log file written by [`LogDestination::File`] and [`LogDestination::Both`].
pub const LOG_FILE: &str = "./funnel.log";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! funnel_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! funnel_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! funnel_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! funnel_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! funnel_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to `./funnel.log` in the current directory.
    File,
    /// Write to the terminal (stderr for warnings and errors).
    #[default]
    Terminal,
    /// Write to both file and terminal.
    Both,
}

impl fmt::Display for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogDestination::File => write!(f, "file"),
            LogDestination::Terminal => write!(f, "terminal"),
            LogDestination::Both => write!(f, "both"),
        }
    }
}

/// Error returned when a log destination name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDestination(pub String);

impl fmt::Display for UnknownDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown log destination {:?} (expected terminal, file or both)",
            self.0
        )
    }
}

impl std::error::Error for UnknownDestination {}

impl FromStr for LogDestination {
    type Err = UnknownDestination;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LogDestination::File),
            "terminal" | "term" => Ok(LogDestination::Terminal),
            "both" => Ok(LogDestination::Both),
            _ => Err(UnknownDestination(s.to_string())),
        }
    }
}

/// Initialize the global logger with the specified destination.
///
/// For `LogDestination::File` or `Both`, creates [`LOG_FILE`] in the current
/// working directory. If the file cannot be created the file logger is left
/// out; initialization never fails.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => {
            if let Some(file_logger) = create_file_logger(level, config) {
                vec![file_logger]
            } else {
                return;
            }
        }
        LogDestination::Terminal => {
            vec![TermLogger::new(
                level,
                config,
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )]
        }
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                config.clone(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            )];
            if let Some(file_logger) = create_file_logger(level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(level: LevelFilter, config: Config) -> Option<Box<WriteLogger<File>>> {
    let log_path = PathBuf::from(LOG_FILE);
    match File::create(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LogDestination;

    #[test]
    fn destination_names_parse_case_insensitively() {
        assert_eq!("FILE".parse(), Ok(LogDestination::File));
        assert_eq!(" terminal ".parse(), Ok(LogDestination::Terminal));
        assert_eq!("both".parse(), Ok(LogDestination::Both));
        assert!("syslog".parse::<LogDestination>().is_err());
    }

    #[test]
    fn destination_display_round_trips() {
        for dest in [
            LogDestination::File,
            LogDestination::Terminal,
            LogDestination::Both,
        ] {
            assert_eq!(dest.to_string().parse(), Ok(dest));
        }
    }
}
