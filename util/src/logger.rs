//! Session logger
//!
//! Every record is written to the session log file. The console only gets
//! records up to [`CONSOLE_MAX_LEVEL`], so per-tick trace output from the
//! control loop stays in the file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Most verbose level shown on the console.
pub const CONSOLE_MAX_LEVEL: LevelFilter = LevelFilter::Debug;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a minimum log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` applies to the session log file, the console is additionally
/// capped at [`CONSOLE_MAX_LEVEL`]. `min_level` must include `Info`.
///
/// Must only be called once per process.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < LevelFilter::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let console = fern::Dispatch::new()
        .level(min_level.min(CONSOLE_MAX_LEVEL))
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .level(min_level)
        .chain(log_file);

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target(),
                    message
                )
            ))
        })
        .level(min_level)
        .chain(console)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    File log level: {:?}", min_level);
    info!("    Console log level: {:?}", min_level.min(CONSOLE_MAX_LEVEL));
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single log line.
///
/// Debug and trace lines carry their target module so per-tick output can be
/// traced back to the loop or the follower.
fn format_line(
    elapsed_s: f64,
    level: log::Level,
    target: &str,
    message: &std::fmt::Arguments
) -> String {
    if level > log::Level::Info {
        format!("[{:10.6} {}] {}: {}", elapsed_s, level_to_str(level), target, message)
    }
    else {
        format!("[{:10.6} {}] {}", elapsed_s, level_to_str(level), message)
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_low_level() {
        let root = std::env::temp_dir().join("tito_util_logger_test");
        let session = session::Session::in_dir("logger", root).unwrap();

        assert!(matches!(
            logger_init(LevelFilter::Warn, &session),
            Err(LoggerInitError::InvalidMinLogLevel(LevelFilter::Warn))
        ));
    }

    #[test]
    fn test_format_line_target() {
        let line = format_line(
            1.5,
            log::Level::Trace,
            "tito_lib::ctrl_loop",
            &format_args!("tick {}", 3)
        );
        assert!(line.starts_with("[  1.500000 "));
        assert!(line.ends_with("tito_lib::ctrl_loop: tick 3"));

        let line = format_line(
            1.5,
            log::Level::Info,
            "tito_lib::ctrl_loop",
            &format_args!("session started")
        );
        assert!(!line.contains("tito_lib::ctrl_loop"));
        assert!(line.ends_with("session started"));
    }

    #[test]
    fn test_console_level_capped() {
        assert_eq!(LevelFilter::Trace.min(CONSOLE_MAX_LEVEL), LevelFilter::Debug);
        assert_eq!(LevelFilter::Info.min(CONSOLE_MAX_LEVEL), LevelFilter::Info);
    }
}
