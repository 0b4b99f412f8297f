//! Process-wide logging bootstrap.
//!
//! # Invariants
//! - Initialization happens at most once per process; later calls with the
//!   same settings are no-ops and calls with different settings are rejected.
//! - Initialization never panics.
//! - Without a directory, records go to stderr; with one, to rotating files.

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;

const LOG_FILE_BASENAME: &str = "libraryhub";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    directory: Option<PathBuf>,
    _logger: LoggerHandle,
}

/// Initializes logging with `level`, writing to `directory` when given.
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when the directory cannot be created.
/// - Returns an error when logging is already active with other settings.
pub fn init_logging(level: &str, directory: Option<&Path>) -> Result<(), String> {
    let level = normalize_level(level)?;
    let directory = directory.map(Path::to_path_buf);

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        let logger = Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

        let logger = match &directory {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|err| {
                    format!("failed to create log directory `{}`: {err}", dir.display())
                })?;
                logger
                    .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                    .rotate(
                        Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                        Naming::Numbers,
                        Cleanup::KeepLogFiles(MAX_LOG_FILES),
                    )
                    .write_mode(WriteMode::BufferAndFlush)
                    .append()
                    .format_for_files(flexi_logger::detailed_format)
            }
            None => logger.log_to_stderr().format(flexi_logger::detailed_format),
        };

        let handle = logger
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        info!(
            "event=app_start module=logging status=ok level={} target={} version={}",
            level,
            directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "stderr".to_string()),
            env!("CARGO_PKG_VERSION")
        );

        Ok(LoggingState {
            level,
            directory: directory.clone(),
            _logger: handle,
        })
    })?;

    if state.level != level || state.directory != directory {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to reconfigure",
            state.level
        ));
    }

    Ok(())
}

/// Active `(level, directory)`, or `None` before initialization
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.directory.clone()))
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}
