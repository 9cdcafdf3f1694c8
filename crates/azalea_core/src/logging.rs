//! Logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Initialize file-based rolling logs exactly once per process.
//! - Optionally echo log lines to stderr for foreground server runs.
//!
//! # Invariants
//! - Logging init is idempotent for identical settings.
//! - Re-initialization with a different level, directory or echo flag is
//!   rejected.
//! - Logging initialization must not panic.
//! - Log lines carry metadata only; passenger emails are reduced to their
//!   domain by callers.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "azalea";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_MESSAGE_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

/// Requested logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// One of `trace|debug|info|warn|error` (case-insensitive).
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
    /// Also write info-and-above lines to stderr.
    pub echo_to_stderr: bool,
}

impl LogSettings {
    pub fn new(level: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: level.into(),
            log_dir: log_dir.into(),
            echo_to_stderr: false,
        }
    }

    pub fn echo_to_stderr(mut self, echo: bool) -> Self {
        self.echo_to_stderr = echo;
        self
    }
}

struct LoggingState {
    level: LevelFilter,
    log_dir: PathBuf,
    echo_to_stderr: bool,
    _logger: LoggerHandle,
}

impl LoggingState {
    fn conflict(&self, level: LevelFilter, log_dir: &Path, echo: bool) -> Option<String> {
        if self.log_dir != log_dir {
            return Some(format!(
                "logging already initialized at `{}`; refusing to switch to `{}`",
                self.log_dir.display(),
                log_dir.display()
            ));
        }
        if self.level != level {
            return Some(format!(
                "logging already initialized with level `{}`; refusing to switch to `{}`",
                self.level, level
            ));
        }
        if self.echo_to_stderr != echo {
            return Some(format!(
                "logging already initialized with stderr echo `{}`; refusing to switch",
                self.echo_to_stderr
            ));
        }
        None
    }
}

/// Initializes process logging.
///
/// Returns `Ok(())` when logging is active, or a human-readable error string
/// when initialization fails.
///
/// # Errors
/// - Returns an error when the level is unsupported.
/// - Returns an error when the directory is empty, relative, or cannot be
///   created.
/// - Returns an error when settings conflict with an earlier initialization.
/// - Returns an error when logger backend setup fails.
pub fn init_logging(settings: &LogSettings) -> Result<(), String> {
    let level = parse_level(&settings.level)?;
    let log_dir = normalize_log_dir(&settings.log_dir)?;
    let echo = settings.echo_to_stderr;

    if let Some(state) = LOGGING_STATE.get() {
        return match state.conflict(level, &log_dir, echo) {
            Some(message) => Err(message),
            None => Ok(()),
        };
    }

    let init_dir = log_dir.clone();
    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        std::fs::create_dir_all(&init_dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                init_dir.display()
            )
        })?;

        let duplicate = if echo { Duplicate::Info } else { Duplicate::None };
        let logger = Logger::with(LogSpecification::builder().default(level).build())
            .log_to_file(
                FileSpec::default()
                    .directory(init_dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .duplicate_to_stderr(duplicate)
            // Format: [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        install_panic_hook_once();

        info!(
            "event=app_start module=logging status=ok platform={} debug_build={} version={}",
            std::env::consts::OS,
            cfg!(debug_assertions),
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=logging_init module=logging status=ok level={} log_dir={} echo_to_stderr={}",
            level.as_str().to_ascii_lowercase(),
            init_dir.display(),
            echo
        );

        Ok(LoggingState {
            level,
            log_dir: init_dir,
            echo_to_stderr: echo,
            _logger: logger,
        })
    })?;

    // A concurrent initializer may have won the race with other settings.
    match state.conflict(level, &log_dir, echo) {
        Some(message) => Err(message),
        None => Ok(()),
    }
}

/// Level used when neither `AZALEA_LOG_LEVEL` nor the CLI names one:
/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Accepts the `log` crate level names in any case, plus `warning`.
/// `off` is refused; a booking server without logs is a misconfiguration.
fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    let name = raw.trim().to_ascii_lowercase();
    let name = if name == "warning" { "warn" } else { name.as_str() };
    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(format!(
            "unsupported log level `{}`; expected trace|debug|info|warn|error",
            raw.trim()
        )),
        Ok(level) => Ok(level),
    }
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, String> {
    if log_dir.as_os_str().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if !log_dir.is_absolute() {
        return Err(format!(
            "log_dir must be an absolute path, got `{}`",
            log_dir.display()
        ));
    }
    Ok(log_dir.to_path_buf())
}

/// Routes panics from request handlers and blocking workers into the log
/// file before the default hook prints them.
fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        let payload = panic_info.payload();
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            *message
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.as_str()
        } else {
            "non-string panic payload"
        };
        error!(
            "event=panic_captured module=logging status=error location={} message={}",
            location,
            single_line(message, MAX_PANIC_MESSAGE_CHARS)
        );
        previous_hook(panic_info);
    }));
}

/// Flattens `value` onto one log line and caps it at `max_chars`, so a
/// panic message quoting a submission cannot forge extra key=value lines.
fn single_line(value: &str, max_chars: usize) -> String {
    let mut line: String = value
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .take(max_chars)
        .collect();
    if value.chars().nth(max_chars).is_some() {
        line.push_str("...");
    }
    line
}
