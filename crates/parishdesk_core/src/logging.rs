//! Logging bootstrap and panic capture.
//!
//! # Responsibility
//! - Start flexi_logger once per process with rotation and retention.
//! - Install a panic hook that records panics through `log` first.
//!
//! # Invariants
//! - `init_logging` is idempotent for the same directory.
//! - A second call aiming at a different directory fails explicitly instead
//!   of silently relocating the log stream.

use std::panic;
use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;

const LOG_BASENAME: &str = "parishdesk";
const ROTATE_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const MAX_PANIC_MESSAGE_CHARS: usize = 160;

struct LoggingState {
    // Held for the process lifetime; dropping it would stop the writer.
    _handle: LoggerHandle,
    dir: PathBuf,
}

static LOGGING: OnceCell<LoggingState> = OnceCell::new();

/// Default level per build profile: `debug` for dev builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// "initialized" once `init_logging` succeeded in this process.
pub fn logging_status() -> &'static str {
    if LOGGING.get().is_some() {
        "initialized"
    } else {
        "uninitialized"
    }
}

/// Starts file logging under `dir` at `level`.
///
/// Repeat calls with the same directory are no-ops; a different directory is
/// rejected because the stream cannot move mid-process.
pub fn init_logging(level: &str, dir: &str) -> Result<(), String> {
    let level = normalize_level(level);
    let dir = normalize_log_dir(dir)?;
    let state = LOGGING.get_or_try_init(|| start_logger(&level, &dir))?;
    if state.dir != dir {
        return Err(format!(
            "logging already writes to {}; cannot switch to {}",
            state.dir.display(),
            dir.display()
        ));
    }
    Ok(())
}

fn start_logger(level: &str, dir: &Path) -> Result<LoggingState, String> {
    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log specification '{level}': {err}"))?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;
    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok level={level} dir={}",
        dir.display()
    );
    Ok(LoggingState {
        _handle: handle,
        dir: dir.to_path_buf(),
    })
}

fn normalize_level(level: &str) -> String {
    let lowered = level.trim().to_lowercase();
    match lowered.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => lowered,
        _ => "info".to_string(),
    }
}

fn normalize_log_dir(dir: &str) -> Result<PathBuf, String> {
    let trimmed = dir.trim();
    if trimmed.is_empty() {
        return Err("log directory must not be blank".to_string());
    }
    let path = PathBuf::from(trimmed);
    std::fs::create_dir_all(&path)
        .map_err(|err| format!("cannot create log directory {}: {err}", path.display()))?;
    Ok(path)
}

fn install_panic_hook() {
    static HOOK: OnceCell<()> = OnceCell::new();
    HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            error!(
                "event=panic module=core status=abort message={}",
                sanitize_message(&panic_summary(info))
            );
            previous(info);
        }));
    });
}

fn panic_summary(info: &panic::PanicHookInfo<'_>) -> String {
    let message = if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    };
    match info.location() {
        Some(location) => format!("{message} at {}:{}", location.file(), location.line()),
        None => message,
    }
}

/// Drops control characters and caps the length so one panic line stays one
/// log line.
fn sanitize_message(message: &str) -> String {
    message
        .chars()
        .filter(|ch| !ch.is_control())
        .take(MAX_PANIC_MESSAGE_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_normalize_to_info() {
        assert_eq!(normalize_level("WARN"), "warn");
        assert_eq!(normalize_level("chatty"), "info");
        assert_eq!(normalize_level("  debug "), "debug");
    }

    #[test]
    fn blank_log_dir_is_rejected() {
        assert!(normalize_log_dir("   ").is_err());
    }

    #[test]
    fn sanitize_caps_length_and_strips_control_chars() {
        let noisy = format!("line1\nline2\t{}", "x".repeat(400));
        let cleaned = sanitize_message(&noisy);
        assert!(cleaned.chars().count() <= MAX_PANIC_MESSAGE_CHARS);
        assert!(!cleaned.contains('\n'));
        assert!(!cleaned.contains('\t'));
    }

    #[test]
    fn init_is_idempotent_for_same_dir_and_rejects_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let dir_text = dir.path().to_string_lossy().to_string();
        init_logging("debug", &dir_text).expect("first init should succeed");
        assert_eq!(logging_status(), "initialized");
        init_logging("debug", &dir_text).expect("same-dir init should be a no-op");

        let other = tempfile::tempdir().unwrap();
        let other_path = other.path().to_path_buf();
        let err = init_logging("debug", &other.path().to_string_lossy())
            .expect_err("conflicting dir must be rejected");
        assert!(err.contains("already writes"));

        drop(other);
        assert!(!other_path.exists(), "scratch dir must not outlive its guard");
    }
}
