//! Run logging.
//!
//! Every run writes to the console and to its own log file,
//! `<log_dir>/<code>-<unix_millis>.log`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive.
pub const DEFAULT_FILTER: &str = "info";

/// Filter directive used with `--verbose`.
pub const VERBOSE_FILTER: &str = "debug";

/// Build the log-file name for a run of `code` started at `millis`.
///
/// Characters that cannot appear in a file name are replaced with `_`.
pub fn log_file_name(code: &str, millis: i64) -> String {
    let code: String = code
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{code}-{millis}.log")
}

/// Path of a new log file for `code` inside `log_dir`.
pub fn new_log_path(log_dir: &Path, code: &str) -> PathBuf {
    log_dir.join(log_file_name(code, chrono::Utc::now().timestamp_millis()))
}

/// Pick the filter: `RUST_LOG` wins, then `--verbose`, then the default.
pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    })
}

/// Install the global subscriber.
///
/// When `log_file` is given its directory is created and every event is
/// also appended there without ANSI colours.
pub fn init(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_target(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter(verbose))
        .try_init()
        .context("Failed to initialise logging")?;

    Ok(())
}
