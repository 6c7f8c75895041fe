//! Logging init: append to `imgfetch.log` in the XDG state dir, or stderr
//! when that is not possible.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,imgfetch_core=debug,imgfetch=debug";
const LOG_FILE: &str = "imgfetch.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Create `dir` if needed and open its log file for appending.
fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    Ok((file, path))
}

/// Initialize structured logging to `~/.local/state/imgfetch/imgfetch.log`.
/// Returns Err (e.g. state dir unwritable) so the caller can fall back to stderr.
pub fn init_logging() -> Result<()> {
    let state_dir = xdg::BaseDirectories::with_prefix("imgfetch")?.get_state_home();
    let (file, path) = open_log_file(&state_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!("imgfetch logging initialized at {}", path.display());
    Ok(())
}

/// Initialize logging to stderr only. Use when `init_logging` fails.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
