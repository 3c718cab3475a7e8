use crate::config::{Config, DebugLogRotation};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "searchcode-debug.log";

/// Keeps the non-blocking file writer alive; drop it to flush.
#[allow(dead_code)]
pub struct LogGuard(WorkerGuard);

/// Initialize logging.
///
/// With `debug = true` in the config, logs go to a file (`debug_log_path`,
/// default `<config dir>/searchcode/searchcode-debug.log`) at debug level.
/// Otherwise they go to stderr, filtered by `RUST_LOG` or, failing that,
/// `searchcode=warn` (`searchcode=debug` when `verbose`).
pub fn init(config: &Config, verbose: bool) -> Result<Option<LogGuard>> {
    if !config.debug {
        let default = if verbose { "searchcode=debug,warn" } else { "searchcode=warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .ok(); // If already initialized (e.g., in tests), don't crash.

        return Ok(None);
    }

    let rotation = config.debug_log_rotation.unwrap_or_default();
    let log_path = resolve_log_path(config.debug_log_path.as_deref())?;

    let (writer, guard): (NonBlocking, WorkerGuard) = match rotation {
        DebugLogRotation::None => {
            ensure_parent_dir(&log_path)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
            tracing_appender::non_blocking(file)
        }
        DebugLogRotation::Daily => {
            let (dir, base_name) = split_dir_and_name(&log_path)?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, &base_name))
        }
    };

    let filter = EnvFilter::try_new("searchcode=debug,warn").unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok();

    tracing::info!(log_file = %log_path.display(), rotation = ?rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

/// Resolve the configured log location to a file path.
///
/// A value ending in a separator, or naming an existing directory, gets the
/// default file name appended.
pub fn resolve_log_path(config_value: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = config_value else {
        return Ok(crate::config::config_dir()?.join(LOG_FILE_NAME));
    };

    let path = PathBuf::from(expand_tilde(raw));
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let suffix = raw.strip_prefix('~').unwrap_or("");
            return format!("{}{}", home.display(), suffix);
        }
    }
    raw.to_string()
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    Ok(())
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_value_gets_default_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_log_path(dir.path().to_str()).unwrap();
        assert_eq!(resolved, dir.path().join(LOG_FILE_NAME));
    }

    #[test]
    fn test_file_value_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.log");
        let resolved = resolve_log_path(file.to_str()).unwrap();
        assert_eq!(resolved, file);
    }

    #[test]
    fn test_tilde_expansion() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(PathBuf::from(expand_tilde("~/logs/x.log")), home.join("logs/x.log"));
        }
        assert_eq!(expand_tilde("/tmp/~x"), "/tmp/~x");
    }

    #[test]
    fn test_split_dir_and_name() {
        let (dir, name) = split_dir_and_name(Path::new("/var/log/sc.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(name, "sc.log");
    }
}
