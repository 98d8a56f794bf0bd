use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "uptime_monitor.log";

const SECS_PER_DAY: u64 = 86_400;

/// Removes `*.log` files older than `retention_days` and returns their paths.
pub fn purge_old_logs(dir: &Path, retention_days: u64, now: SystemTime) -> Result<Vec<PathBuf>> {
    let retention = Duration::from_secs(retention_days * SECS_PER_DAY);
    let mut removed = Vec::new();

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list log directory {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("log") || !path.is_file() {
            continue;
        }
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        let age = now.duration_since(modified).unwrap_or_default();
        if age > retention {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed.push(path);
        }
    }

    Ok(removed)
}

pub fn init(log_dir: &Path, retention_days: u64) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let purged = purge_old_logs(log_dir, retention_days, SystemTime::now());

    let log_path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_ansi(true))
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    match purged {
        Ok(removed) if !removed.is_empty() => {
            info!("Purged {} log files older than {} days", removed.len(), retention_days)
        }
        Ok(_) => {}
        Err(e) => warn!("Log retention sweep failed: {:#}", e),
    }

    Ok(())
}
