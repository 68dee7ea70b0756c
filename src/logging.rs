//! Diagnostic logging
//!
//! The terminal belongs to the dashboard, so events only go somewhere when a
//! log file is configured. Without one no subscriber is installed and
//! `tracing` drops everything.

use crate::config::LogConfig;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install a file subscriber if the configuration names a log file.
/// Returns whether logging is active.
pub fn init(config: &LogConfig) -> io::Result<bool> {
    let Some(path) = &config.file else {
        return Ok(false);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok();

    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_means_no_subscriber() {
        assert!(!init(&LogConfig::default()).unwrap());
    }

    #[test]
    fn creates_missing_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("moodatlas.log");
        let config = LogConfig {
            file: Some(path.clone()),
            filter: "debug".into(),
        };
        init(&config).unwrap();
        assert!(path.exists());
    }
}
