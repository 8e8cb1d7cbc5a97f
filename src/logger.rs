//! File-based logging using simplelog.
//!
//! The terminal belongs to the UI, so records go to
//! `~/.cache/hn-hiring/hn-hiring.log` unless `log.file` says otherwise.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::config::LogConfig;

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("hn-hiring"))
        .unwrap_or_else(std::env::temp_dir)
        .join("hn-hiring.log")
}

pub fn parse_level(raw: &str) -> LevelFilter {
    raw.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Starts the global logger and returns the file it appends to. `RUST_LOG`
/// wins over the configured level.
pub fn init(cfg: &LogConfig) -> Result<PathBuf> {
    let path = cfg.file.clone().unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }

    let level = std::env::var("RUST_LOG")
        .map(|value| parse_level(&value))
        .unwrap_or_else(|_| parse_level(&cfg.level));

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c)
        .build();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    WriteLogger::init(level, config, file).context("install logger")?;
    log::info!(
        "hn-hiring {} started at {}",
        crate::VERSION,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    Ok(path)
}
