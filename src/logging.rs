//! Tracing setup.
//!
//! The terminal belongs to the UI, so log lines go to a file. Logging stays
//! off unless a level comes from `HTTUI_LOG`, `--verbose` or `[log] level`,
//! checked in that order.

use crate::config::{LogConfig, LOG_ENV_VAR};
use anyhow::{anyhow, Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

/// Dependencies that are too chatty at debug level
const QUIET_TARGETS: &[&str] = &[
    "hyper=warn",
    "hyper_util=warn",
    "reqwest=warn",
    "rustls=warn",
    "tokio=warn",
    "tokio_rustls=warn",
    "h2=warn",
];

/// Pick the filter directive, or `None` to leave logging off
pub fn filter_directive(
    env_value: Option<String>,
    config: &LogConfig,
    verbose: bool,
) -> Option<String> {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Some(value);
    }
    if verbose {
        return Some("debug".to_string());
    }
    config.level.clone().filter(|v| !v.trim().is_empty())
}

pub fn build_filter(directive: &str) -> Result<EnvFilter> {
    let mut filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid log filter '{directive}'"))?;
    for target in QUIET_TARGETS {
        filter = filter.add_directive(target.parse()?);
    }
    Ok(filter)
}

/// Open (creating parents as needed) the log file in append mode
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

pub fn init(config: &LogConfig, verbose: bool) -> Result<()> {
    let Some(directive) = filter_directive(std::env::var(LOG_ENV_VAR).ok(), config, verbose)
    else {
        return Ok(());
    };

    let filter = build_filter(&directive)?;
    let path = shellexpand::tilde(&config.file).to_string();
    let file = open_log_file(Path::new(&path))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(ChronoLocal::rfc_3339())
        .try_init()
        .map_err(|e| anyhow!(e))?;

    tracing::info!(log_file = %path, filter = %directive, "logging initialised");
    Ok(())
}
