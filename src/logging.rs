// src/logging.rs

//! Logging setup for `swbridge` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SWBRIDGE_LOG` environment variable: a plain level ("debug") or full
//!    `EnvFilter` directives ("info,swbridge::exec=trace")
//! 3. default to `info`
//!
//! Logs go to STDERR. Stdout carries only what the presenter prints.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is not given.
pub const LOG_ENV: &str = "SWBRIDGE_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Initialise the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(level_directive(lvl)),
        None => filter_from_env(std::env::var(LOG_ENV).ok().as_deref()),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("initialising logging: {e}"))?;

    Ok(())
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

/// Filter from the env var value; unusable values fall back to `info`.
fn filter_from_env(value: Option<&str>) -> EnvFilter {
    let directives = match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("warning") => "warn".to_string(),
        Some(v) if !v.is_empty() => v.to_lowercase(),
        _ => DEFAULT_DIRECTIVE.to_string(),
    };

    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
