use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{self, RollingFileAppender},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::{LoggingConfig, LoggingFormat, LoggingRotation};

const LOG_FILE_PREFIX: &str = "spindle.log";

pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
    run_id: String,
}

impl LoggingGuard {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

/// Installs the global subscriber. Hosts call this once at bootstrap and keep
/// the guard alive for as long as file logging should flush.
pub fn init_tracing(logging_config: &LoggingConfig) -> Result<LoggingGuard> {
    let stderr_layer = match logging_config.format {
        LoggingFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(build_env_filter(&logging_config.filter)?)
            .boxed(),
        LoggingFormat::Json => fmt::layer()
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(false)
            .with_filter(build_env_filter(&logging_config.filter)?)
            .boxed(),
    };

    let (file_layer, worker_guard) = match &logging_config.dir {
        Some(dir) => {
            if dir.as_os_str().is_empty() {
                return Err(anyhow!("logging.dir cannot be empty"));
            }
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create logging directory {}", dir.display()))?;

            let appender = build_rolling_appender(dir, logging_config.rotation);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_current_span(true)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(build_env_filter(&logging_config.filter)?);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    let run_id = Uuid::now_v7().to_string();
    tracing::info!(
        target: "logging",
        run_id = %run_id,
        filter = %logging_config.filter,
        format = ?logging_config.format,
        dir = ?logging_config.dir,
        "logging_initialized"
    );

    Ok(LoggingGuard {
        _worker_guard: worker_guard,
        run_id,
    })
}

fn build_env_filter(filter: &str) -> Result<EnvFilter> {
    if filter.trim().is_empty() {
        return Err(anyhow!("logging.filter cannot be empty"));
    }
    EnvFilter::try_new(filter)
        .with_context(|| format!("failed to parse logging.filter '{}'", filter))
}

fn build_rolling_appender(log_dir: &Path, rotation: LoggingRotation) -> RollingFileAppender {
    match rotation {
        LoggingRotation::Daily => rolling::daily(log_dir, LOG_FILE_PREFIX),
        LoggingRotation::Hourly => rolling::hourly(log_dir, LOG_FILE_PREFIX),
    }
}
