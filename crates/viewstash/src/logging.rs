//! Tracing setup for hosts that do not install their own subscriber.
//!
//! Console output goes to stderr, human-readable or JSON. When a log
//! directory is configured, a daily-rolling JSON file is written as well
//! through a non-blocking writer; keep the returned guard alive for as long
//! as the file should receive events.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};
use viewstash_config::LoggingConfig;
use viewstash_config::defaults::LOG_FILE_PREFIX;

use crate::{Error, Result};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber described by `config`.
///
/// Fails if a global subscriber is already set or a filter does not parse.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console_filter = parse_filter(&config.filter)?;
    let console: BoxedLayer = if config.json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let mut layers = vec![console];
    let mut guard = None;

    if let Some(ref dir) = config.directory {
        let file_filter = parse_filter(&config.file_filter)?;
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, worker) = tracing_appender::non_blocking(appender);
        layers.push(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
        guard = Some(worker);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(guard)
}

fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| Error::Logging(format!("invalid filter '{directives}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = LoggingConfig {
            filter: "viewstash=loudest".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init(&config), Err(Error::Logging(_))));
    }

    #[test]
    fn test_init_with_file_then_reinit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: Some(dir.path().to_path_buf()),
            ..LoggingConfig::default()
        };

        let guard = init(&config).unwrap();
        assert!(guard.is_some());
        tracing::info!(target: "viewstash", "logging initialized");

        let again = init(&LoggingConfig::default());
        assert!(matches!(again, Err(Error::Logging(_))));
    }
}
