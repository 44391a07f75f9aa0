use playbridge_core::config::LoggingConfig;
use playbridge_core::BridgeConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Logs go to stderr, never stdout, which
/// carries the messaging frames; the browser shows host stderr in its
/// console.
///
/// The returned guard flushes the file writer when dropped and must be
/// held until exit.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut file_error = None;
    let (file_layer, guard) = if config.file {
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix("playbridge")
            .filename_suffix("log")
            .build(BridgeConfig::log_dir());
        match appender {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                file_error = Some(e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!(error = %e, "Cannot open log file, logging to stderr only");
    }
    guard
}
