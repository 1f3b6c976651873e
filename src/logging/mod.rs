//! Logging: tracing setup plus a per-run job logger.

mod job_logger;
mod types;

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use job_logger::JobLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`; falls back to the given default directive.
/// When `log_dir` is provided, also writes daily-rotated log files and
/// returns a guard that must be kept alive for the file writer to flush.
pub fn init_tracing(default_directive: &str, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "teaser_core.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
            None
        }
    }
}
