use std::io;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::Logging;

/// Console only logging. Respects `RUST_LOG` and falls back to INFO. Calling it more than once
/// is harmless, which is convenient in tests.
pub fn init_std_out_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(io::stdout)
                .with_filter(filter),
        )
        .try_init();
}

/// Writes a log file named `file_name` into `directory` at the configured level and duplicates
/// INFO and above to stdout. Keep the returned guard alive until the program exits, otherwise
/// buffered log lines are lost.
///
/// `Logging::None` only turns off the log file. Console output then falls back to
/// [init_std_out_logging], and no guard is returned.
pub fn init_logging(directory: &Path, file_name: &str, level: Logging) -> Option<WorkerGuard> {
    if level == Logging::None {
        init_std_out_logging();
        return None;
    }

    let log_file = rolling::never(directory, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(log_file);

    let collector = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(LevelFilter::from(level)),
        )
        .with(
            fmt::Layer::new()
                .with_writer(io::stdout)
                .with_filter(LevelFilter::INFO),
        );
    if collector.try_init().is_err() {
        tracing::warn!("A global collector was already set. Not logging to {directory:?}");
    }
    Some(guard)
}
