use std::io;
use tracing::dispatcher::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::{fmt, registry};

use crate::config::Config;
use crate::io::resolve_path;

// Keeps the logging set up as long as it is alive. Dropping it flushes the log file.
#[allow(dead_code)]
pub struct LogGuards {
    log_guard: Option<WorkerGuard>,
    default: DefaultGuard,
}

pub fn init_std_out_logging_thread_local() -> DefaultGuard {
    let collector = tracing_subscriber::registry().with(
        fmt::Layer::new()
            .with_writer(io::stdout)
            .with_filter(LevelFilter::INFO),
    );
    tracing::subscriber::set_default(collector)
}

/// Console output at INFO level plus, if an output directory and a log level are configured, a
/// json log file in the output directory.
pub fn init_logging(config: &Config) -> LogGuards {
    let output = config.output();

    let (log_layer, log_guard) = match (output.output_dir, output.logging.level()) {
        (Some(output_dir), Some(level)) => {
            let dir = resolve_path(config.context(), &output_dir);
            let log_file_appender = rolling::never(dir, "log.txt");
            let (log_file, log_guard) = non_blocking(log_file_appender);
            let layer = fmt::Layer::new()
                .with_writer(log_file)
                .json()
                .with_ansi(false)
                .with_filter(LevelFilter::from_level(level));
            (Some(layer), Some(log_guard))
        }
        _ => (None, None),
    };

    let console_layer = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(LevelFilter::INFO);

    // `None` layers are simply not added
    let collector = registry().with(log_layer).with(console_layer);
    let default = tracing::subscriber::set_default(collector);

    LogGuards { log_guard, default }
}
