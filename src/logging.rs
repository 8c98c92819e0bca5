//! Tracing setup.

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Default filter directive for a `-v` count.
pub fn verbosity_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr and, when `log_dir` is set, to a daily rotated file in
/// it. `RUST_LOG` overrides `verbosity`.
pub fn init_tracing(
    verbosity: u8,
    log_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity_level(verbosity)))
    };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter());

    let file = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("cron2mqtt")
                .filename_suffix("log")
                .max_log_files(14)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = GUARD.set(guard);
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        assert_eq!(verbosity_level(0), "warn");
        assert_eq!(verbosity_level(1), "info");
        assert_eq!(verbosity_level(2), "debug");
        assert_eq!(verbosity_level(3), "trace");
        assert_eq!(verbosity_level(9), "trace");
    }
}
