//! Logging setup and span constructors.

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

use crate::config::ClientOptions;
use crate::error::ClientError;

/// File name of the status log inside `options.log_dir`.
pub const STATUS_LOG: &str = "status.log";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. With `options.logging` the
/// output goes to `<log_dir>/status.log` (appended) instead of stdout, and the
/// returned guard must be held until exit so buffered lines are flushed.
pub fn init(options: &ClientOptions) -> Result<Option<WorkerGuard>, ClientError> {
    let default_level = if options.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let (installed, guard) = if options.logging {
        let (writer, guard) = status_log_writer(options)?;
        let installed = if options.json_logs {
            builder.json().with_writer(writer).try_init()
        } else {
            builder.with_ansi(false).with_writer(writer).try_init()
        };
        (installed, Some(guard))
    } else if options.json_logs {
        (builder.json().try_init(), None)
    } else {
        (builder.try_init(), None)
    };

    installed.map_err(|e| ClientError::Telemetry(e.to_string()))?;
    Ok(guard)
}

/// Non-blocking writer appending to `<log_dir>/status.log`.
pub fn status_log_writer(
    options: &ClientOptions,
) -> Result<(NonBlocking, WorkerGuard), ClientError> {
    std::fs::create_dir_all(&options.log_dir)?;
    let appender = tracing_appender::rolling::never(&options.log_dir, STATUS_LOG);
    Ok(tracing_appender::non_blocking(appender))
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span covering one connection attempt of a session.
    pub fn session(host: &str, port: u16) -> Span {
        info_span!("session", host = %host, port = port)
    }
}
