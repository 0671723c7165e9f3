//! Logging setup for the runner entrypoint.
//!
//! The entrypoint is short-lived, so everything here happens once: build a
//! [`LoggerConfig`] (usually from `LOG_*` variables) and install it with
//! [`init_logger`] before the first `tracing` macro fires.
mod config;
mod error;
mod logger;
mod object;

pub use config::{LoggerConfig, vars};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerRfc3339};
pub use object::{LoggerTimeZone, init_local_offset};

/// Installs the global tracing subscriber described by `cfg`.
///
/// # Local timezone
/// With [`LoggerTimeZone::Local`], call [`init_local_offset`] first, before any
/// thread is spawned; offset detection is refused in multi-threaded processes on
/// most unix platforms.
///
/// # Examples
/// ```rust
/// use dind_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("logger");
/// tracing::info!("logger initialized");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => logger::logger_text(cfg),
        LoggerFormat::Json => logger::logger_json(cfg),
        LoggerFormat::Journald => logger::logger_journald(cfg),
    }
}
