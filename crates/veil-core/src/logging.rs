#![forbid(unsafe_code)]

//! Tracing subscriber setup.
//!
//! Library crates only emit `tracing` events; applications and test binaries
//! call [`init_tracing`] once to route them to stderr. The filter is read from
//! `VEIL_LOG`, then `RUST_LOG`, falling back to `info`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "VEIL_LOG";

/// Output format for the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line, for production log shipping.
    Json,
}

/// Build the env filter from `VEIL_LOG`, then `RUST_LOG`, then `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let registry = tracing_subscriber::registry().with(env_filter());
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
}
