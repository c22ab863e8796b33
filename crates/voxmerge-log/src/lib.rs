//! Structured logging for voxmerge.
//!
//! Installs a `tracing` subscriber with console output. The level comes from
//! `RUST_LOG` when set, otherwise from the scene or command line.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor a level is given.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize the tracing subscriber.
///
/// `level` is an `EnvFilter` directive such as `"debug"` or
/// `"info,voxmerge_format=trace"`. `RUST_LOG` takes precedence over it.
/// Calling this more than once is harmless; later calls are ignored.
///
/// # Examples
///
/// ```no_run
/// voxmerge_log::init_logging(None);
/// voxmerge_log::init_logging(Some("debug"));
/// ```
pub fn init_logging(level: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(level));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime())
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

/// Builds the filter for a configured level, falling back to
/// [`DEFAULT_FILTER`] for an empty or unparsable directive.
pub fn filter_for(level: Option<&str>) -> EnvFilter {
    match level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|_| default_env_filter()),
        None => default_env_filter(),
    }
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
