//! Structured logging for test runs.
//!
//! Page objects and fixtures emit `tracing` events (`info` for steps and
//! fixture lifecycle, `debug` for individual locator actions). Test binaries
//! call [`init_tracing`] once; repeated calls are no-ops.

use tracing_subscriber::EnvFilter;

/// Filter directive variable, consulted before `RUST_LOG`
pub const LOG_ENV: &str = "STOREFRONT_LOG";

/// Output format variable; `json` switches to one JSON object per line
pub const LOG_FORMAT_ENV: &str = "STOREFRONT_LOG_FORMAT";

/// Output format of the subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// Newline-delimited JSON
    Json,
}

impl LogFormat {
    /// Parse a format name; anything but `json` is pretty
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Filter directives from `STOREFRONT_LOG`, then `RUST_LOG`, then `info`
#[must_use]
pub fn filter_directives<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_ENV)
        .or_else(|| lookup("RUST_LOG"))
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Install the global subscriber from the environment
pub fn init_tracing() {
    let lookup = |key: &str| std::env::var(key).ok();
    let format = lookup(LOG_FORMAT_ENV).map_or(LogFormat::Pretty, |f| LogFormat::from_name(&f));
    init_tracing_with(&filter_directives(lookup), format);
}

/// Install the global subscriber with explicit directives.
///
/// Invalid directives fall back to `info`. A subscriber that is already
/// installed is left in place.
pub fn init_tracing_with(directives: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer();
    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::trace!("tracing subscriber already installed");
    }
}
