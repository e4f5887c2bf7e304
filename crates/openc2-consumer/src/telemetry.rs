//! Log output for processes embedding the consumer.
//!
//! The consumer logs under one target per pipeline stage, listed in
//! [`TARGETS`]. A `log_filter` holding only a level, such as `debug`, applies
//! that level to those targets and keeps every other crate at `warn`. A filter
//! with explicit directives is handed to [`EnvFilter`] unchanged.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use openc2_config::{Config, LogFormat};

use crate::dispatch::DISPATCH_TARGET;
use crate::execution::EXECUTION_TARGET;
use crate::serialization::SERIALIZATION_TARGET;
use crate::transport::TRANSPORT_TARGET;

/// Tracing targets used by the consumer, in pipeline order.
pub const TARGETS: [&str; 4] = [
    SERIALIZATION_TARGET,
    DISPATCH_TARGET,
    EXECUTION_TARGET,
    TRANSPORT_TARGET,
];

const OTHER_CRATES: &str = "warn";

static INSTALLED: OnceCell<TelemetryHandle> = OnceCell::new();

/// Describes the subscriber installed by [`initialise`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryHandle {
    directives: String,
    format: LogFormat,
}

impl TelemetryHandle {
    /// Filter directives in effect.
    #[must_use]
    pub fn directives(&self) -> &str {
        &self.directives
    }

    /// Output format in effect.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The expanded filter could not be parsed.
    #[error("invalid log filter '{directives}': {message}")]
    Filter {
        /// Directives that were rejected.
        directives: String,
        /// Parser message.
        message: String,
    },
    /// Another subscriber already owns the process.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Expands a configured `log_filter` into filter directives.
///
/// ```
/// use openc2_consumer::telemetry::filter_directives;
///
/// assert_eq!(
///     filter_directives("DEBUG"),
///     "warn,openc2_consumer::serialization=debug,openc2_consumer::dispatch=debug,\
///      openc2_consumer::execution=debug,openc2_consumer::transport=debug",
/// );
/// assert_eq!(filter_directives("openc2_consumer=trace"), "openc2_consumer=trace");
/// ```
#[must_use]
pub fn filter_directives(log_filter: &str) -> String {
    let level = log_filter.trim().to_ascii_lowercase();
    if level.is_empty() || level.parse::<LevelFilter>().is_err() {
        return log_filter.trim().to_owned();
    }
    let mut directives = vec![OTHER_CRATES.to_owned()];
    directives.extend(TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

/// Installs the process-wide subscriber described by `config`.
///
/// Only the first call installs anything; later calls return the handle of
/// the subscriber already in place, whatever `config` says.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the expanded filter is invalid and
/// [`TelemetryError::Subscriber`] when a subscriber from elsewhere is already
/// installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED.get_or_try_init(|| install(config)).cloned()
}

fn install(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let handle = TelemetryHandle {
        directives: filter_directives(config.log_filter()),
        format: config.log_format(),
    };
    tracing_subscriber::registry()
        .with(output_layer(handle.format))
        .with(parse_filter(&handle.directives)?)
        .try_init()?;
    info!(
        target: DISPATCH_TARGET,
        directives = %handle.directives,
        format = %handle.format,
        "telemetry initialised"
    );
    Ok(handle)
}

fn parse_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|error| TelemetryError::Filter {
        directives: directives.to_owned(),
        message: error.to_string(),
    })
}

fn output_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339())
        .with_thread_names(true);
    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}
