//! Default values shared by the configuration structs.
//!
//! Each default is exposed both as a constant and, where serde needs an owned
//! value, as a function suitable for `#[serde(default = "...")]`.

use crate::logging::LogFormat;

/// Identity placed in the `from` header of every response.
pub const DEFAULT_CONSUMER_ID: &str = "openc2-consumer";

/// OpenC2 language version advertised by `query features`.
pub const DEFAULT_VERSION: &str = "1.0";

/// Requests per minute advertised by `query features`.
pub const DEFAULT_RATE_LIMIT: u32 = 60;

/// Default log filter expression used by the consumer.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Number of background workers used for deferred execution.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Maximum number of deferred jobs waiting for a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Helper threads allowed to run timed handlers at once, counting those
/// still busy after their caller stopped waiting.
pub const DEFAULT_TIMED_HANDLER_LIMIT: usize = 64;

/// Upper bound on a synchronous handler invocation, in milliseconds.
pub const DEFAULT_HANDLER_TIMEOUT_MS: u64 = 30_000;

/// Default HTTP bind host.
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";

/// Default HTTP bind port.
pub const DEFAULT_HTTP_PORT: u16 = 9001;

/// Default MQTT broker host.
pub const DEFAULT_MQTT_HOST: &str = "127.0.0.1";

/// Default MQTT broker port.
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Default MQTT keep-alive interval in seconds.
pub const DEFAULT_MQTT_KEEP_ALIVE: u16 = 300;

/// Topic filter commands are received on.
pub const DEFAULT_COMMAND_TOPIC: &str = "oc2/cmd";

/// Topic responses are published to.
pub const DEFAULT_RESPONSE_TOPIC: &str = "oc2/rsp";

/// Service topic registered on the event bus for request/response traffic.
pub const DEFAULT_SERVICE_TOPIC: &str = "oc2";

/// Default log filter expression used by the consumer.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the consumer.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default versions advertised by the consumer.
#[must_use]
pub fn default_versions() -> Vec<String> {
    vec![DEFAULT_VERSION.to_owned()]
}

/// Owned consumer identity.
#[must_use]
pub fn default_consumer_id() -> String {
    DEFAULT_CONSUMER_ID.to_owned()
}
