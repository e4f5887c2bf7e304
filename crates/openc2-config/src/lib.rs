//! Shared configuration for the OpenC2 consumer.
//!
//! [`Config`] describes one consumer instance: the identity it stamps on
//! responses, the feature descriptors it advertises through `query features`,
//! how deferred work is scheduled, the two deployment policies (duplicate
//! handler registration and handler failure status), logging, and the
//! settings consumed by the transport bindings.
//!
//! Every struct derives `serde` with field defaults so any serde format can
//! populate a partial configuration. Loading from files or the command line is
//! left to the embedding binary; call [`Config::validate`] once the values are
//! assembled.

mod defaults;
mod logging;
mod policy;
mod transport;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_CONSUMER_ID, DEFAULT_HANDLER_TIMEOUT_MS, DEFAULT_LOG_FILTER, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_RATE_LIMIT, DEFAULT_TIMED_HANDLER_LIMIT, DEFAULT_VERSION, DEFAULT_WORKER_THREADS,
    default_log_filter, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use policy::{DuplicatePolicy, HandlerFailureStatus};
pub use transport::{
    BrokerConfig, HttpConfig, MqttConfig, MqttCredentials, PubSubConfig, TlsConfig, TopicQos,
};

/// Errors reported by [`Config::validate`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The consumer identity is empty.
    #[error("consumer_id must not be empty")]
    EmptyConsumerId,
    /// No OpenC2 language version is advertised.
    #[error("at least one version must be advertised")]
    NoVersions,
    /// The worker pool would have no threads.
    #[error("execution.worker_threads must be at least 1")]
    NoWorkers,
    /// The deferred queue would hold nothing.
    #[error("execution.queue_capacity must be at least 1")]
    NoQueueCapacity,
    /// Timed handlers would have no helper threads.
    #[error("execution.timed_handler_limit must be at least 1")]
    NoTimedHandlers,
    /// A timeout of zero would fail every synchronous command.
    #[error("execution.handler_timeout_ms must be greater than zero when set")]
    ZeroTimeout,
    /// An MQTT topic uses a QoS level other than 1 or 2.
    #[error("topic '{topic}' uses QoS {qos}; QoS must be 1 or 2")]
    InvalidQos {
        /// Offending topic.
        topic: String,
        /// Configured QoS.
        qos: u8,
    },
    /// TLS is enabled without both a certificate and key.
    #[error("{binding} TLS requires both a certfile and a keyfile")]
    IncompleteTls {
        /// Binding whose TLS block is incomplete.
        binding: &'static str,
    },
    /// MQTT credentials are enabled without a username.
    #[error("mqtt credentials are enabled but no username is set")]
    MissingUsername,
}

/// Scheduling settings for handler execution.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Number of background worker threads.
    pub worker_threads: usize,
    /// Maximum queued deferred jobs before submissions are refused.
    pub queue_capacity: usize,
    /// Upper bound on a synchronous handler call; `None` waits indefinitely.
    pub handler_timeout_ms: Option<u64>,
    /// Maximum helper threads running timed handlers, including handlers
    /// that outlived their timeout. Further synchronous commands are refused
    /// until one finishes.
    pub timed_handler_limit: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            handler_timeout_ms: Some(DEFAULT_HANDLER_TIMEOUT_MS),
            timed_handler_limit: DEFAULT_TIMED_HANDLER_LIMIT,
        }
    }
}

impl ExecutionConfig {
    /// Returns the synchronous handler timeout, if any.
    #[must_use]
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::NoQueueCapacity);
        }
        if self.timed_handler_limit == 0 {
            return Err(ConfigError::NoTimedHandlers);
        }
        if self.handler_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Complete configuration for one consumer instance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Identity written to the `from` header of responses.
    pub consumer_id: String,
    /// OpenC2 language versions supported.
    pub versions: Vec<String>,
    /// Maximum requests per minute supported by design or policy.
    pub rate_limit: u32,
    /// Handler scheduling.
    pub execution: ExecutionConfig,
    /// Treatment of duplicate handler registrations.
    pub duplicate_policy: DuplicatePolicy,
    /// Status reported when a handler fails.
    pub handler_failure_status: HandlerFailureStatus,
    /// `tracing` filter expression.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// HTTP binding.
    pub http: HttpConfig,
    /// MQTT binding.
    pub mqtt: MqttConfig,
    /// Pub/sub event bus binding.
    pub pubsub: PubSubConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consumer_id: defaults::default_consumer_id(),
            versions: defaults::default_versions(),
            rate_limit: DEFAULT_RATE_LIMIT,
            execution: ExecutionConfig::default(),
            duplicate_policy: DuplicatePolicy::default(),
            handler_failure_status: HandlerFailureStatus::default(),
            log_filter: defaults::default_log_filter_string(),
            log_format: default_log_format(),
            http: HttpConfig::default(),
            mqtt: MqttConfig::default(),
            pubsub: PubSubConfig::default(),
        }
    }
}

impl Config {
    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Checks the invariants the consumer relies on at startup.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consumer_id.trim().is_empty() {
            return Err(ConfigError::EmptyConsumerId);
        }
        if self.versions.is_empty() {
            return Err(ConfigError::NoVersions);
        }
        self.execution.validate()?;
        self.http.validate()?;
        self.mqtt.validate()
    }
}
