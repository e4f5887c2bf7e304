//! Settings for the transport bindings that front the consumer.
//!
//! These values are consumed by the adapters that frame messages for HTTP,
//! MQTT, and the pub/sub event bus. The dispatch core never reads them
//! directly.

use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::defaults::{
    DEFAULT_COMMAND_TOPIC, DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, DEFAULT_MQTT_HOST,
    DEFAULT_MQTT_KEEP_ALIVE, DEFAULT_MQTT_PORT, DEFAULT_RESPONSE_TOPIC, DEFAULT_SERVICE_TOPIC,
};

/// Certificate material used when a binding enables TLS.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TlsConfig {
    /// Whether TLS is enabled.
    pub enable: bool,
    /// PEM certificate presented by the consumer.
    pub certfile: Option<String>,
    /// Private key matching `certfile`.
    pub keyfile: Option<String>,
    /// Optional CA bundle used to verify peers.
    pub ca_certs: Option<String>,
}

impl TlsConfig {
    fn validate(&self, binding: &'static str) -> Result<(), ConfigError> {
        if self.enable && (self.certfile.is_none() || self.keyfile.is_none()) {
            return Err(ConfigError::IncompleteTls { binding });
        }
        Ok(())
    }
}

/// HTTP binding settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Host the HTTP listener binds to.
    pub host: String,
    /// Port the HTTP listener binds to.
    pub port: u16,
    /// TLS settings.
    pub tls: TlsConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_owned(),
            port: DEFAULT_HTTP_PORT,
            tls: TlsConfig::default(),
        }
    }
}

impl HttpConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.tls.validate("http")
    }
}

/// Username/password authorisation against the MQTT broker.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MqttCredentials {
    /// Whether credentials are sent.
    pub enable: bool,
    /// Broker username.
    pub username: Option<String>,
    /// Broker password.
    pub password: Option<String>,
}

/// Connection settings for the MQTT broker.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker host.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Client identifier; empty lets the broker assign one.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive: u16,
    /// Username/password authorisation.
    pub credentials: MqttCredentials,
    /// TLS settings.
    pub tls: TlsConfig,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MQTT_HOST.to_owned(),
            port: DEFAULT_MQTT_PORT,
            client_id: String::new(),
            keep_alive: DEFAULT_MQTT_KEEP_ALIVE,
            credentials: MqttCredentials::default(),
            tls: TlsConfig::default(),
        }
    }
}

/// A topic paired with the QoS level used for it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TopicQos {
    /// Topic name or filter.
    pub topic: String,
    /// QoS level; OpenC2 over MQTT requires 1 or 2.
    pub qos: u8,
}

impl TopicQos {
    /// Creates a topic entry.
    #[must_use]
    pub fn new(topic: impl Into<String>, qos: u8) -> Self {
        Self {
            topic: topic.into(),
            qos,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.qos, 1 | 2) {
            Ok(())
        } else {
            Err(ConfigError::InvalidQos {
                topic: self.topic.clone(),
                qos: self.qos,
            })
        }
    }
}

/// MQTT binding settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker connection.
    pub broker: BrokerConfig,
    /// Topics commands arrive on.
    pub subscriptions: Vec<TopicQos>,
    /// Topics responses are published to.
    pub publications: Vec<TopicQos>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            subscriptions: vec![TopicQos::new(DEFAULT_COMMAND_TOPIC, 1)],
            publications: vec![TopicQos::new(DEFAULT_RESPONSE_TOPIC, 1)],
        }
    }
}

impl MqttConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.subscriptions
            .iter()
            .chain(self.publications.iter())
            .try_for_each(TopicQos::validate)?;
        if self.broker.credentials.enable && self.broker.credentials.username.is_none() {
            return Err(ConfigError::MissingUsername);
        }
        self.broker.tls.validate("mqtt")
    }
}

/// Pub/sub event bus binding settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PubSubConfig {
    /// Topic command events arrive on.
    pub event_request_topic: String,
    /// Topic response events are sent to.
    pub event_response_topic: String,
    /// Service topic for request/response exchanges.
    pub service_topic: String,
    /// Client configuration file handed to the bus client library.
    pub client_config: Option<String>,
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            event_request_topic: DEFAULT_COMMAND_TOPIC.to_owned(),
            event_response_topic: DEFAULT_RESPONSE_TOPIC.to_owned(),
            service_topic: DEFAULT_SERVICE_TOPIC.to_owned(),
            client_config: None,
        }
    }
}
