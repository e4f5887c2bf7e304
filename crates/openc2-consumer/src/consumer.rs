//! The consumer facade tying the dispatch pipeline together.
//!
//! Transports hand [`Consumer::process`] raw bytes and the name of their
//! encoding and get back either nothing (no response is owed) or an encoded
//! response envelope. Every failure along the way becomes a response; no
//! error crosses back into transport code.

use std::sync::Arc;

use openc2_config::{Config, ConfigError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatch::{DISPATCH_TARGET, DispatchError, Dispatcher};
use crate::execution::{ExecutionController, Outcome, PoolError};
use crate::handler::Handler;
use crate::message::{CommandMessage, Headers, Response, StatusCode};
use crate::registry::{ActuatorProfile, HandlerRegistryBuilder, RegistryError};
use crate::response::{Clock, ResponseBuilder};
use crate::serialization::{self, Codec, JSON, SerializationRegistry};

/// Last-resort payload used when even the JSON fallback cannot be encoded.
const FALLBACK_PAYLOAD: &[u8] = br#"{"headers":{},"body":{"openc2":{"response":{"status":500}}}}"#;

/// An encoded response ready for a transport to frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Encoded response envelope.
    pub payload: Vec<u8>,
    /// Encoding actually used, which is `json` after a fallback.
    pub encoding: String,
    /// Status carried in the response body.
    pub status: StatusCode,
}

/// Errors raised while assembling a consumer.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A handler could not be registered.
    #[error("handler registration failed: {0}")]
    Registry(#[from] RegistryError),
    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] PoolError),
}

/// Collects handlers and codecs for a [`Consumer`].
///
/// ```
/// use openc2_config::Config;
/// use openc2_consumer::{Command, Consumer, HandlerError, Response};
///
/// # fn main() -> Result<(), openc2_consumer::BuildError> {
/// let consumer = Consumer::builder(Config::default())
///     .register("slpf", "deny", "ipv4_net", |_: &Command| -> Result<Response, HandlerError> {
///         Ok(Response::ok())
///     })?
///     .build()?;
/// assert_eq!(consumer.dispatcher().registry().profiles(), ["slpf".to_owned()]);
/// # Ok(())
/// # }
/// ```
pub struct ConsumerBuilder {
    config: Config,
    registry: HandlerRegistryBuilder,
    serialization: SerializationRegistry,
    clock: Option<Arc<dyn Clock>>,
}

impl ConsumerBuilder {
    fn new(config: Config) -> Self {
        let registry = HandlerRegistryBuilder::new(config.duplicate_policy);
        Self {
            config,
            registry,
            serialization: SerializationRegistry::default(),
            clock: None,
        }
    }

    /// Registers a handler for `(action, target)` under `actuator`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Registry`] when the registry refuses the handler.
    pub fn register(
        mut self,
        actuator: &str,
        action: &str,
        target: &str,
        handler: impl Handler + 'static,
    ) -> Result<Self, BuildError> {
        self.registry.register(actuator, action, target, handler)?;
        Ok(self)
    }

    /// Registers every handler of an actuator profile.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Registry`] when the registry refuses a handler.
    pub fn profile(mut self, profile: ActuatorProfile) -> Result<Self, BuildError> {
        self.registry.register_profile(profile)?;
        Ok(self)
    }

    /// Adds or replaces a codec.
    #[must_use]
    pub fn codec(mut self, name: &str, codec: impl Codec + 'static) -> Self {
        self.serialization.register(name, codec);
        self
    }

    /// Replaces the clock used for `created` timestamps.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validates the configuration, freezes the registry and starts the
    /// worker pool.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] for invalid settings and
    /// [`BuildError::Pool`] when worker threads cannot be started.
    pub fn build(self) -> Result<Consumer, BuildError> {
        self.config.validate()?;
        let execution = ExecutionController::from_config(&self.config.execution)?;
        let dispatcher = Dispatcher::from_config(self.registry.build(), &self.config);
        let mut responses = ResponseBuilder::new(self.config.consumer_id.clone());
        if let Some(clock) = self.clock {
            responses = responses.with_clock(clock);
        }
        info!(
            target: DISPATCH_TARGET,
            consumer_id = %self.config.consumer_id,
            profiles = ?dispatcher.registry().profiles(),
            formats = ?self.serialization.formats().collect::<Vec<_>>(),
            "consumer ready"
        );
        Ok(Consumer {
            config: self.config,
            serialization: self.serialization,
            dispatcher,
            execution,
            responses,
        })
    }
}

impl std::fmt::Debug for ConsumerBuilder {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ConsumerBuilder")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("serialization", &self.serialization)
            .finish_non_exhaustive()
    }
}

/// An OpenC2 consumer: decodes commands, dispatches them and encodes the
/// responses.
///
/// The consumer is immutable once built and can be shared between transport
/// threads behind an [`Arc`].
#[derive(Debug)]
pub struct Consumer {
    config: Config,
    serialization: SerializationRegistry,
    dispatcher: Dispatcher,
    execution: ExecutionController,
    responses: ResponseBuilder,
}

impl Consumer {
    /// Starts building a consumer from `config`.
    #[must_use]
    pub fn builder(config: Config) -> ConsumerBuilder {
        ConsumerBuilder::new(config)
    }

    /// Processes one inbound payload.
    ///
    /// Returns `None` when no response is owed (`response_requested=none`).
    pub fn process(&self, payload: &[u8], encoding: &str) -> Option<Outbound> {
        let encoding = serialization::normalise(encoding);
        let map = match self.serialization.decode(&encoding, payload) {
            Ok(map) => map,
            Err(error) => {
                let error = DispatchError::from(error);
                return Some(self.reject(&error, &Headers::default(), &encoding));
            }
        };

        let headers = CommandMessage::peek_headers(&map).unwrap_or_default();
        let message = match CommandMessage::from_map(map) {
            Ok(message) => message,
            Err(error) => return Some(self.reject(&error.into(), &headers, &encoding)),
        };

        let command = &message.command;
        info!(
            target: DISPATCH_TARGET,
            action = command.action(),
            target_type = command.target_name(),
            actuator = command.actuator_name(),
            request_id = message.headers.request_id.as_deref(),
            encoding = %encoding,
            "received command"
        );

        match self.execution.execute(&self.dispatcher, message.command) {
            Ok(Outcome::Deferred) => {
                debug!(target: DISPATCH_TARGET, "no response requested");
                None
            }
            Ok(Outcome::Acknowledged) => {
                Some(self.respond(Response::new(StatusCode::Processing), &headers, &encoding))
            }
            Ok(Outcome::Completed(response)) => Some(self.respond(response, &headers, &encoding)),
            Err(error) => Some(self.reject(&error, &headers, &encoding)),
        }
    }

    /// Builds the JSON `400` a transport sends when its own framing is
    /// invalid, before any payload reaches the dispatcher.
    #[must_use]
    pub fn malformed_transport(&self, reason: &str) -> Outbound {
        warn!(target: DISPATCH_TARGET, reason, "malformed transport framing");
        let response = Response::new(StatusCode::BadRequest).with_status_text(reason);
        self.respond(response, &Headers::default(), JSON)
    }

    /// Encodes a response body for `request_headers` in `encoding`.
    ///
    /// When encoding fails, the response is replaced by a JSON
    /// `500 Serialization failed` response.
    #[must_use]
    pub fn respond(&self, response: Response, request_headers: &Headers, encoding: &str) -> Outbound {
        let message = self.responses.build(response, request_headers);
        let status = message.response.status();
        let encoded = message
            .to_map()
            .map_err(|error| DispatchError::Encoding {
                message: error.to_string(),
            })
            .and_then(|map| {
                self.serialization
                    .encode(encoding, &map)
                    .map_err(DispatchError::from)
            });
        match encoded {
            Ok(payload) => {
                debug!(
                    target: DISPATCH_TARGET,
                    status = status.code(),
                    encoding,
                    "encoded response"
                );
                Outbound {
                    payload,
                    encoding: serialization::normalise(encoding),
                    status,
                }
            }
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, encoding, "response encoding failed");
                self.json_fallback(&error, request_headers)
            }
        }
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The dispatcher and its registry.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The codecs known to the consumer.
    #[must_use]
    pub const fn serialization(&self) -> &SerializationRegistry {
        &self.serialization
    }

    fn reject(&self, error: &DispatchError, headers: &Headers, encoding: &str) -> Outbound {
        warn!(
            target: DISPATCH_TARGET,
            status = error.status().code(),
            %error,
            "command rejected"
        );
        let encoding = if error.forces_json() { JSON } else { encoding };
        self.respond(error.to_response(), headers, encoding)
    }

    fn json_fallback(&self, error: &DispatchError, headers: &Headers) -> Outbound {
        let message = self.responses.build(error.to_response(), headers);
        let payload = serde_json::to_vec(&message).unwrap_or_else(|_| FALLBACK_PAYLOAD.to_vec());
        Outbound {
            payload,
            encoding: JSON.to_owned(),
            status: error.status(),
        }
    }
}
