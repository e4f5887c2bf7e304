//! Dispatch core for OpenC2 consumers.
//!
//! A consumer receives OpenC2 commands over some transport, routes each one
//! to the handler registered for its action, target type and actuator
//! namespace, and answers with a response envelope. This crate implements
//! that pipeline independently of any particular transport or encoding:
//!
//! ```text
//! bytes -> decode -> validate -> route -> execute -> build response -> encode -> bytes
//! ```
//!
//! - [`message`] defines the envelope schema and its validation;
//! - [`serialization`] maps encoding names (`json`, `cbor`) to codecs;
//! - [`registry`] stores handlers and implements lookup;
//! - [`dispatch`] routes commands and answers `query features` itself;
//! - [`execution`] honours `response_requested` using a bounded worker pool;
//! - [`response`] stamps response envelopes;
//! - [`transport`] holds the HTTP, MQTT and pub/sub binding contracts.
//!
//! [`Consumer`] ties these together:
//!
//! ```
//! use openc2_config::Config;
//! use openc2_consumer::{Command, Consumer, HandlerError, Response, StatusCode};
//!
//! # fn main() -> Result<(), openc2_consumer::BuildError> {
//! let consumer = Consumer::builder(Config::default())
//!     .register("slpf", "deny", "ipv4_net", |command: &Command| -> Result<Response, HandlerError> {
//!         Ok(Response::ok().with_status_text(format!("denied {}", command.target_name())))
//!     })?
//!     .build()?;
//!
//! let request = br#"{"headers":{"request_id":"r-1","from":"producer"},
//!     "body":{"openc2":{"request":{"action":"deny","target":{"ipv4_net":"10.0.0.0/8"}}}}}"#;
//! let reply = consumer.process(request, "json").expect("a response is owed");
//! assert_eq!(reply.status, StatusCode::Ok);
//! # Ok(())
//! # }
//! ```

mod consumer;
pub mod dispatch;
pub mod execution;
mod handler;
pub mod message;
pub mod registry;
pub mod response;
pub mod serialization;
pub mod telemetry;
pub mod transport;

pub use consumer::{BuildError, Consumer, ConsumerBuilder, Outbound};
pub use dispatch::{DispatchError, Dispatcher};
pub use handler::{Handler, HandlerError};
pub use message::{
    Args, Choice, Command, CommandMessage, Headers, MessageError, Recipients, Response,
    ResponseMessage, ResponseRequested, StatusCode,
};
pub use registry::{ActuatorProfile, HandlerRegistry, HandlerRegistryBuilder, RegistryError};
pub use serialization::{Codec, SerializationError, SerializationRegistry};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
