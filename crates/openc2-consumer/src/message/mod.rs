//! OpenC2 message schema and validation.
//!
//! Inbound payloads are decoded into generic maps by the serialization layer
//! and validated here into typed [`CommandMessage`] values. Validation is
//! total: every malformed input yields a [`MessageError`], which the
//! dispatcher turns into a `400` response.
//!
//! ```json
//! {"headers":{"request_id":"r1","from":"producer"},
//!  "body":{"openc2":{"request":{"action":"deny","target":{"ipv4_net":"10.0.0.0/8"}}}}}
//! ```

mod choice;
mod command;
mod envelope;
mod errors;
mod response;
mod status;

pub use self::choice::Choice;
pub use self::command::{Args, Command, ResponseRequested};
pub use self::envelope::{CommandMessage, Headers, Recipients, ResponseMessage};
pub use self::errors::MessageError;
pub use self::response::Response;
pub use self::status::StatusCode;

#[cfg(test)]
mod tests;
