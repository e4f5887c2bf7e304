//! Transport binding contracts.
//!
//! Each binding validates its framing metadata, derives the payload encoding
//! and hands the payload to [`Consumer::process`](crate::Consumer::process).
//! The functions here perform no network I/O; servers and broker clients
//! call them and send what they return.

mod errors;
pub mod http;
pub mod mqtt;
pub mod pubsub;

pub use self::errors::BindingError;

/// Tracing target for transport bindings.
pub(crate) const TRANSPORT_TARGET: &str = module_path!();
