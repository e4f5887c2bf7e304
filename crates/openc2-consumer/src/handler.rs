//! The actuator handler interface.
//!
//! A handler implements one action-target pair for one actuator namespace.
//! Closures with the right signature are handlers too:
//!
//! ```
//! use openc2_consumer::{Command, HandlerError, Response};
//!
//! let deny = |command: &Command| -> Result<Response, HandlerError> {
//!     Ok(Response::ok().with_status_text(format!("denied {}", command.target_name())))
//! };
//! # drop(deny);
//! ```

use thiserror::Error;

use crate::message::{Command, Response};

/// Executes a validated command.
pub trait Handler: Send + Sync {
    /// Runs the command and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::NotImplemented`] to decline the command and
    /// [`HandlerError::Failed`] for any other failure.
    fn handle(&self, command: &Command) -> Result<Response, HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&Command) -> Result<Response, HandlerError> + Send + Sync,
{
    fn handle(&self, command: &Command) -> Result<Response, HandlerError> {
        self(command)
    }
}

/// Failures a handler can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler does not support the requested functionality.
    #[error("not implemented: {message}")]
    NotImplemented {
        /// What is unsupported.
        message: String,
    },
    /// The handler failed while executing the command.
    #[error("{message}")]
    Failed {
        /// Failure description.
        message: String,
    },
}

impl HandlerError {
    /// Creates a not-implemented error.
    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented {
            message: message.into(),
        }
    }

    /// Creates a failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
