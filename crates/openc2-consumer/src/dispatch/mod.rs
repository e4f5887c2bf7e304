//! Command routing and the built-in features query.
//!
//! The [`Dispatcher`] owns the frozen [`HandlerRegistry`] and resolves each
//! validated command to a [`Route`]:
//!
//! - `query` with a `features` target is always answered by the consumer
//!   itself and cannot be overridden by a registered handler;
//! - every other command is resolved through [`HandlerRegistry::lookup`].
//!
//! Handler failures never escape: [`Dispatcher::invoke`] catches errors and
//! panics and classifies them as [`DispatchError`] values.

mod errors;
mod features;
mod invoke;

use std::sync::Arc;

use openc2_config::{Config, HandlerFailureStatus};
use tracing::debug;

pub use self::errors::DispatchError;
pub use self::features::Features;

pub(crate) use self::invoke::invoke;

use crate::handler::Handler;
use crate::message::{Command, Response, StatusCode};
use crate::registry::{FEATURES_TARGET, HandlerRegistry, QUERY_ACTION};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = module_path!();

/// Where a command is sent.
#[derive(Clone)]
pub enum Route {
    /// The built-in `query features` responder.
    Features,
    /// A registered handler.
    Handler(Arc<dyn Handler>),
}

impl std::fmt::Debug for Route {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Features => formatter.write_str("Features"),
            Self::Handler(_) => formatter.write_str("Handler(..)"),
        }
    }
}

/// Maps the configured handler failure policy to a status code.
#[must_use]
pub const fn failure_status(policy: HandlerFailureStatus) -> StatusCode {
    match policy {
        HandlerFailureStatus::InternalError => StatusCode::InternalError,
        HandlerFailureStatus::BadRequest => StatusCode::BadRequest,
    }
}

/// Routes validated commands to handlers.
#[derive(Debug)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    features: Features,
    failure_status: StatusCode,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(
        registry: HandlerRegistry,
        features: Features,
        failure_status: StatusCode,
    ) -> Self {
        Self {
            registry,
            features,
            failure_status,
        }
    }

    /// Creates a dispatcher using the feature descriptors and failure policy
    /// from `config`.
    #[must_use]
    pub fn from_config(registry: HandlerRegistry, config: &Config) -> Self {
        Self::new(
            registry,
            Features::new(config.versions.clone(), config.rate_limit),
            failure_status(config.handler_failure_status),
        )
    }

    /// Resolves the route for a command.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoMatchingPair`] or
    /// [`DispatchError::NoMatchingActuator`] when no handler applies.
    pub fn route(&self, command: &Command) -> Result<Route, DispatchError> {
        if command.action() == QUERY_ACTION && command.target_name() == FEATURES_TARGET {
            debug!(target: DISPATCH_TARGET, "routing to built-in query features");
            return Ok(Route::Features);
        }
        let handler = self.registry.lookup(
            command.action(),
            command.target_name(),
            command.actuator_name(),
        )?;
        debug!(
            target: DISPATCH_TARGET,
            action = command.action(),
            target_type = command.target_name(),
            actuator = command.actuator_name(),
            "resolved handler"
        );
        Ok(Route::Handler(Arc::clone(handler)))
    }

    /// Answers the built-in `query features` command.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BadRequest`] for disallowed arguments or
    /// feature names.
    pub fn query_features(&self, command: &Command) -> Result<Response, DispatchError> {
        self.features.answer(command, &self.registry)
    }

    /// Runs a resolved handler on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NotImplemented`] when the handler declines
    /// and [`DispatchError::HandlerFailure`] when it fails or panics.
    pub fn invoke(&self, handler: &dyn Handler, command: &Command) -> Result<Response, DispatchError> {
        invoke(handler, command, self.failure_status)
    }

    /// Routes and runs a command synchronously.
    ///
    /// # Errors
    ///
    /// Returns any error raised by [`Self::route`], [`Self::query_features`]
    /// or [`Self::invoke`].
    pub fn dispatch(&self, command: &Command) -> Result<Response, DispatchError> {
        match self.route(command)? {
            Route::Features => self.query_features(command),
            Route::Handler(handler) => self.invoke(handler.as_ref(), command),
        }
    }

    /// The handler registry.
    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Status reported for handler failures.
    #[must_use]
    pub const fn failure_status(&self) -> StatusCode {
        self.failure_status
    }
}

#[cfg(test)]
mod tests;
