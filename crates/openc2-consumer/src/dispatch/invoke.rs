//! Guarded handler invocation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use crate::handler::{Handler, HandlerError};
use crate::message::{Command, Response, StatusCode};

/// Runs a handler, converting errors and panics into [`DispatchError`].
///
/// Failures and panics are reported with `failure_status`; an explicit
/// [`HandlerError::NotImplemented`] becomes
/// [`DispatchError::NotImplemented`].
pub(crate) fn invoke(
    handler: &dyn Handler,
    command: &Command,
    failure_status: StatusCode,
) -> Result<Response, DispatchError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(command)));
    let error = match outcome {
        Ok(Ok(response)) => return Ok(response),
        Ok(Err(HandlerError::NotImplemented { message })) => {
            DispatchError::NotImplemented { message }
        }
        Ok(Err(HandlerError::Failed { message })) => {
            DispatchError::handler_failure(message, failure_status)
        }
        Err(payload) => DispatchError::handler_failure(panic_message(payload.as_ref()), failure_status),
    };
    warn!(
        target: DISPATCH_TARGET,
        action = command.action(),
        target_type = command.target_name(),
        actuator = command.actuator_name(),
        %error,
        "handler failed"
    );
    Err(error)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("handler panicked")
    }
}
