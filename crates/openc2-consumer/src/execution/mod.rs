//! Response-mode driven execution of resolved commands.
//!
//! `args.response_requested` decides how a handler runs:
//!
//! - `none`: queued on the worker pool, nothing is returned;
//! - `ack`: queued on the worker pool, `102 Processing` is returned at once;
//! - `status`, `complete` or unset: run before returning the real result.
//!
//! The handler's eventual result for `none` and `ack` is only logged; it is
//! never delivered to the producer. Synchronous handlers run on a helper
//! thread when a timeout is configured so that a hung handler cannot hold the
//! requester forever. Helper threads are capped: a handler that outlives its
//! timeout keeps its slot until it returns, and once every slot is taken
//! synchronous commands are refused with `503`.

mod helpers;
mod pool;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, bounded};
use openc2_config::{DEFAULT_TIMED_HANDLER_LIMIT, ExecutionConfig};
use tracing::{debug, info, warn};

pub use self::pool::{PoolError, WorkerPool};

use self::helpers::HelperLimit;

use crate::dispatch::{DispatchError, Dispatcher, Route, invoke};
use crate::handler::Handler;
use crate::message::{Command, Response, ResponseRequested, StatusCode};

/// Tracing target for execution operations.
pub(crate) const EXECUTION_TARGET: &str = module_path!();

/// What the controller did with a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Queued; no response is owed.
    Deferred,
    /// Queued; a `102 Processing` response is owed.
    Acknowledged,
    /// Executed; the response body is ready.
    Completed(Response),
}

/// Runs resolved commands according to their requested response mode.
#[derive(Debug)]
pub struct ExecutionController {
    pool: WorkerPool,
    timeout: Option<Duration>,
    helpers: HelperLimit,
}

impl ExecutionController {
    /// Creates a controller over an existing pool, allowing
    /// [`DEFAULT_TIMED_HANDLER_LIMIT`] helper threads for timed handlers.
    #[must_use]
    pub fn new(pool: WorkerPool, timeout: Option<Duration>) -> Self {
        Self {
            pool,
            timeout,
            helpers: HelperLimit::new(DEFAULT_TIMED_HANDLER_LIMIT),
        }
    }

    /// Replaces the cap on helper threads running timed handlers.
    #[must_use]
    pub fn with_helper_limit(mut self, limit: usize) -> Self {
        self.helpers = HelperLimit::new(limit);
        self
    }

    /// Starts a pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if a worker cannot be started.
    pub fn from_config(config: &ExecutionConfig) -> Result<Self, PoolError> {
        let pool = WorkerPool::new(config.worker_threads, config.queue_capacity)?;
        Ok(Self::new(pool, config.handler_timeout())
            .with_helper_limit(config.timed_handler_limit))
    }

    /// Routes and executes a validated command.
    ///
    /// Routing failures and the built-in features query are always answered
    /// synchronously, whatever response mode was requested.
    ///
    /// # Errors
    ///
    /// Returns the routing or handler [`DispatchError`], or
    /// [`DispatchError::Saturated`] when the pool refuses a background job or
    /// every helper thread for timed handlers is busy.
    pub fn execute(
        &self,
        dispatcher: &Dispatcher,
        command: Command,
    ) -> Result<Outcome, DispatchError> {
        let handler = match dispatcher.route(&command)? {
            Route::Features => return dispatcher.query_features(&command).map(Outcome::Completed),
            Route::Handler(handler) => handler,
        };
        let failure_status = dispatcher.failure_status();

        match command.response_requested() {
            Some(ResponseRequested::None) => {
                self.submit(handler, command, failure_status)?;
                Ok(Outcome::Deferred)
            }
            Some(ResponseRequested::Ack) => {
                self.submit(handler, command, failure_status)?;
                Ok(Outcome::Acknowledged)
            }
            Some(ResponseRequested::Status | ResponseRequested::Complete) | None => self
                .run_sync(handler, command, failure_status)
                .map(Outcome::Completed),
        }
    }

    /// The worker pool.
    #[must_use]
    pub const fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Number of helper threads still running timed handlers.
    #[must_use]
    pub fn timed_handlers(&self) -> usize {
        self.helpers.active()
    }

    fn submit(
        &self,
        handler: Arc<dyn Handler>,
        command: Command,
        failure_status: StatusCode,
    ) -> Result<(), DispatchError> {
        let job = move || match invoke(handler.as_ref(), &command, failure_status) {
            Ok(response) => info!(
                target: EXECUTION_TARGET,
                action = command.action(),
                target_type = command.target_name(),
                status = response.status().code(),
                "background command finished"
            ),
            Err(error) => warn!(
                target: EXECUTION_TARGET,
                action = command.action(),
                target_type = command.target_name(),
                %error,
                "background command failed"
            ),
        };
        self.pool.submit(job).map_err(|error| {
            warn!(target: EXECUTION_TARGET, %error, "rejected background command");
            DispatchError::Saturated {
                message: error.to_string(),
            }
        })
    }

    fn run_sync(
        &self,
        handler: Arc<dyn Handler>,
        command: Command,
        failure_status: StatusCode,
    ) -> Result<Response, DispatchError> {
        let Some(after) = self.timeout else {
            return invoke(handler.as_ref(), &command, failure_status);
        };

        let Some(slot) = self.helpers.acquire() else {
            let limit = self.helpers.limit();
            warn!(target: EXECUTION_TARGET, limit, "timed handler limit reached");
            return Err(DispatchError::Saturated {
                message: format!("{limit} timed handlers are still running"),
            });
        };

        let (sender, receiver) = bounded(1);
        thread::Builder::new()
            .name(String::from("openc2-handler"))
            .spawn(move || {
                let _slot = slot;
                let result = invoke(handler.as_ref(), &command, failure_status);
                if sender.send(result).is_err() {
                    debug!(target: EXECUTION_TARGET, "handler finished after its deadline");
                }
            })
            .map_err(|error| DispatchError::Saturated {
                message: format!("failed to spawn handler thread: {error}"),
            })?;

        match receiver.recv_timeout(after) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    target: EXECUTION_TARGET,
                    timeout_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
                    "handler timed out"
                );
                Err(DispatchError::Timeout { after })
            }
            Err(RecvTimeoutError::Disconnected) => Err(DispatchError::handler_failure(
                "handler thread exited without a result",
                failure_status,
            )),
        }
    }
}
