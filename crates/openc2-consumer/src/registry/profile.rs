//! Grouping of handlers under one actuator namespace.

use std::fmt;
use std::sync::Arc;

use crate::handler::Handler;

/// A set of action-target handlers sharing an actuator namespace.
///
/// ```
/// use openc2_consumer::{ActuatorProfile, Command, HandlerError, Response};
///
/// let profile = ActuatorProfile::new("slpf")
///     .with_handler("deny", "ipv4_net", |_: &Command| -> Result<Response, HandlerError> {
///         Ok(Response::ok())
///     });
/// assert_eq!(profile.nsid(), "slpf");
/// assert_eq!(profile.len(), 1);
/// ```
#[derive(Clone)]
pub struct ActuatorProfile {
    nsid: String,
    handlers: Vec<(String, String, Arc<dyn Handler>)>,
}

impl ActuatorProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new(nsid: impl Into<String>) -> Self {
        Self {
            nsid: nsid.into(),
            handlers: Vec::new(),
        }
    }

    /// Adds a handler for an action-target pair.
    #[must_use]
    pub fn with_handler(
        mut self,
        action: impl Into<String>,
        target: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Self {
        self.add(action, target, handler);
        self
    }

    /// Adds a handler for an action-target pair in place.
    pub fn add(
        &mut self,
        action: impl Into<String>,
        target: impl Into<String>,
        handler: impl Handler + 'static,
    ) {
        self.handlers
            .push((action.into(), target.into(), Arc::new(handler)));
    }

    /// The actuator namespace.
    #[must_use]
    pub fn nsid(&self) -> &str {
        self.nsid.as_str()
    }

    /// Number of handlers in the profile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when the profile holds no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<(String, String, Arc<dyn Handler>)>) {
        (self.nsid, self.handlers)
    }
}

impl fmt::Debug for ActuatorProfile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<_> = self
            .handlers
            .iter()
            .map(|(action, target, _)| format!("{action} {target}"))
            .collect();
        formatter
            .debug_struct("ActuatorProfile")
            .field("nsid", &self.nsid)
            .field("pairs", &pairs)
            .finish()
    }
}
