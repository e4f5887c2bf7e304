//! Handler registry keyed by action, target type and actuator namespace.
//!
//! The registry is assembled once through [`HandlerRegistryBuilder`] and is
//! read-only afterwards, so lookups need no locking. Lookup follows a
//! three-way rule:
//!
//! - no handler for the action-target pair under any namespace yields
//!   [`LookupError::NoMatchingPair`];
//! - without an actuator the first handler registered for the pair wins;
//! - with an actuator that has no handler for the pair the result is
//!   [`LookupError::NoMatchingActuator`].

mod errors;
mod profile;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use openc2_config::DuplicatePolicy;
use tracing::debug;

pub use self::errors::{LookupError, RegistryError};
pub use self::profile::ActuatorProfile;

use crate::dispatch::DISPATCH_TARGET;
use crate::handler::Handler;

/// Action of the built-in features query.
pub const QUERY_ACTION: &str = "query";

/// Target type of the built-in features query.
pub const FEATURES_TARGET: &str = "features";

struct Registration {
    actuator: String,
    handler: Arc<dyn Handler>,
}

/// Collects handler registrations before the registry is frozen.
pub struct HandlerRegistryBuilder {
    policy: DuplicatePolicy,
    registry: HandlerRegistry,
}

impl HandlerRegistryBuilder {
    /// Creates a builder applying the given duplicate policy.
    #[must_use]
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            registry: HandlerRegistry::empty(),
        }
    }

    /// Registers a handler for `(action, target)` under `actuator`.
    ///
    /// Under [`DuplicatePolicy::Overwrite`] a repeated triple replaces the
    /// earlier handler in place, keeping its lookup precedence.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] for blank components,
    /// [`RegistryError::Reserved`] for the features query pair and
    /// [`RegistryError::Duplicate`] for a repeated triple under
    /// [`DuplicatePolicy::Reject`].
    pub fn register(
        &mut self,
        actuator: &str,
        action: &str,
        target: &str,
        handler: impl Handler + 'static,
    ) -> Result<&mut Self, RegistryError> {
        self.insert(actuator, action, target, Arc::new(handler))?;
        Ok(self)
    }

    /// Registers every handler of a profile in declaration order.
    ///
    /// Registration stops at the first failure; handlers registered before it
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] raised by [`Self::register`].
    pub fn register_profile(&mut self, profile: ActuatorProfile) -> Result<&mut Self, RegistryError> {
        let (nsid, handlers) = profile.into_parts();
        for (action, target, handler) in handlers {
            self.insert(&nsid, &action, &target, handler)?;
        }
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        self.registry
    }

    fn insert(
        &mut self,
        actuator: &str,
        action: &str,
        target: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<(), RegistryError> {
        for (field, value) in [("actuator", actuator), ("action", action), ("target", target)] {
            if value.trim().is_empty() {
                return Err(RegistryError::EmptyName { field });
            }
        }
        if action == QUERY_ACTION && target == FEATURES_TARGET {
            return Err(RegistryError::Reserved {
                action: action.to_owned(),
                target: target.to_owned(),
            });
        }

        let registry = &mut self.registry;
        let entries = registry
            .handlers
            .entry((action.to_owned(), target.to_owned()))
            .or_default();
        if let Some(existing) = entries.iter_mut().find(|entry| entry.actuator == actuator) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(RegistryError::Duplicate {
                        actuator: actuator.to_owned(),
                        action: action.to_owned(),
                        target: target.to_owned(),
                    });
                }
                DuplicatePolicy::Overwrite => existing.handler = handler,
            }
        } else {
            entries.push(Registration {
                actuator: actuator.to_owned(),
                handler,
            });
        }

        if !registry.profiles.iter().any(|nsid| nsid == actuator) {
            registry.profiles.push(actuator.to_owned());
        }
        match registry.pairs.iter_mut().find(|(known, _)| known == action) {
            Some((_, targets)) => targets.push(target.to_owned()),
            None => registry
                .pairs
                .push((action.to_owned(), vec![target.to_owned()])),
        }

        debug!(
            target: DISPATCH_TARGET,
            actuator,
            action,
            target_type = target,
            "registered handler"
        );
        Ok(())
    }
}

impl Default for HandlerRegistryBuilder {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl fmt::Debug for HandlerRegistryBuilder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerRegistryBuilder")
            .field("policy", &self.policy)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Immutable handler table shared by the dispatcher.
pub struct HandlerRegistry {
    handlers: HashMap<(String, String), Vec<Registration>>,
    profiles: Vec<String>,
    pairs: Vec<(String, Vec<String>)>,
}

impl HandlerRegistry {
    fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
            profiles: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Starts a builder with the given duplicate policy.
    #[must_use]
    pub fn builder(policy: DuplicatePolicy) -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new(policy)
    }

    /// Resolves the handler for a command.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NoMatchingPair`] when nothing handles the pair
    /// and [`LookupError::NoMatchingActuator`] when the requested namespace
    /// does not.
    pub fn lookup(
        &self,
        action: &str,
        target: &str,
        actuator: Option<&str>,
    ) -> Result<&Arc<dyn Handler>, LookupError> {
        let entries = self
            .handlers
            .get(&(action.to_owned(), target.to_owned()))
            .filter(|entries| !entries.is_empty())
            .ok_or_else(|| LookupError::NoMatchingPair {
                action: action.to_owned(),
                target: target.to_owned(),
            })?;

        let found = match actuator {
            None => entries.first(),
            Some(nsid) => entries.iter().find(|entry| entry.actuator == nsid),
        };
        found
            .map(|entry| &entry.handler)
            .ok_or_else(|| LookupError::NoMatchingActuator {
                actuator: actuator.unwrap_or_default().to_owned(),
            })
    }

    /// Distinct actuator namespaces in first-registration order.
    #[must_use]
    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    /// Action to target-type lists in registration order.
    ///
    /// Target lists are not deduplicated: a pair registered under two
    /// namespaces appears twice.
    #[must_use]
    pub fn pairs(&self) -> &[(String, Vec<String>)] {
        &self.pairs
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerRegistry")
            .field("profiles", &self.profiles)
            .field("pairs", &self.pairs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
