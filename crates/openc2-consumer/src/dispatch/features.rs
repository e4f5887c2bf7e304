//! The built-in `query features` command.

use serde_json::{Map, Value};

use super::errors::DispatchError;
use crate::message::{Command, Response, ResponseRequested};
use crate::registry::HandlerRegistry;

const VERSIONS: &str = "versions";
const PROFILES: &str = "profiles";
const PAIRS: &str = "pairs";
const RATE_LIMIT: &str = "rate_limit";
const SPECIFIERS: [&str; 4] = [VERSIONS, PROFILES, PAIRS, RATE_LIMIT];
const RESPONSE_REQUESTED: &str = "response_requested";

/// Static descriptors reported alongside the registry-derived features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    versions: Vec<String>,
    rate_limit: u32,
}

impl Features {
    /// Creates the descriptor set.
    #[must_use]
    pub const fn new(versions: Vec<String>, rate_limit: u32) -> Self {
        Self {
            versions,
            rate_limit,
        }
    }

    /// Answers a `query features` command.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BadRequest`] when the command carries any
    /// argument other than `response_requested=complete`, or when the
    /// `features` target is not a list drawn from `versions`, `profiles`,
    /// `pairs` and `rate_limit`.
    pub fn answer(
        &self,
        command: &Command,
        registry: &HandlerRegistry,
    ) -> Result<Response, DispatchError> {
        if let Some(args) = command.args() {
            if args.present_fields() != [RESPONSE_REQUESTED] {
                return Err(DispatchError::bad_request("Only arg response_requested allowed"));
            }
            if args.response_requested() != Some(ResponseRequested::Complete) {
                return Err(DispatchError::bad_request(
                    "Only arg response_requested=complete allowed",
                ));
            }
        }

        let requested = requested_features(command.target().value())?;
        let mut results = Map::new();
        for specifier in SPECIFIERS {
            if !requested.contains(&specifier) {
                continue;
            }
            let value = match specifier {
                VERSIONS => Value::from(self.versions.clone()),
                PROFILES => Value::from(registry.profiles().to_vec()),
                PAIRS => pairs_value(registry),
                _ => Value::from(self.rate_limit),
            };
            results.insert(specifier.to_owned(), value);
        }

        let response = Response::ok();
        if results.is_empty() {
            Ok(response)
        } else {
            Ok(response.with_results(results))
        }
    }
}

fn requested_features(value: &Value) -> Result<Vec<&str>, DispatchError> {
    let not_a_list = || DispatchError::bad_request("features must be a list of strings");
    let items = value.as_array().ok_or_else(not_a_list)?;
    let mut requested = Vec::with_capacity(items.len());
    for item in items {
        let name = item.as_str().ok_or_else(not_a_list)?;
        if !SPECIFIERS.contains(&name) {
            return Err(DispatchError::bad_request(
                "features field only allows versions, profiles, rate_limit, and pairs",
            ));
        }
        requested.push(name);
    }
    Ok(requested)
}

fn pairs_value(registry: &HandlerRegistry) -> Value {
    let pairs: Map<String, Value> = registry
        .pairs()
        .iter()
        .map(|(action, targets)| (action.clone(), Value::from(targets.clone())))
        .collect();
    Value::Object(pairs)
}
