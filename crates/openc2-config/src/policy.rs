//! Behavioural policies that differ between deployments.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the handler registry treats a second registration of the same
/// `(actuator, action, target)` triple.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DuplicatePolicy {
    /// Refuse the registration with a conflict error.
    #[default]
    Reject,
    /// Replace the earlier handler; the last registration wins.
    Overwrite,
}

/// Status reported when a handler fails unexpectedly.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HandlerFailureStatus {
    /// Report `500 Internal Error`.
    #[default]
    InternalError,
    /// Report `400 Bad Request`.
    BadRequest,
}
