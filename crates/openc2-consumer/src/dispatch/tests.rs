//! Unit tests for routing, invocation and the features query.

use openc2_config::DuplicatePolicy;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::handler::HandlerError;
use crate::message::Command;

fn command(request: Value) -> Command {
    Command::from_value(request).expect("valid command")
}

#[fixture]
fn dispatcher() -> Dispatcher {
    let mut builder = HandlerRegistry::builder(DuplicatePolicy::Reject);
    builder
        .register(
            "slpf",
            "deny",
            "ipv4_connection",
            |command: &Command| -> Result<Response, HandlerError> {
                let port = command
                    .target()
                    .as_object()
                    .and_then(|target| target.get("src_port"))
                    .cloned()
                    .unwrap_or(Value::Null);
                Ok(Response::ok().with_status_text(format!("Denied connection from port {port}")))
            },
        )
        .expect("register")
        .register("slpf", "contain", "device", |_: &Command| -> Result<Response, HandlerError> {
            Err(HandlerError::not_implemented("contain device"))
        })
        .expect("register")
        .register("x-acme", "delete", "file", |_: &Command| -> Result<Response, HandlerError> {
            Err(HandlerError::failed("disk on fire"))
        })
        .expect("register")
        .register("x-acme", "restart", "device", |_: &Command| -> Result<Response, HandlerError> {
            panic!("actuator crashed")
        })
        .expect("register");
    Dispatcher::new(
        builder.build(),
        Features::new(vec!["1.0".to_owned()], 60),
        StatusCode::InternalError,
    )
}

#[rstest]
fn runs_the_resolved_handler(dispatcher: Dispatcher) {
    let response = dispatcher
        .dispatch(&command(json!({
            "action": "deny",
            "target": { "ipv4_connection": { "protocol": "tcp", "src_port": 21 } }
        })))
        .expect("handled");
    assert_eq!(response.status(), StatusCode::Ok);
    assert_eq!(response.status_text(), "Denied connection from port 21");
}

#[rstest]
#[case::unknown_pair(
    json!({ "action": "allow", "target": { "file": {} } }),
    "No matching action-target pair: allow file"
)]
#[case::unknown_actuator(
    json!({ "action": "deny", "target": { "ipv4_connection": {} }, "actuator": { "x-acme": {} } }),
    "No matching actuator found: x-acme"
)]
fn unresolved_commands_are_not_found(
    dispatcher: Dispatcher,
    #[case] request: Value,
    #[case] text: &str,
) {
    let error = dispatcher.dispatch(&command(request)).expect_err("unresolved");
    assert_eq!(error.status(), StatusCode::NotFound);
    assert_eq!(error.to_response().status_text(), text);
}

#[rstest]
#[case::declined(json!({ "action": "contain", "target": { "device": {} } }), StatusCode::NotImplemented)]
#[case::failed(json!({ "action": "delete", "target": { "file": {} } }), StatusCode::InternalError)]
#[case::panicked(json!({ "action": "restart", "target": { "device": {} } }), StatusCode::InternalError)]
fn handler_failures_are_classified(
    dispatcher: Dispatcher,
    #[case] request: Value,
    #[case] status: StatusCode,
) {
    let error = dispatcher.dispatch(&command(request)).expect_err("failure");
    assert_eq!(error.status(), status);
}

#[rstest]
fn panics_report_their_message(dispatcher: Dispatcher) {
    let error = dispatcher
        .dispatch(&command(json!({ "action": "restart", "target": { "device": {} } })))
        .expect_err("panic");
    assert_eq!(error.to_string(), "Actuator failed: actuator crashed");
}

#[test]
fn failure_status_follows_policy() {
    assert_eq!(
        failure_status(HandlerFailureStatus::BadRequest),
        StatusCode::BadRequest
    );
    assert_eq!(
        failure_status(HandlerFailureStatus::InternalError),
        StatusCode::InternalError
    );
}

#[rstest]
fn features_report_requested_descriptors(dispatcher: Dispatcher) {
    let response = dispatcher
        .dispatch(&command(json!({
            "action": "query",
            "target": { "features": ["versions", "profiles", "pairs", "rate_limit"] },
            "args": { "response_requested": "complete" }
        })))
        .expect("answered");
    assert_eq!(response.status(), StatusCode::Ok);
    let results = Value::Object(response.results().cloned().expect("results"));
    assert_eq!(results["versions"], json!(["1.0"]));
    assert_eq!(results["profiles"], json!(["slpf", "x-acme"]));
    assert_eq!(results["rate_limit"], json!(60));
    assert_eq!(results["pairs"]["deny"], json!(["ipv4_connection"]));
    assert_eq!(results["pairs"]["restart"], json!(["device"]));
}

#[rstest]
fn empty_feature_lists_return_no_results(dispatcher: Dispatcher) {
    let response = dispatcher
        .dispatch(&command(json!({ "action": "query", "target": { "features": [] } })))
        .expect("answered");
    assert_eq!(response.status(), StatusCode::Ok);
    assert!(response.results().is_none());
}

#[rstest]
fn only_requested_features_are_returned(dispatcher: Dispatcher) {
    let response = dispatcher
        .dispatch(&command(json!({ "action": "query", "target": { "features": ["rate_limit"] } })))
        .expect("answered");
    let results = response.results().expect("results");
    assert_eq!(results.keys().collect::<Vec<_>>(), vec!["rate_limit"]);
}

#[rstest]
#[case::unknown_feature(
    json!({ "action": "query", "target": { "features": ["uptime"] } }),
    "features field only allows versions, profiles, rate_limit, and pairs"
)]
#[case::not_a_list(
    json!({ "action": "query", "target": { "features": "versions" } }),
    "features must be a list of strings"
)]
#[case::other_args(
    json!({ "action": "query", "target": { "features": [] }, "args": { "duration": 5 } }),
    "Only arg response_requested allowed"
)]
#[case::mixed_args(
    json!({
        "action": "query",
        "target": { "features": [] },
        "args": { "duration": 5, "response_requested": "complete" }
    }),
    "Only arg response_requested allowed"
)]
#[case::null_arg(
    json!({
        "action": "query",
        "target": { "features": [] },
        "args": { "response_requested": "complete", "start_time": null }
    }),
    "Only arg response_requested allowed"
)]
#[case::ack(
    json!({ "action": "query", "target": { "features": [] }, "args": { "response_requested": "ack" } }),
    "Only arg response_requested=complete allowed"
)]
fn features_reject_invalid_queries(
    dispatcher: Dispatcher,
    #[case] request: Value,
    #[case] text: &str,
) {
    let error = dispatcher.dispatch(&command(request)).expect_err("rejected");
    assert_eq!(error.status(), StatusCode::BadRequest);
    assert_eq!(error.to_string(), text);
}
