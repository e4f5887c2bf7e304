//! Unit tests for message validation.

use rstest::rstest;
use serde_json::{Map, Value, json};

use super::*;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a map, got {other}"),
    }
}

fn envelope(request: Value) -> Map<String, Value> {
    object(json!({
        "headers": { "request_id": "r-1", "from": "producer" },
        "body": { "openc2": { "request": request } }
    }))
}

#[test]
fn parses_a_complete_command() {
    let message = CommandMessage::from_map(envelope(json!({
        "action": "deny",
        "target": { "ipv4_connection": { "protocol": "tcp", "src_port": 21 } },
        "args": { "response_requested": "complete", "slpf": { "drop_process": "none" } },
        "actuator": { "slpf": {} },
        "command_id": "c-1"
    })))
    .expect("valid command");

    assert_eq!(message.headers.request_id.as_deref(), Some("r-1"));
    assert_eq!(message.headers.from.as_deref(), Some("producer"));
    let command = &message.command;
    assert_eq!(command.action(), "deny");
    assert_eq!(command.target_name(), "ipv4_connection");
    assert_eq!(command.actuator_name(), Some("slpf"));
    assert_eq!(command.command_id(), Some("c-1"));
    assert_eq!(command.response_requested(), Some(ResponseRequested::Complete));
    let args = command.args().expect("args present");
    assert!(args.extension("slpf").is_some());
    assert_eq!(args.set_fields(), vec!["response_requested", "slpf"]);
}

#[rstest]
#[case::empty_action(json!({ "action": "", "target": { "device": {} } }))]
#[case::action_not_string(json!({ "action": 5, "target": { "device": {} } }))]
#[case::missing_action(json!({ "target": { "device": {} } }))]
#[case::missing_target(json!({ "action": "deny" }))]
#[case::empty_target(json!({ "action": "deny", "target": {} }))]
#[case::two_targets(json!({ "action": "deny", "target": { "a": 1, "b": 2 } }))]
#[case::target_not_map(json!({ "action": "deny", "target": "device" }))]
#[case::two_actuators(
    json!({ "action": "deny", "target": { "device": {} }, "actuator": { "a": {}, "b": {} } })
)]
#[case::actuator_value_not_map(
    json!({ "action": "deny", "target": { "device": {} }, "actuator": { "slpf": 3 } })
)]
#[case::empty_args(json!({ "action": "deny", "target": { "device": {} }, "args": {} }))]
#[case::three_time_fields(json!({
    "action": "deny",
    "target": { "device": {} },
    "args": { "response_requested": "ack", "start_time": 1, "stop_time": 2, "duration": 3 }
}))]
#[case::negative_time(
    json!({ "action": "deny", "target": { "device": {} }, "args": { "duration": -5 } })
)]
#[case::unknown_mode(
    json!({ "action": "deny", "target": { "device": {} }, "args": { "response_requested": "later" } })
)]
#[case::extension_not_map(
    json!({ "action": "deny", "target": { "device": {} }, "args": { "slpf": "x" } })
)]
#[case::unknown_command_field(
    json!({ "action": "deny", "target": { "device": {} }, "priority": 1 })
)]
#[case::command_id_not_string(
    json!({ "action": "deny", "target": { "device": {} }, "command_id": 7 })
)]
fn rejects_invalid_commands(#[case] request: Value) {
    let error = CommandMessage::from_map(envelope(request)).expect_err("must be rejected");
    assert!(matches!(error, MessageError::Malformed { .. }));
}

#[test]
fn two_time_fields_are_accepted() {
    let args = Args::from_map(object(json!({ "start_time": 1, "duration": 3 })))
        .expect("two time fields are allowed");
    assert_eq!(args.start_time(), Some(1));
    assert_eq!(args.duration(), Some(3));
    assert_eq!(args.stop_time(), None);
}

#[test]
fn null_args_fields_are_present_but_unset() {
    let args = Args::from_map(object(json!({ "duration": 5, "start_time": null })))
        .expect("one field is set");
    assert_eq!(args.start_time(), None);
    assert_eq!(args.set_fields(), vec!["duration"]);
    assert_eq!(args.present_fields(), vec!["duration", "start_time"]);
}

#[test]
fn null_args_fields_count_as_unset() {
    let error = Args::from_map(object(json!({ "duration": null }))).expect_err("nothing set");
    assert!(matches!(error, MessageError::Malformed { .. }));
}

#[rstest]
#[case::missing_headers(json!({ "body": { "openc2": { "request": {} } } }))]
#[case::missing_body(json!({ "headers": {} }))]
#[case::response_body(json!({
    "headers": {},
    "body": { "openc2": { "response": { "status": 200 } } }
}))]
#[case::unknown_header(json!({
    "headers": { "priority": 1 },
    "body": { "openc2": { "request": { "action": "deny", "target": { "device": {} } } } }
}))]
#[case::unknown_envelope_field(json!({
    "headers": {},
    "body": { "openc2": { "request": { "action": "deny", "target": { "device": {} } } } },
    "signature": "x"
}))]
#[case::extra_body_key(json!({
    "headers": {},
    "body": {
        "openc2": { "request": { "action": "deny", "target": { "device": {} } } },
        "other": {}
    }
}))]
fn rejects_invalid_envelopes(#[case] document: Value) {
    let error = CommandMessage::from_map(object(document)).expect_err("must be rejected");
    assert!(matches!(error, MessageError::Malformed { .. }));
}

#[rstest]
#[case::single(json!("consumer-a"), Recipients::One("consumer-a".to_owned()))]
#[case::list(
    json!(["a", "b"]),
    Recipients::Many(vec!["a".to_owned(), "b".to_owned()])
)]
fn headers_accept_single_or_many_recipients(#[case] to: Value, #[case] expected: Recipients) {
    let message = CommandMessage::from_map(object(json!({
        "headers": { "to": to },
        "body": { "openc2": { "request": { "action": "deny", "target": { "device": {} } } } }
    })))
    .expect("valid envelope");
    assert_eq!(message.headers.to, Some(expected));
}

#[test]
fn peek_headers_survives_invalid_bodies() {
    let map = object(json!({
        "headers": { "request_id": "r-9", "from": "producer" },
        "body": "garbage"
    }));
    let headers = CommandMessage::peek_headers(&map).expect("headers readable");
    assert_eq!(headers.request_id.as_deref(), Some("r-9"));
}

#[test]
fn response_envelope_omits_absent_headers_and_fills_status_text() {
    let headers = Headers {
        request_id: Some("r-1".to_owned()),
        ..Headers::default()
    };
    let message = ResponseMessage::new(headers, Response::new(StatusCode::NotFound));
    let value = serde_json::to_value(&message).expect("serialisable");
    assert_eq!(
        value,
        json!({
            "headers": { "request_id": "r-1" },
            "body": { "openc2": { "response": {
                "status": 404,
                "status_text": StatusCode::NotFound.text()
            } } }
        })
    );
}

#[test]
fn explicit_status_text_and_results_are_kept() {
    let response = Response::ok()
        .with_status_text("denied tcp/21")
        .with_result("rate_limit", json!(60));
    let value = serde_json::to_value(&response).expect("serialisable");
    assert_eq!(
        value,
        json!({ "status": 200, "status_text": "denied tcp/21", "results": { "rate_limit": 60 } })
    );
}

#[test]
fn command_serialises_back_to_its_wire_shape() {
    let request = json!({
        "action": "deny",
        "target": { "ipv4_net": "10.0.0.0/8" },
        "args": { "duration": 500 },
        "actuator": { "slpf": {} }
    });
    let command = Command::from_value(request.clone()).expect("valid command");
    assert_eq!(serde_json::to_value(&command).expect("serialisable"), request);
}

#[rstest]
#[case(102, StatusCode::Processing)]
#[case(200, StatusCode::Ok)]
#[case(400, StatusCode::BadRequest)]
#[case(401, StatusCode::Unauthorized)]
#[case(403, StatusCode::Forbidden)]
#[case(404, StatusCode::NotFound)]
#[case(500, StatusCode::InternalError)]
#[case(501, StatusCode::NotImplemented)]
#[case(503, StatusCode::ServiceUnavailable)]
fn status_codes_map_to_integers(#[case] code: u16, #[case] status: StatusCode) {
    assert_eq!(StatusCode::try_from(code), Ok(status));
    assert_eq!(status.code(), code);
    assert!(status.text().contains(" - "));
}

#[test]
fn unknown_status_codes_are_rejected() {
    assert_eq!(
        StatusCode::try_from(418),
        Err(MessageError::UnknownStatus { code: 418 })
    );
}
