//! Tests that exercise the crate's public re-exports.

use std::sync::Arc;
use std::thread;

use openc2_config::{Config, DuplicatePolicy};
use rstest::rstest;
use serde_json::json;

use super::support::{consumer, decode, envelope, response_body};
use crate::{
    ActuatorProfile, Command, Consumer, HandlerError, HandlerRegistry, RegistryError, Response,
    StatusCode,
};

fn ok(_: &Command) -> Result<Response, HandlerError> {
    Ok(Response::ok())
}

#[rstest]
fn builder_reexport_registers_profiles() {
    let consumer = Consumer::builder(Config::default())
        .profile(ActuatorProfile::new("slpf").with_handler("deny", "ipv4_net", ok))
        .expect("profile registers")
        .register("x-acme", "scan", "device", ok)
        .expect("handler registers")
        .build()
        .expect("consumer builds");
    assert_eq!(
        consumer.dispatcher().registry().profiles(),
        ["slpf".to_owned(), "x-acme".to_owned()]
    );
}

#[rstest]
fn registry_reexport_rejects_duplicates() {
    let mut builder = HandlerRegistry::builder(DuplicatePolicy::Reject);
    builder
        .register("slpf", "deny", "ipv4_net", ok)
        .expect("first registration");
    let error = builder
        .register("slpf", "deny", "ipv4_net", ok)
        .expect_err("duplicate");
    assert!(matches!(error, RegistryError::Duplicate { .. }));
}

#[rstest]
fn consumer_is_shareable_between_transport_threads() {
    let (consumer, _) = consumer(Config::default());
    let consumer = Arc::new(consumer);
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let consumer = Arc::clone(&consumer);
            thread::spawn(move || {
                let request = json!({ "action": "deny", "target": { "ipv4_connection": {} } });
                consumer
                    .process(&envelope(&request), "json")
                    .map(|reply| reply.status)
            })
        })
        .collect();
    for worker in workers {
        let status = worker.join().expect("worker thread");
        assert_eq!(status, Some(StatusCode::Ok));
    }
}

#[rstest]
fn respond_reexport_encodes_handler_responses() {
    let (consumer, _) = consumer(Config::default());
    let headers = crate::Headers {
        request_id: Some("r-7".to_owned()),
        from: Some("producer".to_owned()),
        ..crate::Headers::default()
    };
    let reply = consumer.respond(
        Response::ok().with_result("rate_limit", json!(60)),
        &headers,
        "json",
    );
    let value = decode(&reply.payload);
    assert_eq!(value["headers"]["request_id"], json!("r-7"));
    assert_eq!(response_body(&value)["results"]["rate_limit"], json!(60));
}
