//! Unit tests for handler registration and lookup.

use std::sync::Arc;

use openc2_config::DuplicatePolicy;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::handler::HandlerError;
use crate::message::{Choice, Command, Response};

fn labelled(label: &'static str) -> impl Handler + 'static {
    move |_: &Command| -> Result<Response, HandlerError> { Ok(Response::ok().with_status_text(label)) }
}

fn run(handler: &Arc<dyn Handler>) -> String {
    let command = Command::new("deny", Choice::new("ipv4_net", json!("10.0.0.0/8")));
    let response = handler.handle(&command).expect("handler succeeds");
    response.status_text().to_owned()
}

#[fixture]
fn registry() -> HandlerRegistry {
    let mut builder = HandlerRegistry::builder(DuplicatePolicy::Reject);
    builder
        .register("slpf", "deny", "ipv4_net", labelled("slpf deny"))
        .expect("register")
        .register("x-acme", "deny", "ipv4_net", labelled("acme deny"))
        .expect("register")
        .register("slpf", "allow", "ipv4_net", labelled("slpf allow"))
        .expect("register");
    builder.build()
}

#[rstest]
fn lookup_without_actuator_returns_first_registered(registry: HandlerRegistry) {
    let handler = registry.lookup("deny", "ipv4_net", None).expect("found");
    assert_eq!(run(handler), "slpf deny");
}

#[rstest]
#[case::first("slpf", "slpf deny")]
#[case::second("x-acme", "acme deny")]
fn lookup_with_actuator_returns_that_handler(
    registry: HandlerRegistry,
    #[case] actuator: &str,
    #[case] expected: &str,
) {
    let handler = registry
        .lookup("deny", "ipv4_net", Some(actuator))
        .expect("found");
    assert_eq!(run(handler), expected);
}

#[rstest]
fn unknown_pairs_are_reported(registry: HandlerRegistry) {
    let error = registry
        .lookup("contain", "device", Some("slpf"))
        .err()
        .expect("missing pair");
    assert_eq!(
        error,
        LookupError::NoMatchingPair {
            action: "contain".to_owned(),
            target: "device".to_owned(),
        }
    );
    assert_eq!(error.to_string(), "No matching action-target pair: contain device");
}

#[rstest]
fn unknown_actuators_are_reported(registry: HandlerRegistry) {
    let error = registry
        .lookup("allow", "ipv4_net", Some("x-acme"))
        .err()
        .expect("missing actuator");
    assert_eq!(error.to_string(), "No matching actuator found: x-acme");
}

#[rstest]
fn profiles_and_pairs_follow_registration_order(registry: HandlerRegistry) {
    assert_eq!(registry.profiles(), ["slpf".to_owned(), "x-acme".to_owned()]);
    assert_eq!(
        registry.pairs(),
        [
            (
                "deny".to_owned(),
                vec!["ipv4_net".to_owned(), "ipv4_net".to_owned()]
            ),
            ("allow".to_owned(), vec!["ipv4_net".to_owned()]),
        ]
    );
    assert_eq!(registry.len(), 3);
}

#[test]
fn duplicates_are_rejected_by_default() {
    let mut builder = HandlerRegistryBuilder::default();
    builder
        .register("slpf", "deny", "ipv4_net", labelled("first"))
        .expect("register");
    let error = builder
        .register("slpf", "deny", "ipv4_net", labelled("second"))
        .err()
        .expect("duplicate");
    assert!(matches!(error, RegistryError::Duplicate { .. }));
    let registry = builder.build();
    assert_eq!(run(registry.lookup("deny", "ipv4_net", None).expect("found")), "first");
}

#[test]
fn overwrite_replaces_in_place() {
    let mut builder = HandlerRegistry::builder(DuplicatePolicy::Overwrite);
    builder
        .register("slpf", "deny", "ipv4_net", labelled("first"))
        .expect("register")
        .register("x-acme", "deny", "ipv4_net", labelled("acme"))
        .expect("register")
        .register("slpf", "deny", "ipv4_net", labelled("second"))
        .expect("overwrite");
    let registry = builder.build();
    assert_eq!(run(registry.lookup("deny", "ipv4_net", None).expect("found")), "second");
    assert_eq!(registry.len(), 2);
}

#[rstest]
#[case::reserved("slpf", "query", "features")]
#[case::blank_actuator(" ", "deny", "ipv4_net")]
#[case::blank_action("slpf", "", "ipv4_net")]
#[case::blank_target("slpf", "deny", "")]
fn invalid_registrations_are_refused(
    #[case] actuator: &str,
    #[case] action: &str,
    #[case] target: &str,
) {
    let mut builder = HandlerRegistryBuilder::default();
    assert!(builder.register(actuator, action, target, labelled("x")).is_err());
    assert!(builder.build().is_empty());
}

#[test]
fn profiles_register_all_their_handlers() {
    let profile = ActuatorProfile::new("slpf")
        .with_handler("deny", "ipv4_net", labelled("deny"))
        .with_handler("query", "sbom", labelled("sbom"));
    let mut builder = HandlerRegistryBuilder::default();
    builder.register_profile(profile).expect("register profile");
    let registry = builder.build();
    assert_eq!(registry.profiles(), ["slpf".to_owned()]);
    assert_eq!(
        run(registry.lookup("query", "sbom", Some("slpf")).expect("found")),
        "sbom"
    );
}
