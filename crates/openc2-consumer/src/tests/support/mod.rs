//! Shared helpers for the consumer test suites.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::handler::{Handler, HandlerError};
use crate::message::{Command, Response};
use crate::response::Clock;

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Handler that counts its invocations and echoes the pair it served.
#[derive(Debug, Clone, Default)]
pub struct CountingHandler {
    calls: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Handler for CountingHandler {
    fn handle(&self, command: &Command) -> Result<Response, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Response::ok().with_status_text(format!(
            "{} {}",
            command.action(),
            command.target_name()
        )))
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

/// Polls `counter` until it reaches `expected` or the wait times out.
pub fn wait_for_count(counter: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while Instant::now() < deadline {
        if counter.load(Ordering::SeqCst) >= expected {
            return true;
        }
        thread::sleep(POLL_INTERVAL);
    }
    counter.load(Ordering::SeqCst) >= expected
}

/// Consumer with an `slpf` profile whose `deny ipv4_connection` handler
/// counts calls, plus handlers that decline and fail.
pub fn consumer(config: openc2_config::Config) -> (crate::Consumer, Arc<AtomicUsize>) {
    let counting = CountingHandler::default();
    let calls = counting.calls();
    let profile = crate::ActuatorProfile::new("slpf")
        .with_handler("deny", "ipv4_connection", counting)
        .with_handler("contain", "device", |_: &Command| -> Result<Response, HandlerError> {
            Err(HandlerError::not_implemented("contain device"))
        })
        .with_handler("delete", "file", |_: &Command| -> Result<Response, HandlerError> {
            Err(HandlerError::failed("file is locked"))
        });
    let consumer = crate::Consumer::builder(config)
        .profile(profile)
        .expect("register profile")
        .clock(Arc::new(FixedClock(1_700_000_000_000)))
        .build()
        .expect("consumer builds");
    (consumer, calls)
}

/// Wraps a command body in a JSON envelope from `producer` with request id
/// `r-1`.
pub fn envelope(request: &serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "headers": { "request_id": "r-1", "from": "producer" },
        "body": { "openc2": { "request": request } }
    }))
    .expect("serialisable envelope")
}

/// Decodes a JSON response payload.
pub fn decode(payload: &[u8]) -> serde_json::Value {
    serde_json::from_slice(payload).expect("response is JSON")
}

/// Extracts `body.openc2.response` from a decoded response envelope.
pub fn response_body(value: &serde_json::Value) -> &serde_json::Value {
    &value["body"]["openc2"]["response"]
}
