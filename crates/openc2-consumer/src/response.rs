//! Response envelope construction.

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::message::{Headers, Recipients, Response, ResponseMessage};

/// Source of the `created` timestamp stamped on responses.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Wall-clock time in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        let elapsed = OffsetDateTime::now_utc() - OffsetDateTime::UNIX_EPOCH;
        u64::try_from(elapsed.whole_milliseconds()).unwrap_or_default()
    }
}

/// Wraps response bodies in envelopes addressed back to the requester.
///
/// Every envelope carries `from` set to the consumer identity, `to` set to
/// the request's `from`, the request's `request_id` and a fresh `created`
/// timestamp. Bodies without explicit status text get the canonical sentence
/// for their status.
#[derive(Clone)]
pub struct ResponseBuilder {
    consumer_id: String,
    clock: Arc<dyn Clock>,
}

impl ResponseBuilder {
    /// Creates a builder stamping responses with the system clock.
    #[must_use]
    pub fn new(consumer_id: impl Into<String>) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the envelope answering a request with `request_headers`.
    #[must_use]
    pub fn build(&self, response: Response, request_headers: &Headers) -> ResponseMessage {
        let headers = Headers {
            request_id: request_headers.request_id.clone(),
            created: Some(self.clock.now_millis()),
            from: Some(self.consumer_id.clone()),
            to: request_headers.from.clone().map(Recipients::One),
        };
        ResponseMessage::new(headers, response.with_canonical_text())
    }

    /// The identity placed in `headers.from`.
    #[must_use]
    pub fn consumer_id(&self) -> &str {
        self.consumer_id.as_str()
    }
}

impl fmt::Debug for ResponseBuilder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResponseBuilder")
            .field("consumer_id", &self.consumer_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::message::StatusCode;
    use crate::tests::support::FixedClock;

    fn builder() -> ResponseBuilder {
        ResponseBuilder::new("edge-fw-1").with_clock(Arc::new(FixedClock(1_700_000_000_123)))
    }

    #[rstest]
    fn addresses_the_requester() {
        let request = Headers {
            request_id: Some("r-42".to_owned()),
            created: Some(1),
            from: Some("orchestrator".to_owned()),
            to: Some(Recipients::One("edge-fw-1".to_owned())),
        };
        let message = builder().build(Response::ok(), &request);
        assert_eq!(message.headers.request_id.as_deref(), Some("r-42"));
        assert_eq!(message.headers.from.as_deref(), Some("edge-fw-1"));
        assert_eq!(
            message.headers.to,
            Some(Recipients::One("orchestrator".to_owned()))
        );
        assert_eq!(message.headers.created, Some(1_700_000_000_123));
    }

    #[rstest]
    #[case::processing(StatusCode::Processing)]
    #[case::not_found(StatusCode::NotFound)]
    #[case::unavailable(StatusCode::ServiceUnavailable)]
    fn fills_canonical_text(#[case] status: StatusCode) {
        let message = builder().build(Response::new(status), &Headers::default());
        assert!(message.response.has_explicit_text());
        assert_eq!(message.response.status_text(), status.text());
        assert_eq!(message.headers.to, None);
    }

    #[rstest]
    fn keeps_explicit_text() {
        let message = builder().build(
            Response::ok().with_status_text("rule 7 installed"),
            &Headers::default(),
        );
        assert_eq!(message.response.status_text(), "rule 7 installed");
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
