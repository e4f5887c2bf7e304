//! Test suites for the consumer pipeline.

mod lib_api;
pub(crate) mod support;
