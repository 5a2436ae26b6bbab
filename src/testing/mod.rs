//! Test-support utilities shared by unit tests, integration tests and the
//! CLI harness tests.
//!
//! Everything here is deterministic: noise generators take an explicit seed
//! so fingerprints computed from them are reproducible across runs.

pub mod signals;
