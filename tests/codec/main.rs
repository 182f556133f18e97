//! Integration tests for the codec.
//!
//! These tests go through the public API only: build a file, serialize it,
//! parse it back. Unit tests in crates/*/src cover the separator codec,
//! record assemblers and layouts in isolation.

#[path = "../common/mod.rs"]
mod common;

mod annotations;
mod binary_records;
mod json_interchange;
mod manifest_invariant;
mod overrides;
mod roundtrip;
mod scenarios;
