//! OpenTix Integration Tests
//!
//! These tests run against a deployed API stage:
//! - `OPENTIX_API_URL`: base URL of the stage
//! - `OPENTIX_TOKEN`: bearer token of a test wallet (vendor tests only)
//!
//! Both may also come from a `.env` file. Tests skip themselves when unset.
//!
//! Run with: cargo test --package opentix-integration-tests

pub mod client;

pub use client::OpentixClient;
pub use fixtures::*;
