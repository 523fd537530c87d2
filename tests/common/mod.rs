//! Shared test utilities for integration tests

pub mod fixtures;
