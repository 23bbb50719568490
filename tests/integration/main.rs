//! Integration tests for catalog-alt
//!
//! Each module drives the public API end to end against a wiremock catalog.

mod engine_tests;
