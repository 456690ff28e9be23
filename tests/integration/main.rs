//! Integration tests for Sitegauge
//!
//! These tests use wiremock to serve small sites and run discovery,
//! extraction and full audit sessions against them end-to-end.

mod common;
mod discovery_tests;
mod extraction_tests;
mod graph_tests;
mod session_tests;
