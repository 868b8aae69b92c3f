//! Integration tests for keygate
//!
//! These tests verify the interaction between multiple components
//! against a real in-memory database, without mocking.

pub mod config_tests;
pub mod http_tests;
pub mod verifier_tests;
