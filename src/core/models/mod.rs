//! Core data models
//!
//! Plans, key records and the verified identity handed to the rest of the service.

pub mod api_key;

pub use api_key::*;
