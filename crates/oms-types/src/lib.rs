//! Common types for the order management service.
//!
//! This crate defines the shared data structures used across the service,
//! including the order entity, its lifecycle status, and the types exchanged
//! over the HTTP API.

/// API types for HTTP requests, responses and error payloads.
pub mod api;
/// Order entity and lifecycle status types.
pub mod order;

pub use api::*;
pub use order::*;
