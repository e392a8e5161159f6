//! Core order lifecycle logic for the order management service.
//!
//! This crate contains the order service with its business rules, the
//! background sweep that expires stale pending orders, and the engine that
//! wires both to the configuration and runs the sweep loop.

/// Engine running the periodic sweep loop.
pub mod engine;
/// Order lifecycle operations and business rules.
pub mod service;
/// Background expiry of stale pending orders.
pub mod sweeper;

pub use engine::{Engine, EngineError};
pub use service::{OrderError, OrderService};
pub use sweeper::{ExpirySweeper, SweepSummary};

/// Truncates an id to its first eight characters for log output.
///
/// Ids can arrive as raw client-supplied path segments, so the cut must land
/// on a char boundary.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((cut, _)) => format!("{}..", &id[..cut]),
		None => id.to_string(),
	}
}
