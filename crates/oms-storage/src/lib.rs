//! Storage layer for the order management service.
//!
//! This module provides the abstraction over persistent storage of order
//! records, supporting different backend implementations such as in-memory
//! or file-based storage. Backends move opaque bytes; all knowledge of the
//! order record format lives in [`OrderStore`].

use async_trait::async_trait;
use oms_types::{Order, OrderStatus};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The requested key was not found in storage.
	#[error("Not found")]
	NotFound,
	/// Error during serialization or deserialization of a record.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error from the underlying storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Invalid backend configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for key-value storage backends.
///
/// Backends store opaque byte payloads under string keys and know nothing
/// about order semantics. Records are validated above this layer, on read.
#[async_trait]
pub trait StoreBackend: Send + Sync {
	/// Retrieves the payload stored under the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores a payload under the given key, replacing any existing value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the payload stored under the given key. Deleting a missing
	/// key is not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Returns the payloads of every stored record, in no particular order.
	async fn scan_bytes(&self) -> Result<Vec<Vec<u8>>, StorageError>;
}

/// Type alias for storage backend factory functions.
///
/// Factories take a backend-specific configuration table and construct the
/// backend, validating the configuration as they go.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StoreBackend>, StorageError>;

/// Typed storage facade for order records.
///
/// Owns the JSON encoding of orders and delegates persistence to the
/// configured backend. Keys are order ids; the service holds exactly one
/// record per id, and writes replace whole records.
pub struct OrderStore {
	backend: Box<dyn StoreBackend>,
}

impl OrderStore {
	/// Creates a new store on top of the given backend.
	pub fn new(backend: Box<dyn StoreBackend>) -> Self {
		Self { backend }
	}

	/// Persists an order, replacing any previous record with the same id.
	pub async fn put(&self, order: &Order) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(order).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&order.order_id, bytes).await
	}

	/// Loads the order with the given id.
	pub async fn get(&self, order_id: &str) -> Result<Order, StorageError> {
		let bytes = self.backend.get_bytes(order_id).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Returns all stored orders, optionally restricted to a single status.
	///
	/// Records that fail to decode are logged and skipped rather than
	/// failing the whole scan, since a store may hold records written by
	/// earlier revisions of the service.
	pub async fn scan(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StorageError> {
		let payloads = self.backend.scan_bytes().await?;
		let mut orders = Vec::with_capacity(payloads.len());
		for payload in payloads {
			match serde_json::from_slice::<Order>(&payload) {
				Ok(order) => {
					if status.is_none() || status == Some(order.status) {
						orders.push(order);
					}
				},
				Err(e) => {
					tracing::warn!(error = %e, "Skipping order record that failed to decode");
				},
			}
		}
		Ok(orders)
	}

	/// Removes the order with the given id. Removing a missing id is not an
	/// error; existence checks belong to the caller.
	pub async fn delete(&self, order_id: &str) -> Result<(), StorageError> {
		self.backend.delete(order_id).await
	}
}
