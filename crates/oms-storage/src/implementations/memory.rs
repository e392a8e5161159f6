//! In-memory storage backend.
//!
//! Keeps all records in a `HashMap` behind an async lock. Contents are lost
//! when the process stops, which makes this backend suitable for tests and
//! local development rather than production deployments.

use crate::{StorageError, StoreBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage backend.
///
/// Cloning yields a handle to the same underlying map.
#[derive(Clone)]
pub struct MemoryStore {
	/// The underlying data store.
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
	/// Creates a new empty in-memory store.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StoreBackend for MemoryStore {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn scan_bytes(&self) -> Result<Vec<Vec<u8>>, StorageError> {
		let store = self.store.read().await;
		Ok(store.values().cloned().collect())
	}
}

/// Factory function for creating an in-memory backend.
///
/// The memory backend takes no configuration; the table is accepted and
/// ignored so all factories share one signature.
pub fn create_store(_config: &toml::Value) -> Result<Box<dyn StoreBackend>, StorageError> {
	Ok(Box::new(MemoryStore::new()))
}
