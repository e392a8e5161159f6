//! File-based storage backend.
//!
//! Persists each record as one JSON file under a configured directory.
//! Writes go through a temporary file followed by a rename, so a crash
//! mid-write never leaves a half-written record under the record's name.

use crate::{StorageError, StoreBackend};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// File-based storage backend.
pub struct FileStore {
	/// Directory holding one file per record.
	base_path: PathBuf,
}

impl FileStore {
	/// Creates a new file store rooted at the given directory. The directory
	/// is created on first write.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Maps a key to its on-disk path. Path separators in the key are
	/// replaced so keys cannot escape the base directory.
	fn file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', '\\', ':'], "_");
		self.base_path.join(format!("{}.json", safe_key))
	}
}

#[async_trait]
impl StoreBackend for FileStore {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key);
		fs::read(&path).await.map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				StorageError::NotFound
			} else {
				StorageError::Backend(format!("Failed to read file: {}", e))
			}
		})
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(format!("Failed to create directory: {}", e)))?;

		let path = self.file_path(key);
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, &value)
			.await
			.map_err(|e| StorageError::Backend(format!("Failed to write file: {}", e)))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(format!("Failed to rename file: {}", e)))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.file_path(key);
		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(format!("Failed to delete file: {}", e))),
		}
	}

	async fn scan_bytes(&self) -> Result<Vec<Vec<u8>>, StorageError> {
		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// No directory yet means nothing has been stored.
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => {
				return Err(StorageError::Backend(format!(
					"Failed to read directory: {}",
					e
				)))
			},
		};

		let mut payloads = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(format!("Failed to read directory entry: {}", e)))?
		{
			let path = entry.path();
			if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
				continue;
			}
			match fs::read(&path).await {
				Ok(data) => payloads.push(data),
				// The file may have been deleted between listing and read.
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
				Err(e) => {
					tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable order file");
				},
			}
		}
		Ok(payloads)
	}
}

/// Factory function for creating a file-backed store.
///
/// Reads `storage_path` from the configuration table, defaulting to
/// `./data/orders` when absent.
pub fn create_store(config: &toml::Value) -> Result<Box<dyn StoreBackend>, StorageError> {
	let storage_path = match config.get("storage_path") {
		Some(value) => value
			.as_str()
			.ok_or_else(|| StorageError::Configuration("storage_path must be a string".to_string()))?,
		None => "./data/orders",
	};
	Ok(Box::new(FileStore::new(PathBuf::from(storage_path))))
}
