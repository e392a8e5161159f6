//! Main entry point for the order management service.
//!
//! This binary loads configuration, constructs the storage backend, and
//! runs the sweep engine and the HTTP API concurrently until one of them
//! exits or a shutdown signal arrives.

use clap::Parser;
use oms_config::{Config, StorageConfig};
use oms_core::Engine;
use oms_storage::{OrderStore, StorageError, StorageFactory, StoreBackend};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

// Storage backends are registered here by name.
use oms_storage::implementations::file::create_store as create_file_store;
use oms_storage::implementations::memory::create_store as create_memory_store;

/// Command-line arguments for the order service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Builds the configured storage backend from the registered factories.
fn create_store_backend(config: &StorageConfig) -> Result<Box<dyn StoreBackend>, StorageError> {
	let mut factories: HashMap<&str, StorageFactory> = HashMap::new();
	factories.insert("memory", create_memory_store as StorageFactory);
	factories.insert("file", create_file_store as StorageFactory);

	let factory = factories.get(config.primary.as_str()).ok_or_else(|| {
		StorageError::Configuration(format!("Unknown storage backend: {}", config.primary))
	})?;

	let empty = toml::Value::Table(toml::Table::new());
	let backend_config = config
		.implementations
		.get(&config.primary)
		.unwrap_or(&empty);
	factory(backend_config)
}

/// Main entry point for the order service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads and validates configuration from file
/// 4. Builds the storage backend and the engine
/// 5. Runs the sweep engine and the API server until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started order service");

	// Load configuration
	let config = Config::from_file(&args.config.to_string_lossy()).await?;
	tracing::info!(
		"Loaded configuration [storage: {}, sweep every {}s]",
		config.storage.primary,
		config.sweep.interval_seconds
	);

	// Build the store and the engine around it
	let backend = create_store_backend(&config.storage)?;
	let store = Arc::new(OrderStore::new(backend));
	let engine = Engine::new(config, store);

	let api_config = engine.config().api.clone();
	let api_service = Arc::clone(engine.service());

	// Run both the engine and the API server concurrently
	let engine_task = engine.run();
	let api_task = server::start_server(api_config, api_service);

	tokio::select! {
		result = engine_task => {
			tracing::info!("Engine finished");
			result?;
		}
		result = api_task => {
			tracing::info!("API server finished");
			result?;
		}
	}

	tracing::info!("Stopped order service");
	Ok(())
}
