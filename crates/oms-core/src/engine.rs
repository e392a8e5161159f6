//! Engine wiring configuration, storage and the sweep loop together.
//!
//! The engine owns the order service and the expiry sweeper and drives the
//! periodic sweep until a shutdown signal arrives. The HTTP server runs
//! alongside it and shares the service handle.

use crate::service::OrderService;
use crate::sweeper::ExpirySweeper;
use oms_config::Config;
use oms_storage::OrderStore;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{interval, Duration};

/// Errors that can occur during engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
	/// Engine failed while running.
	#[error("Service error: {0}")]
	Service(String),
}

/// Engine running the order service and its periodic expiry sweep.
pub struct Engine {
	/// Validated service configuration.
	config: Config,
	/// Order service shared with the HTTP server.
	service: Arc<OrderService>,
	/// Sweeper for stale pending orders.
	sweeper: ExpirySweeper,
}

impl Engine {
	/// Creates the engine from validated configuration and a store.
	pub fn new(config: Config, store: Arc<OrderStore>) -> Self {
		let service = Arc::new(OrderService::new(store));
		let sweeper = ExpirySweeper::new(service.clone(), config.sweep.expiry_hours);
		Self {
			config,
			service,
			sweeper,
		}
	}

	/// Returns the shared order service handle.
	pub fn service(&self) -> &Arc<OrderService> {
		&self.service
	}

	/// Returns the engine configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Runs the sweep loop until a shutdown signal arrives.
	///
	/// The first sweep runs immediately on startup, then once per configured
	/// interval.
	pub async fn run(&self) -> Result<(), EngineError> {
		let mut sweep_interval =
			interval(Duration::from_secs(self.config.sweep.interval_seconds));

		loop {
			tokio::select! {
				_ = sweep_interval.tick() => {
					match self.sweeper.run_once().await {
						Ok(summary) => {
							tracing::info!(
								examined = summary.examined,
								expired = summary.expired,
								failed = summary.failed,
								"Expiry sweep completed"
							);
							if !summary.expired_order_ids.is_empty() {
								tracing::debug!(
									expired_order_ids = ?summary.expired_order_ids,
									"Expired order ids"
								);
							}
						},
						Err(e) => {
							tracing::warn!(error = %e, "Expiry sweep failed");
						},
					}
				},
				signal = tokio::signal::ctrl_c() => {
					signal.map_err(|e| {
						EngineError::Service(format!(
							"Failed to listen for shutdown signal: {}",
							e
						))
					})?;
					tracing::info!("Shutdown signal received, stopping engine");
					break;
				},
			}
		}
		Ok(())
	}
}
