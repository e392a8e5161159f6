//! Background expiry of stale pending orders.
//!
//! Orders left in PENDING beyond a configured age are moved to CANCELLED by
//! a periodic sweep. Each run works through the current pending set and
//! treats every order independently, so one failing update never stops the
//! rest of the sweep.

use crate::service::{OrderError, OrderService};
use crate::truncate_id;
use chrono::{Duration, Utc};
use oms_types::OrderStatus;
use std::sync::Arc;

/// Outcome of a single sweep run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepSummary {
	/// Pending orders examined.
	pub examined: usize,
	/// Orders moved to CANCELLED.
	pub expired: usize,
	/// Orders whose update failed.
	pub failed: usize,
	/// Ids of the orders expired in this run.
	pub expired_order_ids: Vec<String>,
}

/// Sweeps pending orders past their expiry threshold.
pub struct ExpirySweeper {
	/// Order service used to read and update orders.
	service: Arc<OrderService>,
	/// Age beyond which a pending order expires.
	expiry: Duration,
}

impl ExpirySweeper {
	/// Creates a sweeper that expires pending orders older than
	/// `expiry_hours`.
	pub fn new(service: Arc<OrderService>, expiry_hours: u64) -> Self {
		Self {
			service,
			expiry: Duration::hours(expiry_hours as i64),
		}
	}

	/// Runs one sweep over the pending orders.
	///
	/// Returns an error only when the pending set cannot be listed at all.
	/// Failures on individual orders are logged, counted in the summary and
	/// do not interrupt the run.
	pub async fn run_once(&self) -> Result<SweepSummary, OrderError> {
		let pending = self.service.list_orders(Some(OrderStatus::Pending)).await?;
		let cutoff = Utc::now() - self.expiry;

		let mut summary = SweepSummary::default();
		for order in pending {
			summary.examined += 1;

			// Records from earlier revisions may lack a creation timestamp;
			// their age is unknown, so they are left alone.
			let Some(created_at) = order.created_at else {
				tracing::warn!(
					order_id = %truncate_id(&order.order_id),
					"Skipping pending order with no created_at timestamp"
				);
				continue;
			};

			// An order aged exactly to the threshold is expired.
			if created_at > cutoff {
				continue;
			}

			match self
				.service
				.update_order_with(&order.order_id, |order| {
					order.status = OrderStatus::Cancelled;
				})
				.await
			{
				Ok(_) => {
					tracing::info!(
						order_id = %truncate_id(&order.order_id),
						created_at = %created_at,
						"Expired pending order"
					);
					summary.expired += 1;
					summary.expired_order_ids.push(order.order_id);
				},
				Err(e) => {
					tracing::warn!(
						order_id = %truncate_id(&order.order_id),
						error = %e,
						"Failed to expire pending order"
					);
					summary.failed += 1;
				},
			}
		}
		Ok(summary)
	}
}
