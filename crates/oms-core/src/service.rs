//! Order lifecycle operations and business rules.
//!
//! The service validates requests, assigns server-side fields and talks to
//! the store. Every method is a complete unit of work: no state is carried
//! between calls, and concurrent writers to the same order follow
//! last-write-wins.

use crate::truncate_id;
use chrono::Utc;
use oms_storage::{OrderStore, StorageError};
use oms_types::{CreateOrderRequest, Order, OrderStatus};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced by order operations.
#[derive(Debug, Error)]
pub enum OrderError {
	/// The request failed a business rule check.
	#[error("Validation error: {0}")]
	Validation(String),
	/// The referenced order does not exist.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The storage layer failed.
	#[error("Storage error: {0}")]
	Storage(String),
	/// Any other unexpected failure.
	#[error("Internal error: {0}")]
	Internal(String),
}

/// Service implementing the order lifecycle.
pub struct OrderService {
	/// Typed order store.
	store: Arc<OrderStore>,
}

impl OrderService {
	/// Creates a new order service backed by the given store.
	pub fn new(store: Arc<OrderStore>) -> Self {
		Self { store }
	}

	/// Validates and persists a new order.
	///
	/// The order id, PENDING status and creation timestamp are assigned
	/// here; clients cannot influence them.
	pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
		if request.item.is_empty() {
			return Err(OrderError::Validation("Item cannot be empty".to_string()));
		}
		if request.quantity <= 0 {
			return Err(OrderError::Validation(
				"Quantity must be a positive integer".to_string(),
			));
		}

		let order = Order {
			order_id: Uuid::new_v4().to_string(),
			item: request.item,
			quantity: request.quantity,
			customer_name: request.customer_name,
			customer_email: request.customer_email,
			status: OrderStatus::Pending,
			created_at: Some(Utc::now()),
			updated_at: None,
		};

		self.store
			.put(&order)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?;

		tracing::info!(order_id = %truncate_id(&order.order_id), "Created order");
		Ok(order)
	}

	/// Loads an order by id.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
		match self.store.get(order_id).await {
			Ok(order) => Ok(order),
			Err(StorageError::NotFound) => Err(OrderError::NotFound(order_id.to_string())),
			Err(e) => Err(OrderError::Storage(e.to_string())),
		}
	}

	/// Lists stored orders, optionally restricted to a single status.
	pub async fn list_orders(
		&self,
		status: Option<OrderStatus>,
	) -> Result<Vec<Order>, OrderError> {
		self.store
			.scan(status)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))
	}

	/// Loads an order, applies the given mutation, stamps `updated_at` and
	/// writes the record back.
	///
	/// This is the single write path for modifying existing orders. Client
	/// status updates and the expiry sweep both go through it.
	pub async fn update_order_with<F>(
		&self,
		order_id: &str,
		updater: F,
	) -> Result<Order, OrderError>
	where
		F: FnOnce(&mut Order),
	{
		let mut order = self.get_order(order_id).await?;
		updater(&mut order);
		order.updated_at = Some(Utc::now());

		self.store
			.put(&order)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?;
		Ok(order)
	}

	/// Validates and applies a status change.
	///
	/// Any legal status can be set from any current status. There is
	/// deliberately no transition graph here, so operators can always move
	/// an order out of a wrong state through the API.
	pub async fn update_order_status(
		&self,
		order_id: &str,
		new_status: &str,
	) -> Result<Order, OrderError> {
		let status = OrderStatus::from_str(new_status).map_err(|_| {
			OrderError::Validation(format!(
				"Invalid status '{}': must be one of {}",
				new_status,
				legal_status_tokens()
			))
		})?;

		let order = self
			.update_order_with(order_id, |order| {
				order.status = status;
			})
			.await?;

		tracing::info!(
			order_id = %truncate_id(order_id),
			status = %status,
			"Updated order status"
		);
		Ok(order)
	}

	/// Deletes an order.
	pub async fn delete_order(&self, order_id: &str) -> Result<(), OrderError> {
		// Missing ids must surface as NotFound, not as silent success.
		self.get_order(order_id).await?;

		self.store
			.delete(order_id)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?;

		tracing::info!(order_id = %truncate_id(order_id), "Deleted order");
		Ok(())
	}
}

/// Comma-separated list of the legal status tokens, for error messages.
fn legal_status_tokens() -> String {
	OrderStatus::all()
		.iter()
		.map(|s| s.as_str())
		.collect::<Vec<_>>()
		.join(", ")
}
