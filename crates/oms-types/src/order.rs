//! Order entity and lifecycle status types.
//!
//! This module defines the order record persisted by the storage layer and
//! the status values an order moves through during its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order.
///
/// Statuses are serialized as upper-case tokens (`"PENDING"`, `"PROCESSING"`,
/// `"COMPLETED"`, `"CANCELLED"`) both in storage and over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	/// Order has been placed and awaits processing.
	Pending,
	/// Order is being worked on.
	Processing,
	/// Order has been fulfilled.
	Completed,
	/// Order was cancelled, either by request or by the expiry sweep.
	Cancelled,
}

impl OrderStatus {
	/// Returns the upper-case wire token for this status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "PENDING",
			OrderStatus::Processing => "PROCESSING",
			OrderStatus::Completed => "COMPLETED",
			OrderStatus::Cancelled => "CANCELLED",
		}
	}

	/// Returns all statuses, in lifecycle order.
	pub fn all() -> &'static [OrderStatus] {
		&[
			OrderStatus::Pending,
			OrderStatus::Processing,
			OrderStatus::Completed,
			OrderStatus::Cancelled,
		]
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"PENDING" => Ok(OrderStatus::Pending),
			"PROCESSING" => Ok(OrderStatus::Processing),
			"COMPLETED" => Ok(OrderStatus::Completed),
			"CANCELLED" => Ok(OrderStatus::Cancelled),
			_ => Err(()),
		}
	}
}

/// An order record as persisted by the storage layer and returned by the API.
///
/// `created_at` and `updated_at` are optional because records written by
/// earlier revisions of the service may lack them. Code reading orders back
/// must tolerate their absence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
	/// Unique identifier, generated at creation time.
	pub order_id: String,
	/// What was ordered.
	pub item: String,
	/// How many were ordered. Always positive for records created by this
	/// service.
	pub quantity: i64,
	/// Optional customer name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub customer_name: Option<String>,
	/// Optional customer contact email.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub customer_email: Option<String>,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// When the order was created. Set once, never modified afterwards.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,
	/// When the order was last modified.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<DateTime<Utc>>,
}
