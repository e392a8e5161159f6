//! API types for HTTP requests, responses and error payloads.
//!
//! This module contains the request and response types for the order API
//! endpoints, along with the error taxonomy exposed to clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	/// What is being ordered. Must be non-empty.
	pub item: String,
	/// How many. Must be strictly positive.
	pub quantity: i64,
	/// Optional customer name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub customer_name: Option<String>,
	/// Optional customer contact email.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub customer_email: Option<String>,
}

/// Request body for updating an order's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
	/// The new status token. Validated by the service against the legal
	/// status values.
	pub status: String,
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListOrdersQuery {
	/// Optional status token to restrict the listing to.
	#[serde(default)]
	pub status: Option<String>,
}

/// Response body returned after deleting an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOrderResponse {
	/// Human-readable confirmation of the deletion.
	pub message: String,
}

/// Wire-format error payload returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Stable machine-readable error code.
	pub error: String,
	/// Human-readable description of the failure.
	pub message: String,
}

/// Error taxonomy for API request processing.
///
/// Each variant maps to a fixed HTTP status and error code. The stored
/// message is surfaced to clients only for the client-attributable variants;
/// storage and internal failures keep their detail out of responses.
#[derive(Debug, Clone)]
pub enum ApiError {
	/// The request was well-formed but failed validation. Maps to HTTP 400.
	Validation { message: String },
	/// The referenced order does not exist. Maps to HTTP 404.
	NotFound { message: String },
	/// The storage layer failed. Maps to HTTP 500.
	Storage { message: String },
	/// Any other unexpected failure. Maps to HTTP 500.
	Internal { message: String },
}

impl ApiError {
	/// Returns the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::Validation { .. } => 400,
			ApiError::NotFound { .. } => 404,
			ApiError::Storage { .. } => 500,
			ApiError::Internal { .. } => 500,
		}
	}

	/// Returns the stable error code reported to clients.
	pub fn error_code(&self) -> &'static str {
		match self {
			ApiError::Validation { .. } => "VALIDATION_ERROR",
			ApiError::NotFound { .. } => "ORDER_NOT_FOUND",
			ApiError::Storage { .. } => "STORAGE_ERROR",
			ApiError::Internal { .. } => "INTERNAL_ERROR",
		}
	}

	/// Converts the error to a wire-format error response.
	///
	/// Storage and internal failures are reported with a fixed generic
	/// message. Their underlying detail stays available through `Display`
	/// for logging but never reaches clients.
	pub fn to_error_response(&self) -> ErrorResponse {
		let message = match self {
			ApiError::Validation { message } => message.clone(),
			ApiError::NotFound { message } => message.clone(),
			ApiError::Storage { .. } => "Internal server error".to_string(),
			ApiError::Internal { .. } => "Internal server error".to_string(),
		};
		ErrorResponse {
			error: self.error_code().to_string(),
			message,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::Validation { message } => write!(f, "Validation error: {}", message),
			ApiError::NotFound { message } => write!(f, "Not found: {}", message),
			ApiError::Storage { message } => write!(f, "Storage error: {}", message),
			ApiError::Internal { message } => write!(f, "Internal error: {}", message),
		}
	}
}

impl std::error::Error for ApiError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		let status = axum::http::StatusCode::from_u16(self.status_code())
			.unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
		let error_response = self.to_error_response();
		(status, axum::Json(error_response)).into_response()
	}
}
