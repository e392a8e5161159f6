//! HTTP server exposing the order API.
//!
//! Routes the five order endpoints to the order service and maps every
//! failure to a stable JSON error envelope. Malformed request bodies and
//! query strings are rejected here, before the service is invoked; storage
//! and internal failures are logged here with their detail and answered with
//! a generic message.

use axum::{
	extract::{
		rejection::{JsonRejection, QueryRejection},
		Path, Query, State,
	},
	routing::{get, post},
	Json, Router,
};
use oms_config::ApiConfig;
use oms_core::{truncate_id, OrderError, OrderService};
use oms_types::{
	ApiError, CreateOrderRequest, DeleteOrderResponse, ListOrdersQuery, Order, OrderStatus,
	UpdateStatusRequest,
};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct AppState {
	/// Order service executing the requests.
	pub service: Arc<OrderService>,
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/orders", post(create_order).get(list_orders))
		.route(
			"/orders/{id}",
			get(get_order).put(update_order).delete(delete_order),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server with the given configuration.
pub async fn start_server(
	api_config: ApiConfig,
	service: Arc<OrderService>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { service });

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("Order API server starting on {}", bind_address);

	axum::serve(listener, app).await?;
	Ok(())
}

/// Handles POST /orders.
async fn create_order(
	State(state): State<AppState>,
	payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
	let Json(request) = payload.map_err(bad_request)?;
	let order = state
		.service
		.create_order(request)
		.await
		.map_err(|e| api_error("create_order", None, e))?;
	Ok(Json(order))
}

/// Handles GET /orders/{id}.
async fn get_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
	tracing::debug!(order_id = %truncate_id(&id), "Retrieving order");
	let order = state
		.service
		.get_order(&id)
		.await
		.map_err(|e| api_error("get_order", Some(&id), e))?;
	Ok(Json(order))
}

/// Handles GET /orders with an optional status filter.
async fn list_orders(
	State(state): State<AppState>,
	query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
	let Query(query) = query.map_err(|rejection| ApiError::Validation {
		message: rejection.body_text(),
	})?;
	let status = match query.status.as_deref() {
		Some(token) => Some(OrderStatus::from_str(token).map_err(|_| ApiError::Validation {
			message: format!("Invalid status filter '{}'", token),
		})?),
		None => None,
	};

	let orders = state
		.service
		.list_orders(status)
		.await
		.map_err(|e| api_error("list_orders", None, e))?;
	Ok(Json(orders))
}

/// Handles PUT /orders/{id}.
async fn update_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
	let Json(request) = payload.map_err(bad_request)?;
	let order = state
		.service
		.update_order_status(&id, &request.status)
		.await
		.map_err(|e| api_error("update_order", Some(&id), e))?;
	Ok(Json(order))
}

/// Handles DELETE /orders/{id}.
async fn delete_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<DeleteOrderResponse>, ApiError> {
	state
		.service
		.delete_order(&id)
		.await
		.map_err(|e| api_error("delete_order", Some(&id), e))?;
	Ok(Json(DeleteOrderResponse {
		message: format!("Order {} deleted", id),
	}))
}

/// Maps a JSON body rejection to the validation error envelope.
fn bad_request(rejection: JsonRejection) -> ApiError {
	ApiError::Validation {
		message: rejection.body_text(),
	}
}

/// Maps a service error to its API representation.
///
/// Server-side failures are logged with their detail; the response they
/// produce carries only the generic message.
fn api_error(operation: &str, order_id: Option<&str>, error: OrderError) -> ApiError {
	match error {
		OrderError::Validation(message) => ApiError::Validation { message },
		OrderError::NotFound(id) => ApiError::NotFound {
			message: format!("Order not found: {}", id),
		},
		OrderError::Storage(message) => {
			tracing::error!(
				operation,
				order_id = %order_id.map(truncate_id).unwrap_or_default(),
				error = %message,
				"Storage failure while handling request"
			);
			ApiError::Storage { message }
		},
		OrderError::Internal(message) => {
			tracing::error!(
				operation,
				order_id = %order_id.map(truncate_id).unwrap_or_default(),
				error = %message,
				"Internal failure while handling request"
			);
			ApiError::Internal { message }
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::{Request, StatusCode};
	use oms_storage::implementations::memory::MemoryStore;
	use oms_storage::OrderStore;
	use serde_json::{json, Value};
	use tower::ServiceExt;

	fn test_router() -> Router {
		let store = OrderStore::new(Box::new(MemoryStore::new()));
		let service = Arc::new(OrderService::new(Arc::new(store)));
		router(AppState { service })
	}

	async fn send(
		router: &Router,
		method: &str,
		path: &str,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let builder = Request::builder().method(method).uri(path);
		let request = match body {
			Some(value) => builder
				.header("Content-Type", "application/json")
				.body(Body::from(value.to_string()))
				.unwrap(),
			None => builder.body(Body::empty()).unwrap(),
		};

		let response = router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let value = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, value)
	}

	#[tokio::test]
	async fn test_create_order_returns_full_record() {
		let router = test_router();
		let (status, body) = send(
			&router,
			"POST",
			"/orders",
			Some(json!({
				"item": "widget",
				"quantity": 3,
				"customer_name": "Ada"
			})),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert!(!body["order_id"].as_str().unwrap().is_empty());
		assert_eq!(body["item"], "widget");
		assert_eq!(body["quantity"], 3);
		assert_eq!(body["customer_name"], "Ada");
		assert_eq!(body["status"], "PENDING");
		assert!(body["created_at"].is_string());
	}

	#[tokio::test]
	async fn test_create_order_validation_error() {
		let router = test_router();
		let (status, body) = send(
			&router,
			"POST",
			"/orders",
			Some(json!({"item": "", "quantity": 2})),
		)
		.await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");
		assert_eq!(body["message"], "Item cannot be empty");
	}

	#[tokio::test]
	async fn test_malformed_body_is_rejected_before_the_service() {
		let router = test_router();
		let request = Request::builder()
			.method("POST")
			.uri("/orders")
			.header("Content-Type", "application/json")
			.body(Body::from("{not json"))
			.unwrap();
		let response = router.clone().oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let body: Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(body["error"], "VALIDATION_ERROR");

		// Nothing reached the store.
		let (status, orders) = send(&router, "GET", "/orders", None).await;
		assert_eq!(status, StatusCode::OK);
		assert!(orders.as_array().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_body_missing_required_field_is_rejected() {
		let router = test_router();
		let (status, body) = send(&router, "POST", "/orders", Some(json!({"quantity": 2}))).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");
	}

	#[tokio::test]
	async fn test_get_order_not_found() {
		let router = test_router();
		let (status, body) = send(&router, "GET", "/orders/no-such-id", None).await;

		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "ORDER_NOT_FOUND");
		// The envelope carries exactly the two documented fields.
		let fields = body.as_object().unwrap();
		assert_eq!(fields.len(), 2);
		assert!(fields.contains_key("message"));
	}

	#[tokio::test]
	async fn test_multibyte_order_id_is_not_found() {
		// A debug-level subscriber makes the handler evaluate its id log
		// field, so the decoded multi-byte id flows through truncation.
		let subscriber = tracing_subscriber::fmt()
			.with_max_level(tracing::Level::DEBUG)
			.finish();
		let _guard = tracing::subscriber::set_default(subscriber);

		let router = test_router();
		let (status, body) =
			send(&router, "GET", "/orders/a%C3%A9%C3%A9%C3%A9%C3%A9", None).await;

		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "ORDER_NOT_FOUND");
	}

	#[tokio::test]
	async fn test_update_order_status() {
		let router = test_router();
		let (_, created) = send(
			&router,
			"POST",
			"/orders",
			Some(json!({"item": "widget", "quantity": 1})),
		)
		.await;
		let id = created["order_id"].as_str().unwrap();

		let (status, updated) = send(
			&router,
			"PUT",
			&format!("/orders/{}", id),
			Some(json!({"status": "PROCESSING"})),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(updated["status"], "PROCESSING");
		assert!(updated["updated_at"].is_string());
	}

	#[tokio::test]
	async fn test_update_rejects_unknown_status_token() {
		let router = test_router();
		let (_, created) = send(
			&router,
			"POST",
			"/orders",
			Some(json!({"item": "widget", "quantity": 1})),
		)
		.await;
		let id = created["order_id"].as_str().unwrap();

		let (status, body) = send(
			&router,
			"PUT",
			&format!("/orders/{}", id),
			Some(json!({"status": "SHIPPED"})),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");
		assert!(body["message"].as_str().unwrap().contains("SHIPPED"));

		// The record is unchanged.
		let (_, loaded) = send(&router, "GET", &format!("/orders/{}", id), None).await;
		assert_eq!(loaded["status"], "PENDING");
	}

	#[tokio::test]
	async fn test_update_missing_order() {
		let router = test_router();
		let (status, body) = send(
			&router,
			"PUT",
			"/orders/no-such-id",
			Some(json!({"status": "COMPLETED"})),
		)
		.await;

		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "ORDER_NOT_FOUND");
	}

	#[tokio::test]
	async fn test_delete_order() {
		let router = test_router();
		let (_, created) = send(
			&router,
			"POST",
			"/orders",
			Some(json!({"item": "widget", "quantity": 1})),
		)
		.await;
		let id = created["order_id"].as_str().unwrap().to_string();

		let (status, body) = send(&router, "DELETE", &format!("/orders/{}", id), None).await;
		assert_eq!(status, StatusCode::OK);
		assert!(body["message"].as_str().unwrap().contains(&id));

		let (status, _) = send(&router, "GET", &format!("/orders/{}", id), None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		// Deleting again reports not found.
		let (status, body) = send(&router, "DELETE", &format!("/orders/{}", id), None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "ORDER_NOT_FOUND");
	}

	#[tokio::test]
	async fn test_list_orders_with_status_filter() {
		let router = test_router();
		let (_, first) = send(
			&router,
			"POST",
			"/orders",
			Some(json!({"item": "widget", "quantity": 1})),
		)
		.await;
		let (_, second) = send(
			&router,
			"POST",
			"/orders",
			Some(json!({"item": "gadget", "quantity": 2})),
		)
		.await;
		let second_id = second["order_id"].as_str().unwrap();
		send(
			&router,
			"PUT",
			&format!("/orders/{}", second_id),
			Some(json!({"status": "COMPLETED"})),
		)
		.await;

		let (status, all) = send(&router, "GET", "/orders", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(all.as_array().unwrap().len(), 2);

		let (status, completed) = send(&router, "GET", "/orders?status=COMPLETED", None).await;
		assert_eq!(status, StatusCode::OK);
		let completed = completed.as_array().unwrap();
		assert_eq!(completed.len(), 1);
		assert_eq!(completed[0]["order_id"], *second_id);

		let (status, pending) = send(&router, "GET", "/orders?status=PENDING", None).await;
		assert_eq!(status, StatusCode::OK);
		let pending = pending.as_array().unwrap();
		assert_eq!(pending.len(), 1);
		assert_eq!(pending[0]["order_id"], first["order_id"]);

		// An unknown filter token is a client error, not an empty result.
		let (status, body) = send(&router, "GET", "/orders?status=BOGUS", None).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");
	}

	#[tokio::test]
	async fn test_malformed_query_string_uses_the_error_envelope() {
		let router = test_router();
		let (status, body) = send(&router, "GET", "/orders?status=a&status=b", None).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "VALIDATION_ERROR");
	}

	#[tokio::test]
	async fn test_order_lifecycle_end_to_end() {
		let router = test_router();
		let (_, created) = send(
			&router,
			"POST",
			"/orders",
			Some(json!({"item": "widget", "quantity": 5})),
		)
		.await;
		let id = created["order_id"].as_str().unwrap().to_string();

		for next in ["PROCESSING", "COMPLETED"] {
			let (status, body) = send(
				&router,
				"PUT",
				&format!("/orders/{}", id),
				Some(json!({"status": next})),
			)
			.await;
			assert_eq!(status, StatusCode::OK);
			assert_eq!(body["status"], *next);
		}

		let (status, _) = send(&router, "DELETE", &format!("/orders/{}", id), None).await;
		assert_eq!(status, StatusCode::OK);

		let (status, _) = send(&router, "GET", &format!("/orders/{}", id), None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}
}
