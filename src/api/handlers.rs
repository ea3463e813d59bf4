//! HTTP request handlers with OpenAPI documentation.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use utoipa::OpenApi;

use crate::app::AppState;
use crate::domain::{
    AppError, CheckoutQuery, CheckoutTransactionRequest, CheckoutTransactionResponse,
    ErrorResponse, HealthResponse, HealthStatus, ShopMetadataResponse,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Point-of-Sale Checkout API",
        version = "0.1.0",
        description = "Assembles partially signed token-payment transactions for wallet checkout",
        license(
            name = "MIT"
        )
    ),
    paths(
        shop_metadata_handler,
        create_transaction_handler,
        health_check_handler,
        liveness_handler,
        readiness_handler,
    ),
    components(
        schemas(
            CheckoutTransactionRequest,
            CheckoutTransactionResponse,
            ShopMetadataResponse,
            HealthResponse,
            HealthStatus,
            ErrorResponse,
        )
    ),
    tags(
        (name = "checkout", description = "Transaction-assembly endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Shop display metadata
///
/// Purely informational; wallets show the label and icon next to the
/// payment prompt.
#[utoipa::path(
    get,
    path = "/api/makeTransaction",
    tag = "checkout",
    responses(
        (status = 200, description = "Shop display metadata", body = ShopMetadataResponse)
    )
)]
pub async fn shop_metadata_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ShopMetadataResponse> {
    Json(state.service.metadata())
}

/// Assemble a checkout transaction
///
/// Prices the order from the query parameters, applies the coupon discount
/// when the buyer qualifies, and returns a base64-encoded transaction
/// partially signed by the shop. The buyer signs and submits it wallet-side.
#[utoipa::path(
    post,
    path = "/api/makeTransaction",
    tag = "checkout",
    params(
        ("reference" = String, Query, description = "One-time reference public key (base58)"),
        ("box" = Option<u64>, Query, description = "Quantity of catalog item 'box'"),
        ("cookie" = Option<u64>, Query, description = "Quantity of catalog item 'cookie'")
    ),
    request_body = CheckoutTransactionRequest,
    responses(
        (status = 200, description = "Partially signed transaction", body = CheckoutTransactionResponse),
        (status = 400, description = "Zero charge, missing reference, or missing account", body = ErrorResponse),
        (status = 500, description = "Missing shop credential or assembly failure", body = ErrorResponse)
    )
)]
pub async fn create_transaction_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
    body: Option<Json<CheckoutTransactionRequest>>,
) -> Result<Json<CheckoutTransactionResponse>, AppError> {
    let query = CheckoutQuery::from_params(params);
    let request = body.map(|Json(request)| request).unwrap_or(
        CheckoutTransactionRequest {
            account: String::new(),
        },
    );
    let response = state
        .service
        .create_checkout_transaction(&query, &request)
        .await?;
    Ok(Json(response))
}

/// Fallback for unsupported methods on the checkout route
pub async fn method_not_allowed_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

/// Detailed health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status", body = HealthResponse)
    )
)]
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.service.health_check().await;
    Json(health)
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Application is alive")
    )
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Application is ready to serve traffic"),
        (status = 503, description = "Ledger RPC unavailable")
    )
)]
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let health = state.service.health_check().await;
    match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Client-input errors carry their specific message; everything else
        // collapses to the generic wire messages, details stay in the log.
        let (status, message) = match &self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Config(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::Blockchain(_)
            | AppError::Serialization(_)
            | AppError::Internal(_)
            | AppError::Cancelled => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "error creating transaction".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error = %self, "Server error");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
