//! Router construction and middleware wiring.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app::AppState;

use super::handlers::{
    ApiDoc, create_transaction_handler, health_check_handler, liveness_handler,
    method_not_allowed_handler, readiness_handler, shop_metadata_handler,
};

/// Build the application router.
///
/// The checkout page is served from a different origin, so CORS stays
/// permissive.
pub fn create_router(state: Arc<AppState>) -> Router {
    let checkout = get(shop_metadata_handler)
        .post(create_transaction_handler)
        .fallback(method_not_allowed_handler);

    Router::new()
        .route("/api/makeTransaction", checkout)
        .route("/health", get(health_check_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
