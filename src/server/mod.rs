//! HTTP trigger for the price update job

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, Method, header},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::models::BatchResult;
use crate::price_sync::{PriceSync, SyncError};

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: String,
    pub results: BatchResult,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub fn build_router(sync: PriceSync) -> Router {
    // Same permissive headers on the preflight and on every real response
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    Router::new()
        .route("/update-pharmacy-prices", post(update_prices_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(sync)
}

async fn update_prices_handler(
    State(sync): State<PriceSync>,
) -> Result<Json<UpdateResponse>, SyncError> {
    info!("Price update requested");

    match sync.run().await {
        Ok(results) => Ok(Json(UpdateResponse {
            message: format!(
                "Price update completed: {} updated, {} unchanged, {} failed",
                results.updated, results.unchanged, results.failed
            ),
            results,
        })),
        Err(e) => {
            error!("Price update failed: {}", e);
            Err(e)
        }
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
