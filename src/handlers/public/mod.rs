// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Route Prefix: none (/, /health)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::app::AppState;

/// GET / - service name, version and endpoint index
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Wishlist API",
            "version": version,
            "description": "Present reservation and query backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "commands": "/api/present-commands/{add,delete/:present_id,reserve} (protected)",
                "query": "/api/present-query/{wishlist/:wishlist_id[/unreserved],search?keyword=,reserved/:user_id} (protected)",
            }
        }
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check(&CancellationToken::new()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": state.store_kind,
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "store unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": state.store_kind,
                    }
                })),
            )
        }
    }
}
