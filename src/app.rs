//! Router assembly and shared handler state.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::JwtVerifier;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::PresentStore;
use crate::handlers::{protected::presents, public};
use crate::middleware::{jwt_auth_middleware, request_cancellation_middleware};
use crate::services::{PresentQueryService, ReservationEngine};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReservationEngine>,
    pub queries: Arc<PresentQueryService>,
    pub store: Arc<dyn PresentStore>,
    pub store_kind: &'static str,
    pub jwt: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn PresentStore>, config: &AppConfig) -> Self {
        Self {
            engine: Arc::new(ReservationEngine::new(store.clone())),
            queries: Arc::new(PresentQueryService::new(store.clone(), config.search.clone())),
            store,
            store_kind: config.database.backend.as_str(),
            jwt: Arc::new(JwtVerifier::new(&config.security)),
        }
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let app = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(protected_routes(state.clone()))
        .with_state(state);

    let app = if config.security.enable_cors {
        app.layer(cors_layer(&config.security))
    } else {
        app
    };

    if config.api.enable_request_logging {
        app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    } else {
        app
    }
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(command_routes())
        .merge(query_routes())
        // Layers run bottom-up: cancellation wraps auth so every handler sees a token
        .layer(from_fn_with_state(state, jwt_auth_middleware))
        .layer(from_fn(request_cancellation_middleware))
}

fn command_routes() -> Router<AppState> {
    Router::new()
        .route("/api/present-commands/add", post(presents::present_add))
        .route("/api/present-commands/delete/:present_id", delete(presents::present_delete))
        .route("/api/present-commands/reserve", post(presents::present_reserve))
}

fn query_routes() -> Router<AppState> {
    Router::new()
        .route("/api/present-query/wishlist/:wishlist_id", get(presents::wishlist_presents))
        .route(
            "/api/present-query/wishlist/:wishlist_id/unreserved",
            get(presents::wishlist_unreserved_presents),
        )
        .route("/api/present-query/search", get(presents::search_presents))
        .route("/api/present-query/reserved/:user_id", get(presents::reserved_presents))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}
