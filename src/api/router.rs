//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Resource routes are nested under `/api/`; login, registration, and the
//! root banner are public, everything else sits behind the bearer-token
//! middleware.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::app_state::AppState;
use crate::config;

/// Build the API router.
pub fn api_router(state: Arc<AppState>) -> Router {
    build_router(ApiContext::new(state))
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes — Extension must be outermost so the auth
    // middleware can extract ApiContext. `.with_state()` converts
    // Router<ApiContext> → Router<()> so the from_fn layer composes.
    let protected = Router::new()
        .route("/patients", get(endpoints::patients::list))
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::remove),
        )
        .route(
            "/patients/:id/health",
            get(endpoints::patients::health_data).put(endpoints::patients::update_health_data),
        )
        .route(
            "/patients/:id/health/history",
            get(endpoints::patients::health_history),
        )
        .route("/providers", get(endpoints::providers::list))
        .route(
            "/providers/:id",
            get(endpoints::providers::detail)
                .put(endpoints::providers::update)
                .delete(endpoints::providers::remove),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Public routes: login and registration.
    let public = Router::new()
        .route("/auth/patient/login", post(endpoints::auth::patient_login))
        .route(
            "/auth/provider/login",
            post(endpoints::auth::provider_login),
        )
        .route("/patients", post(endpoints::patients::register))
        .route("/providers", post(endpoints::providers::register))
        .with_state(ctx);

    Router::new()
        .route("/", get(root))
        .nest("/api", protected.merge(public))
        .layer(cors_layer())
}

/// `GET /` — liveness banner.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("{} backend server is running!", config::APP_NAME)
    }))
}

fn cors_layer() -> CorsLayer {
    let origin = config::frontend_origin()
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static(config::DEFAULT_FRONTEND_ORIGIN));
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
