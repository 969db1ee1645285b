//! Patient API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layers (outermost → innermost): CORS → request logging → handler.

use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the patient API router.
pub fn patients_api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    // The collection is also reachable with a trailing slash.
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            put(endpoints::patients::update).delete(endpoints::patients::remove),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .fallback(endpoints::not_found)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(CorsLayer::permissive())
}
