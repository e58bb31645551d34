//! API router.
//!
//! Returns a composable `Router` with every route under `/api/`.
//! Layers (outermost first): CORS, HTTP tracing, ApiContext extension,
//! caller resolution.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>`; handlers use `State<ApiContext>`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/signin", post(endpoints::auth::signin))
        .route("/auth/signout", post(endpoints::auth::signout))
        .route(
            "/auth/claim-guest-data",
            post(endpoints::auth::claim_guest_data),
        )
        .route(
            "/logs",
            get(endpoints::logs::list).post(endpoints::logs::create),
        )
        .route("/logs/stats", get(endpoints::logs::stats))
        .route(
            "/logs/:id",
            get(endpoints::logs::get)
                .put(endpoints::logs::update)
                .delete(endpoints::logs::delete),
        )
        .route(
            "/labs",
            get(endpoints::labs::list).post(endpoints::labs::create),
        )
        .route(
            "/labs/:id",
            get(endpoints::labs::get).delete(endpoints::labs::delete),
        )
        .route(
            "/medical-tests",
            get(endpoints::medical_tests::list).post(endpoints::medical_tests::create),
        )
        .route(
            "/medical-tests/:id",
            get(endpoints::medical_tests::get).delete(endpoints::medical_tests::delete),
        )
        .route(
            "/hypotheses",
            get(endpoints::hypotheses::list).post(endpoints::hypotheses::save),
        )
        .route("/hypotheses/:id", delete(endpoints::hypotheses::delete))
        .route("/analysis", post(endpoints::analysis::generate))
        .route("/community/search", post(endpoints::community::search))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::resolve_caller))
        // Extension must be outside the middleware that reads it
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
