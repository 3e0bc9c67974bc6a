use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{BoxOfficeService, MovieService, TrendingService},
};

pub mod box_office;
pub mod movies;
pub mod trending;

/// Shared application state
pub struct AppState {
    pub box_office: Arc<BoxOfficeService>,
    pub trending: Arc<TrendingService>,
    pub movies: Arc<MovieService>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/box-office", get(box_office::report))
        .route("/box-office/:mode", get(box_office::outliers))
        .route("/trending", get(trending::list).post(trending::record))
        .route("/movies/search", get(movies::search))
        .route("/movies/now-playing", get(movies::now_playing))
        .route("/movies/genre/:ids", get(movies::by_genre))
        .route("/movies/:id", get(movies::details))
        .route("/movies/:id/languages", get(movies::languages))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
