use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{SearchedItem, TrendingRecord},
    routes::AppState,
    services::trending::TRENDING_LIMIT,
};

#[derive(Debug, Deserialize)]
pub struct RecordSearchRequest {
    pub search_term: String,
    pub movie: SearchedItem,
}

/// Handler for the trending leaderboard
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<TrendingRecord>>> {
    let trending = state.trending.top_trending(TRENDING_LIMIT).await?;
    Ok(Json(trending))
}

/// Handler that counts one search explicitly
pub async fn record(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecordSearchRequest>,
) -> AppResult<Json<TrendingRecord>> {
    tracing::info!(
        request_id = %request_id,
        movie_id = request.movie.id,
        "Recording search"
    );

    let record = state
        .trending
        .record_search(&request.search_term, &request.movie)
        .await?;

    Ok(Json(record))
}
