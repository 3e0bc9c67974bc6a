use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{CatalogItemSummary, ItemId, MovieDetailsView, MovieLanguage, SearchedItem},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handler for title search
///
/// A non-blank query that matched anything counts as a search for its first
/// result.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogItemSummary>>> {
    let results = state.movies.search(&params.q).await?;

    if !params.q.trim().is_empty() {
        if let Some(first) = results.first() {
            state
                .trending
                .record_search(&params.q, &SearchedItem::from(first))
                .await?;
        }
    }

    tracing::info!(
        request_id = %request_id,
        query = %params.q,
        results = results.len(),
        "Search served"
    );

    Ok(Json(results))
}

/// Popular titles in every genre of a comma-separated id list, e.g. `28,12`
pub async fn by_genre(
    State(state): State<Arc<AppState>>,
    Path(ids): Path<String>,
) -> AppResult<Json<Vec<CatalogItemSummary>>> {
    let genres = ids
        .split(',')
        .map(|id| {
            id.trim()
                .parse::<i64>()
                .map_err(|_| AppError::InvalidInput(format!("Invalid genre id: {}", id)))
        })
        .collect::<AppResult<Vec<i64>>>()?;

    Ok(Json(state.movies.by_genres(&genres).await?))
}

pub async fn now_playing(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<CatalogItemSummary>>> {
    Ok(Json(state.movies.now_playing().await?))
}

pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<MovieDetailsView>> {
    Ok(Json(state.movies.details(id).await?))
}

pub async fn languages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<Vec<MovieLanguage>>> {
    Ok(Json(state.movies.languages(id).await?))
}
