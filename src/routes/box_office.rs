use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{ClassifiedCandidate, OutlierMode},
    routes::AppState,
    services::BoxOfficeReport,
};

/// Entries per pool when the caller does not ask
pub const DEFAULT_LIMIT: usize = 8;

const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

impl LimitQuery {
    fn resolve(&self) -> AppResult<usize> {
        match self.limit {
            None => Ok(DEFAULT_LIMIT),
            Some(limit) if limit <= MAX_LIMIT => Ok(limit),
            Some(limit) => Err(AppError::InvalidInput(format!(
                "limit must be at most {}, got {}",
                MAX_LIMIT, limit
            ))),
        }
    }
}

/// Handler for both outlier pools
pub async fn report(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<BoxOfficeReport>> {
    let limit = params.resolve()?;
    tracing::info!(request_id = %request_id, limit, "Building box office report");

    Ok(Json(state.box_office.report(limit).await))
}

/// Handler for a single outlier pool
pub async fn outliers(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(mode): Path<OutlierMode>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<ClassifiedCandidate>>> {
    let limit = params.resolve()?;
    tracing::info!(request_id = %request_id, mode = %mode, limit, "Building outlier pool");

    Ok(Json(state.box_office.outliers(mode, limit).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_resolution() {
        assert_eq!(LimitQuery { limit: None }.resolve().unwrap(), DEFAULT_LIMIT);
        assert_eq!(LimitQuery { limit: Some(0) }.resolve().unwrap(), 0);
        assert_eq!(LimitQuery { limit: Some(100) }.resolve().unwrap(), 100);
        assert!(matches!(
            LimitQuery { limit: Some(101) }.resolve(),
            Err(AppError::InvalidInput(_))
        ));
    }
}
