use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{TrendingDocument, TrendingRecord},
};

use super::{document_id_for_term, TrendingStore};

const COLUMNS: &str = "id, search_term, movie_id, title, count, poster_url";

#[derive(Debug, sqlx::FromRow)]
struct TrendingRow {
    id: Uuid,
    search_term: String,
    movie_id: i64,
    title: String,
    count: i64,
    poster_url: Option<String>,
}

impl From<TrendingRow> for TrendingDocument {
    fn from(row: TrendingRow) -> Self {
        TrendingDocument {
            id: row.id.to_string(),
            record: TrendingRecord {
                search_term: row.search_term,
                movie_id: row.movie_id,
                title: row.title,
                count: u64::try_from(row.count).unwrap_or_default(),
                poster_url: row.poster_url,
            },
        }
    }
}

fn parse_id(document_id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(document_id)
        .map_err(|_| AppError::InvalidInput(format!("Invalid document id: {}", document_id)))
}

fn to_db_count(count: u64) -> AppResult<i64> {
    i64::try_from(count).map_err(|_| AppError::InvalidInput(format!("Count out of range: {}", count)))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Trending store backed by the `trending_searches` table
pub struct PgTrendingStore {
    pool: PgPool,
}

impl PgTrendingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TrendingStore for PgTrendingStore {
    async fn find_by_term(&self, term: &str) -> AppResult<Vec<TrendingDocument>> {
        let rows: Vec<TrendingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM trending_searches WHERE search_term = $1 ORDER BY created_at",
            COLUMNS
        ))
        .bind(term)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TrendingDocument::from).collect())
    }

    async fn list_by_count(&self, limit: usize, offset: usize) -> AppResult<Vec<TrendingDocument>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows: Vec<TrendingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM trending_searches ORDER BY count DESC, created_at, id LIMIT $1 OFFSET $2",
            COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TrendingDocument::from).collect())
    }

    async fn create(&self, document_id: &str, record: &TrendingRecord) -> AppResult<TrendingDocument> {
        let row: TrendingRow = sqlx::query_as(&format!(
            "INSERT INTO trending_searches (id, search_term, movie_id, title, count, poster_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            COLUMNS
        ))
        .bind(parse_id(document_id)?)
        .bind(&record.search_term)
        .bind(record.movie_id)
        .bind(&record.title)
        .bind(to_db_count(record.count)?)
        .bind(&record.poster_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "Trending record for '{}' already exists",
                    record.search_term
                ))
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(row.into())
    }

    async fn increment_count(&self, document_id: &str) -> AppResult<TrendingDocument> {
        let row: Option<TrendingRow> = sqlx::query_as(&format!(
            "UPDATE trending_searches SET count = count + 1, updated_at = now() WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(parse_id(document_id)?)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TrendingDocument::from)
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", document_id)))
    }

    /// Single-statement upsert; the unique index on `search_term` serializes
    /// concurrent writers so no increment is lost.
    async fn record_search(&self, seed: &TrendingRecord) -> AppResult<TrendingDocument> {
        let document_id = parse_id(&document_id_for_term(&seed.search_term))?;

        let row: TrendingRow = sqlx::query_as(&format!(
            "INSERT INTO trending_searches (id, search_term, movie_id, title, count, poster_url) \
             VALUES ($1, $2, $3, $4, 1, $5) \
             ON CONFLICT (search_term) DO UPDATE \
             SET count = trending_searches.count + 1, updated_at = now() \
             RETURNING {}",
            COLUMNS
        ))
        .bind(document_id)
        .bind(&seed.search_term)
        .bind(seed.movie_id)
        .bind(&seed.title)
        .bind(&seed.poster_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
