/// Catalog service abstraction
///
/// The catalog is the read-only movie metadata API (TMDB). Everything the
/// pipelines need from it goes through `CatalogClient`, so the HTTP client, the
/// Redis-cached decorator and test doubles are interchangeable.
use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{
        CatalogItemDetail, CatalogItemSummary, Credits, DiscoverPage, ImagesResponse, ItemId,
        ReleaseDatesResponse,
    },
};

pub mod cached;
pub mod tmdb;

pub use cached::CachedCatalog;
pub use tmdb::TmdbCatalog;

/// Server-side ordering for discovery requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    ReleaseDateDesc,
    PopularityDesc,
}

impl SortBy {
    pub fn as_param(self) -> &'static str {
        match self {
            SortBy::ReleaseDateDesc => "primary_release_date.desc",
            SortBy::PopularityDesc => "popularity.desc",
        }
    }
}

/// Filters for one discovery page request
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverQuery {
    pub sort_by: SortBy,
    pub release_date_gte: Option<NaiveDate>,
    pub release_date_lte: Option<NaiveDate>,
    pub vote_count_gte: Option<u32>,
    pub with_genres: Vec<i64>,
    pub page: u32,
}

impl DiscoverQuery {
    pub fn new(sort_by: SortBy) -> Self {
        Self {
            sort_by,
            release_date_gte: None,
            release_date_lte: None,
            vote_count_gte: None,
            with_genres: Vec::new(),
            page: 1,
        }
    }

    /// Query string pairs in the catalog's parameter names
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("sort_by", self.sort_by.as_param().to_string())];

        if let Some(gte) = self.release_date_gte {
            pairs.push(("primary_release_date.gte", gte.format("%Y-%m-%d").to_string()));
        }
        if let Some(lte) = self.release_date_lte {
            pairs.push(("primary_release_date.lte", lte.format("%Y-%m-%d").to_string()));
        }
        if let Some(votes) = self.vote_count_gte {
            pairs.push(("vote_count.gte", votes.to_string()));
        }
        if !self.with_genres.is_empty() {
            // Comma means AND in the catalog's genre filter
            let genres: Vec<String> = self.with_genres.iter().map(i64::to_string).collect();
            pairs.push(("with_genres", genres.join(",")));
        }
        pairs.push(("page", self.page.to_string()));

        pairs
    }
}

/// Trait for catalog metadata sources
///
/// Every method maps to one upstream request. Non-2xx responses surface as
/// `AppError::ExternalApi`; callers decide whether that is fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// One page of filtered discovery results
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<DiscoverPage>;

    /// Free-text title search, first page only
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItemSummary>>;

    /// Full record including budget, revenue and runtime
    async fn item_detail(&self, id: ItemId) -> AppResult<CatalogItemDetail>;

    /// Language-tagged posters, logos and backdrops
    async fn item_images(&self, id: ItemId) -> AppResult<ImagesResponse>;

    async fn release_dates(&self, id: ItemId) -> AppResult<ReleaseDatesResponse>;

    async fn credits(&self, id: ItemId) -> AppResult<Credits>;

    /// Client name for logging
    fn name(&self) -> &'static str;
}
