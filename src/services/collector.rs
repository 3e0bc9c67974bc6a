use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    models::CatalogItemSummary,
    services::catalog::{CatalogClient, DiscoverQuery, SortBy},
};

/// Parameters for one bounded collection run
#[derive(Debug, Clone, PartialEq)]
pub struct CollectRequest {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub min_votes: u32,
    pub target_pool_size: usize,
    pub max_pages: u32,
    pub genres: Vec<i64>,
}

impl CollectRequest {
    fn page_query(&self, page: u32) -> DiscoverQuery {
        DiscoverQuery {
            sort_by: SortBy::ReleaseDateDesc,
            release_date_gte: Some(self.window_start),
            release_date_lte: Some(self.window_end),
            vote_count_gte: Some(self.min_votes),
            with_genres: self.genres.clone(),
            page,
        }
    }
}

/// Outcome of one collection run
#[derive(Debug, Default)]
pub struct CollectionRun {
    pub items: Vec<CatalogItemSummary>,
    /// Discovery requests issued, failed ones included
    pub pages_requested: u32,
}

/// Pulls discovery pages, newest first, until enough candidates are gathered
pub struct CandidateCollector {
    catalog: Arc<dyn CatalogClient>,
}

impl CandidateCollector {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    /// Requests pages 1, 2, 3, ... sequentially and appends their results in
    /// page order.
    ///
    /// Stops once `target_pool_size` items are held or `max_pages` pages have
    /// been requested. A failed page ends the run with whatever was gathered;
    /// an exhausted catalog (empty page or last page reached) ends it early.
    pub async fn collect(&self, request: &CollectRequest) -> Vec<CatalogItemSummary> {
        self.run(request).await.items
    }

    /// Same as [`collect`](Self::collect), also reporting how many pages were
    /// requested.
    pub async fn run(&self, request: &CollectRequest) -> CollectionRun {
        let mut accumulator: Vec<CatalogItemSummary> = Vec::new();
        let mut pages_requested = 0;
        let mut page = 1;

        while accumulator.len() < request.target_pool_size && page <= request.max_pages {
            let query = request.page_query(page);
            pages_requested += 1;

            let result = match self.catalog.discover(&query).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(
                        page,
                        collected = accumulator.len(),
                        error = %e,
                        catalog = self.catalog.name(),
                        "Discovery page failed, keeping partial results"
                    );
                    break;
                }
            };

            let exhausted = result.results.is_empty()
                || result.total_pages.is_some_and(|total| page >= total);
            accumulator.extend(result.results);

            if exhausted {
                tracing::debug!(page, "Catalog exhausted before page budget");
                break;
            }
            page += 1;
        }

        tracing::info!(
            collected = accumulator.len(),
            target = request.target_pool_size,
            pages = pages_requested,
            "Candidate collection finished"
        );

        CollectionRun {
            items: accumulator,
            pages_requested,
        }
    }
}

/// Drops repeated ids, keeping the first occurrence in order
pub fn dedupe_by_id(items: Vec<CatalogItemSummary>) -> Vec<CatalogItemSummary> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|item| seen.insert(item.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::DiscoverPage;
    use crate::services::catalog::MockCatalogClient;
    use mockall::predicate::function;
    use mockall::Sequence;

    fn summary(id: i64) -> CatalogItemSummary {
        CatalogItemSummary {
            id,
            title: format!("Movie {}", id),
            release_date: Some("2026-05-01".to_string()),
            popularity: 1.0,
            vote_count: 150,
            vote_average: 6.5,
            poster_path: None,
            backdrop_path: None,
            genre_ids: vec![],
            overview: None,
        }
    }

    fn page_of(page: u32, size: i64, total_pages: Option<u32>) -> DiscoverPage {
        let start = i64::from(page - 1) * size;
        DiscoverPage {
            page,
            results: (start..start + size).map(summary).collect(),
            total_pages,
            total_results: None,
        }
    }

    fn request(target_pool_size: usize, max_pages: u32) -> CollectRequest {
        CollectRequest {
            window_start: NaiveDate::from_ymd_opt(2024, 10, 16).unwrap(),
            window_end: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            min_votes: 100,
            target_pool_size,
            max_pages,
            genres: vec![],
        }
    }

    fn collector(mock: MockCatalogClient) -> CandidateCollector {
        CandidateCollector::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_page_budget_wins_over_target() {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover()
            .times(2)
            .returning(|query| Ok(page_of(query.page, 20, Some(500))));
        mock.expect_name().return_const("mock");

        let items = collector(mock).collect(&request(50, 2)).await;

        assert_eq!(items.len(), 40);
    }

    #[tokio::test]
    async fn test_stops_once_target_reached() {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover()
            .times(3)
            .returning(|query| Ok(page_of(query.page, 20, Some(500))));
        mock.expect_name().return_const("mock");

        let run = collector(mock).run(&request(50, 10)).await;

        assert_eq!(run.items.len(), 60);
        assert_eq!(run.pages_requested, 3);
    }

    #[tokio::test]
    async fn test_pages_requested_in_order_with_filters() {
        let mut mock = MockCatalogClient::new();
        let mut seq = Sequence::new();
        for expected_page in 1..=3u32 {
            mock.expect_discover()
                .with(function(move |q: &DiscoverQuery| {
                    q.page == expected_page
                        && q.sort_by == SortBy::ReleaseDateDesc
                        && q.vote_count_gte == Some(100)
                        && q.release_date_lte == NaiveDate::from_ymd_opt(2026, 10, 16)
                }))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|q| Ok(page_of(q.page, 5, None)));
        }
        mock.expect_name().return_const("mock");

        let items = collector(mock).collect(&request(15, 5)).await;

        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, (0..15).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failed_page_returns_partial_results() {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover().times(2).returning(|query| {
            if query.page == 1 {
                Ok(page_of(1, 20, Some(10)))
            } else {
                Err(AppError::ExternalApi {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            }
        });
        mock.expect_name().return_const("mock");

        let run = collector(mock).run(&request(100, 5)).await;

        assert_eq!(run.items.len(), 20);
        assert_eq!(run.pages_requested, 2);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_empty_not_error() {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover().times(1).returning(|_| {
            Err(AppError::ExternalApi {
                status: 401,
                message: "bad token".to_string(),
            })
        });
        mock.expect_name().return_const("mock");

        let items = collector(mock).collect(&request(100, 5)).await;

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_stops_when_catalog_exhausted() {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover()
            .times(2)
            .returning(|query| Ok(page_of(query.page, 20, Some(2))));
        mock.expect_name().return_const("mock");

        let items = collector(mock).collect(&request(100, 5)).await;

        assert_eq!(items.len(), 40);
    }

    #[tokio::test]
    async fn test_zero_page_budget_issues_no_requests() {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover().never();
        mock.expect_name().return_const("mock");

        let run = collector(mock).run(&request(100, 0)).await;

        assert!(run.items.is_empty());
        assert_eq!(run.pages_requested, 0);
    }

    #[test]
    fn test_dedupe_by_id_keeps_first() {
        let mut second = summary(1);
        second.title = "Duplicate".to_string();
        let items = vec![summary(1), summary(2), second, summary(3)];

        let deduped = dedupe_by_id(items);

        let ids: Vec<i64> = deduped.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(deduped[0].title, "Movie 1");
    }
}
