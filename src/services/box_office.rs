use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    models::{ClassifiedCandidate, EnrichedCandidate, OutlierMode},
    services::{
        catalog::CatalogClient,
        classifier,
        collector::{dedupe_by_id, CandidateCollector, CollectRequest},
        enricher::DetailEnricher,
        ranker,
    },
};

/// Knobs for one box office run
#[derive(Debug, Clone, PartialEq)]
pub struct BoxOfficeSettings {
    /// Days before today that the release window starts
    pub lookback_days: u32,
    pub min_votes: u32,
    pub target_pool_size: usize,
    pub max_pages: u32,
    /// Candidates enriched concurrently
    pub max_in_flight: usize,
    pub genres: Vec<i64>,
}

impl Default for BoxOfficeSettings {
    fn default() -> Self {
        Self {
            lookback_days: 730,
            min_votes: 100,
            target_pool_size: 100,
            max_pages: 5,
            max_in_flight: 8,
            genres: Vec::new(),
        }
    }
}

/// Both outlier lists, each ranked and bounded
#[derive(Debug, Clone, Serialize, Default)]
pub struct BoxOfficeReport {
    pub profit: Vec<ClassifiedCandidate>,
    pub loss: Vec<ClassifiedCandidate>,
}

/// Collect, enrich, classify and rank recent releases
pub struct BoxOfficeService {
    catalog: Arc<dyn CatalogClient>,
    settings: BoxOfficeSettings,
}

impl BoxOfficeService {
    pub fn new(catalog: Arc<dyn CatalogClient>, settings: BoxOfficeSettings) -> Self {
        Self { catalog, settings }
    }

    /// Profit and loss lists as of today
    pub async fn report(&self, limit: usize) -> BoxOfficeReport {
        self.report_at(limit, Utc::now().date_naive()).await
    }

    /// Profit and loss lists from a single collection run ending on `today`
    pub async fn report_at(&self, limit: usize, today: NaiveDate) -> BoxOfficeReport {
        let candidates = self.enriched_candidates(today).await;

        let report = BoxOfficeReport {
            profit: ranker::rank(classifier::classify(&candidates, OutlierMode::Profit), limit),
            loss: ranker::rank(classifier::classify(&candidates, OutlierMode::Loss), limit),
        };

        tracing::info!(
            candidates = candidates.len(),
            profit = report.profit.len(),
            loss = report.loss.len(),
            limit,
            "Box office report built"
        );

        report
    }

    /// One ranked pool as of today
    pub async fn outliers(&self, mode: OutlierMode, limit: usize) -> Vec<ClassifiedCandidate> {
        self.outliers_at(mode, limit, Utc::now().date_naive()).await
    }

    pub async fn outliers_at(
        &self,
        mode: OutlierMode,
        limit: usize,
        today: NaiveDate,
    ) -> Vec<ClassifiedCandidate> {
        let candidates = self.enriched_candidates(today).await;
        let ranked = ranker::rank(classifier::classify(&candidates, mode), limit);

        tracing::info!(
            mode = %mode,
            candidates = candidates.len(),
            returned = ranked.len(),
            "Outlier pool built"
        );

        ranked
    }

    fn collect_request(&self, today: NaiveDate) -> CollectRequest {
        let window_start = today
            .checked_sub_days(Days::new(u64::from(self.settings.lookback_days)))
            .unwrap_or(NaiveDate::MIN);

        CollectRequest {
            window_start,
            window_end: today,
            min_votes: self.settings.min_votes,
            target_pool_size: self.settings.target_pool_size,
            max_pages: self.settings.max_pages,
            genres: self.settings.genres.clone(),
        }
    }

    async fn enriched_candidates(&self, today: NaiveDate) -> Vec<EnrichedCandidate> {
        let collector = CandidateCollector::new(Arc::clone(&self.catalog));
        let summaries = collector.collect(&self.collect_request(today)).await;

        let collected = summaries.len();
        let unique = dedupe_by_id(summaries);
        if unique.len() < collected {
            tracing::debug!(
                duplicates = collected - unique.len(),
                "Dropped repeated ids before enrichment"
            );
        }

        let enricher = DetailEnricher::new(
            Arc::clone(&self.catalog),
            self.settings.max_in_flight,
            today.year(),
        );
        enricher.enrich(unique).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogItemDetail, CatalogItemSummary, DiscoverPage, ImagesResponse};
    use crate::services::catalog::MockCatalogClient;

    fn summary(id: i64, release_date: &str) -> CatalogItemSummary {
        CatalogItemSummary {
            id,
            title: format!("Movie {}", id),
            release_date: Some(release_date.to_string()),
            popularity: 1.0,
            vote_count: 1_000,
            vote_average: 7.0,
            poster_path: None,
            backdrop_path: None,
            genre_ids: vec![],
            overview: None,
        }
    }

    fn financials(id: i64) -> (u64, u64) {
        match id {
            1 => (100_000_000, 500_000_000), // profit, current year
            2 => (50_000_000, 400_000_000),  // profit, previous year, bigger margin
            3 => (200_000_000, 60_000_000),  // loss, current year
            4 => (0, 80_000_000),            // unknown budget
            5 => (90_000_000, 100_000_000),  // neither
            6 => (30_000_000, 10_000_000),   // loss, previous year
            _ => (0, 0),
        }
    }

    fn mock_catalog() -> MockCatalogClient {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover().returning(|query| {
            let results = if query.page == 1 {
                vec![
                    summary(1, "2026-04-01"),
                    summary(2, "2025-07-01"),
                    summary(3, "2026-02-01"),
                    summary(1, "2026-04-01"),
                ]
            } else {
                vec![summary(4, "2026-01-01"), summary(5, "2025-03-01"), summary(6, "2025-01-05")]
            };
            Ok(DiscoverPage {
                page: query.page,
                results,
                total_pages: Some(2),
                total_results: None,
            })
        });
        mock.expect_item_detail().returning(|id| {
            let (budget, revenue) = financials(id);
            Ok(serde_json::from_value::<CatalogItemDetail>(serde_json::json!({
                "id": id,
                "budget": budget,
                "revenue": revenue
            }))
            .unwrap())
        });
        mock.expect_item_images().returning(|_| Ok(ImagesResponse::default()));
        mock.expect_name().return_const("mock");
        mock
    }

    fn service(mock: MockCatalogClient) -> BoxOfficeService {
        BoxOfficeService::new(Arc::new(mock), BoxOfficeSettings::default())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[tokio::test]
    async fn test_report_builds_both_pools() {
        let report = service(mock_catalog()).report_at(8, today()).await;

        let profit: Vec<i64> = report.profit.iter().map(|c| c.candidate.id).collect();
        let loss: Vec<i64> = report.loss.iter().map(|c| c.candidate.id).collect();

        // Duplicate id 1 collapsed; current year leads despite smaller margin
        assert_eq!(profit, vec![1, 2]);
        assert_eq!(loss, vec![3, 6]);
    }

    #[tokio::test]
    async fn test_report_respects_limit() {
        let report = service(mock_catalog()).report_at(1, today()).await;
        assert_eq!(report.profit.len(), 1);
        assert_eq!(report.loss.len(), 1);
    }

    #[tokio::test]
    async fn test_single_pool() {
        let loss = service(mock_catalog())
            .outliers_at(OutlierMode::Loss, 8, today())
            .await;
        assert_eq!(loss.len(), 2);
        assert!(loss.iter().all(|c| c.profit_or_loss < 0));
    }

    #[tokio::test]
    async fn test_window_derived_from_lookback() {
        let svc = service(MockCatalogClient::new());
        let request = svc.collect_request(today());
        assert_eq!(request.window_end, today());
        assert_eq!(request.window_start, NaiveDate::from_ymd_opt(2024, 10, 16).unwrap());
        assert_eq!(request.min_votes, 100);
    }

    #[tokio::test]
    async fn test_configured_genres_filter_discovery() {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover()
            .withf(|q| q.with_genres == vec![28, 12])
            .times(1)
            .returning(|query| {
                Ok(DiscoverPage {
                    page: query.page,
                    results: vec![],
                    total_pages: Some(1),
                    total_results: None,
                })
            });
        mock.expect_name().return_const("mock");

        let settings = BoxOfficeSettings {
            genres: vec![28, 12],
            ..BoxOfficeSettings::default()
        };
        let report = BoxOfficeService::new(Arc::new(mock), settings)
            .report_at(8, today())
            .await;
        assert!(report.profit.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_down_yields_empty_report() {
        let mut mock = MockCatalogClient::new();
        mock.expect_discover().returning(|_| {
            Err(crate::error::AppError::ExternalApi {
                status: 502,
                message: "gateway".to_string(),
            })
        });
        mock.expect_name().return_const("mock");

        let report = service(mock).report_at(8, today()).await;
        assert!(report.profit.is_empty());
        assert!(report.loss.is_empty());
    }
}
