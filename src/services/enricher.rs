use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogItemSummary, EnrichedCandidate, ItemId},
    services::catalog::CatalogClient,
};

/// Attaches detail and image data to candidates with a bounded fan-out
///
/// Each candidate gets one detail and one image request, issued together. At
/// most `max_in_flight` candidates are being fetched at any moment.
pub struct DetailEnricher {
    catalog: Arc<dyn CatalogClient>,
    max_in_flight: usize,
    current_year: i32,
}

impl DetailEnricher {
    pub fn new(catalog: Arc<dyn CatalogClient>, max_in_flight: usize, current_year: i32) -> Self {
        Self {
            catalog,
            max_in_flight: max_in_flight.max(1),
            current_year,
        }
    }

    /// Enriches every summary whose detail and image lookups both succeed.
    ///
    /// A candidate with any failed lookup is dropped entirely. Output order is
    /// not guaranteed to follow input order.
    pub async fn enrich(&self, summaries: Vec<CatalogItemSummary>) -> Vec<EnrichedCandidate> {
        let requested = summaries.len();
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = Vec::with_capacity(requested);

        for summary in summaries {
            let catalog = Arc::clone(&self.catalog);
            let permits = Arc::clone(&permits);
            let current_year = self.current_year;

            let task = tokio::spawn(async move {
                let id = summary.id;
                let result = enrich_one(catalog, permits, summary, current_year).await;
                (id, result)
            });
            tasks.push(task);
        }

        let mut enriched = Vec::with_capacity(requested);
        let mut dropped = 0usize;

        for task in tasks {
            match task.await {
                Ok((_, Ok(candidate))) => enriched.push(candidate),
                Ok((id, Err(e))) => {
                    dropped += 1;
                    tracing::warn!(item_id = id, error = %e, "Dropping candidate after failed lookup");
                }
                Err(e) => {
                    dropped += 1;
                    tracing::error!(error = %e, "Enrichment task join error");
                }
            }
        }

        if dropped > 0 {
            tracing::warn!(
                requested,
                enriched = enriched.len(),
                dropped,
                "Partial enrichment failure"
            );
        }

        enriched
    }
}

async fn enrich_one(
    catalog: Arc<dyn CatalogClient>,
    permits: Arc<Semaphore>,
    summary: CatalogItemSummary,
    current_year: i32,
) -> AppResult<EnrichedCandidate> {
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let id: ItemId = summary.id;
    let (detail, images) = tokio::try_join!(catalog.item_detail(id), catalog.item_images(id))?;

    Ok(EnrichedCandidate::new(summary, detail, &images, current_year))
}
