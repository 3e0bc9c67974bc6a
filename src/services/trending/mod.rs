/// Search popularity counter
///
/// Each distinct search term owns one counter record. Records live in a
/// document store behind `TrendingStore`; the trending leaderboard is derived
/// from them at read time and never stored.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, SearchedItem, TrendingDocument, TrendingRecord},
};

pub mod appwrite;
pub mod memory;
pub mod postgres;

pub use appwrite::AppwriteTrendingStore;
pub use memory::MemoryTrendingStore;
pub use postgres::PgTrendingStore;

/// Size of the trending leaderboard
pub const TRENDING_LIMIT: usize = 8;

/// Records fetched per request while scanning for the leaderboard
pub const TRENDING_PAGE_SIZE: usize = 100;

const TERM_NAMESPACE: Uuid = Uuid::from_u128(0x5c1f_3a2e_9b7d_4e01_8f6a_2d4c_7b19_e035);

/// Deterministic document id for a search term
///
/// Deriving the id from the term makes the term a natural key: a second
/// create for the same term collides instead of adding a duplicate record.
pub fn document_id_for_term(term: &str) -> String {
    Uuid::new_v5(&TERM_NAMESPACE, term.as_bytes()).to_string()
}

/// Document store holding trending records
#[async_trait::async_trait]
pub trait TrendingStore: Send + Sync {
    /// Documents whose search term equals `term`, in store order
    async fn find_by_term(&self, term: &str) -> AppResult<Vec<TrendingDocument>>;

    /// Up to `limit` documents ordered by count, highest first, skipping the
    /// first `offset`
    async fn list_by_count(&self, limit: usize, offset: usize) -> AppResult<Vec<TrendingDocument>>;

    /// Creates a document; `AppError::Conflict` when the id is taken
    async fn create(&self, document_id: &str, record: &TrendingRecord) -> AppResult<TrendingDocument>;

    /// Adds one to a document's count in a single store-side operation
    async fn increment_count(&self, document_id: &str) -> AppResult<TrendingDocument>;

    /// Increments the counter for `seed.search_term`, creating it at 1 if absent.
    ///
    /// When the store holds several documents for one term only the first is
    /// incremented. Increments never read the old count, so concurrent
    /// searches for one term are all counted.
    async fn record_search(&self, seed: &TrendingRecord) -> AppResult<TrendingDocument> {
        let term = seed.search_term.as_str();

        if let Some(existing) = self.first_for_term(term).await? {
            return self.increment_count(&existing.id).await;
        }

        match self.create(&document_id_for_term(term), seed).await {
            Err(AppError::Conflict(_)) => {
                // Another writer created it between our read and create
                let existing = self.first_for_term(term).await?.ok_or_else(|| {
                    AppError::Internal(format!("Trending record for '{}' vanished after conflict", term))
                })?;
                self.increment_count(&existing.id).await
            }
            other => other,
        }
    }

    async fn first_for_term(&self, term: &str) -> AppResult<Option<TrendingDocument>> {
        let documents = self.find_by_term(term).await?;
        if documents.len() > 1 {
            tracing::warn!(
                search_term = %term,
                duplicates = documents.len(),
                store = self.name(),
                "Multiple trending records for one term, using the first"
            );
        }
        Ok(documents.into_iter().next())
    }

    fn name(&self) -> &'static str;
}

/// Collapses records to one per movie, keeping the highest count.
///
/// Scans in the given order; each movie keeps the position where it was first
/// seen. The result is then ordered by count (stable) and truncated to `limit`.
pub fn collapse_by_item(records: Vec<TrendingRecord>, limit: usize) -> Vec<TrendingRecord> {
    let mut best: Vec<TrendingRecord> = Vec::new();
    let mut position: HashMap<ItemId, usize> = HashMap::new();

    for record in records {
        match position.get(&record.movie_id) {
            Some(&index) => {
                if best[index].count < record.count {
                    best[index] = record;
                }
            }
            None => {
                position.insert(record.movie_id, best.len());
                best.push(record);
            }
        }
    }

    best.sort_by(|a, b| b.count.cmp(&a.count));
    best.truncate(limit);
    best
}

/// Records searches and serves the trending leaderboard
pub struct TrendingService {
    store: Arc<dyn TrendingStore>,
    image_base_url: String,
}

impl TrendingService {
    pub fn new(store: Arc<dyn TrendingStore>, image_base_url: String) -> Self {
        Self {
            store,
            image_base_url,
        }
    }

    /// Counts one search of `term` that resolved to `item`. Store errors are
    /// returned to the caller untouched.
    pub async fn record_search(&self, term: &str, item: &SearchedItem) -> AppResult<TrendingRecord> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::InvalidInput(
                "Search term cannot be empty".to_string(),
            ));
        }

        let seed = TrendingRecord {
            search_term: term.to_string(),
            movie_id: item.id,
            title: item.title.clone(),
            count: 1,
            poster_url: item
                .poster_path
                .as_deref()
                .map(|path| format!("{}{}", self.image_base_url, path)),
        };

        let document = self.store.record_search(&seed).await?;

        tracing::info!(
            search_term = %term,
            movie_id = document.record.movie_id,
            count = document.record.count,
            store = self.store.name(),
            "Search recorded"
        );

        Ok(document.record)
    }

    /// At most `limit` records, one per movie, highest count first.
    ///
    /// Scans the store in count order a page at a time. Once `limit` distinct
    /// movies are held, every later record has a count no higher than theirs
    /// and cannot enter the view, so the scan stops there.
    pub async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingRecord>> {
        let mut records: Vec<TrendingRecord> = Vec::new();
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut offset = 0;

        while seen.len() < limit {
            let page = self.store.list_by_count(TRENDING_PAGE_SIZE, offset).await?;
            let fetched = page.len();

            for document in page {
                seen.insert(document.record.movie_id);
                records.push(document.record);
            }

            if fetched < TRENDING_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }

        Ok(collapse_by_item(records, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(term: &str, movie_id: ItemId, count: u64) -> TrendingRecord {
        TrendingRecord {
            search_term: term.to_string(),
            movie_id,
            title: format!("Movie {}", movie_id),
            count,
            poster_url: None,
        }
    }

    fn dune() -> SearchedItem {
        SearchedItem {
            id: 438631,
            title: "Dune".to_string(),
            poster_path: Some("/d5NXSklXo0qyIYkgV94XAgMIckC.jpg".to_string()),
        }
    }

    fn service(store: Arc<MemoryTrendingStore>) -> TrendingService {
        service_with(store)
    }

    fn service_with(store: Arc<dyn TrendingStore>) -> TrendingService {
        TrendingService::new(store, "https://image.tmdb.org/t/p/w500".to_string())
    }

    #[test]
    fn test_document_id_is_stable_per_term() {
        assert_eq!(document_id_for_term("dune"), document_id_for_term("dune"));
        assert_ne!(document_id_for_term("dune"), document_id_for_term("Dune"));
        assert_eq!(document_id_for_term("dune").len(), 36);
    }

    #[test]
    fn test_collapse_keeps_highest_per_item() {
        let records = vec![
            record("dune", 1, 9),
            record("batman", 2, 7),
            record("dune part one", 1, 4),
            record("joker", 3, 3),
        ];

        let view = collapse_by_item(records, 8);

        let summary: Vec<(ItemId, u64)> = view.iter().map(|r| (r.movie_id, r.count)).collect();
        assert_eq!(summary, vec![(1, 9), (2, 7), (3, 3)]);
    }

    #[test]
    fn test_collapse_tolerates_unordered_input() {
        let records = vec![record("a", 1, 2), record("b", 2, 5), record("c", 1, 8)];

        let view = collapse_by_item(records, 8);

        let summary: Vec<(ItemId, u64)> = view.iter().map(|r| (r.movie_id, r.count)).collect();
        assert_eq!(summary, vec![(1, 8), (2, 5)]);
        assert_eq!(view[0].search_term, "c");
    }

    #[test]
    fn test_collapse_truncates() {
        let records: Vec<TrendingRecord> = (0..20).map(|i| record("t", i, 100 - i as u64)).collect();
        let view = collapse_by_item(records, TRENDING_LIMIT);
        assert_eq!(view.len(), 8);
        assert_eq!(view[0].movie_id, 0);
    }

    #[tokio::test]
    async fn test_two_searches_produce_one_record() {
        let store = Arc::new(MemoryTrendingStore::new());
        let trending = service(store.clone());

        trending.record_search("dune", &dune()).await.unwrap();
        let second = trending.record_search("dune", &dune()).await.unwrap();

        assert_eq!(second.count, 2);
        let all = store.find_by_term("dune").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].record.count, 2);
    }

    #[tokio::test]
    async fn test_new_record_captures_item() {
        let store = Arc::new(MemoryTrendingStore::new());
        let created = service(store).record_search("  dune ", &dune()).await.unwrap();

        assert_eq!(created.search_term, "dune");
        assert_eq!(created.count, 1);
        assert_eq!(created.movie_id, 438631);
        assert_eq!(
            created.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/d5NXSklXo0qyIYkgV94XAgMIckC.jpg")
        );
    }

    #[tokio::test]
    async fn test_empty_term_rejected() {
        let store = Arc::new(MemoryTrendingStore::new());
        let err = service(store).record_search("   ", &dune()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_duplicate_term_records_increment_first_only() {
        let store = Arc::new(MemoryTrendingStore::with_documents(vec![
            TrendingDocument { id: "a".to_string(), record: record("dune", 1, 3) },
            TrendingDocument { id: "b".to_string(), record: record("dune", 1, 5) },
        ]));

        service(store.clone()).record_search("dune", &dune()).await.unwrap();

        let all = store.find_by_term("dune").await.unwrap();
        let counts: Vec<(String, u64)> = all.into_iter().map(|d| (d.id, d.record.count)).collect();
        assert_eq!(counts, vec![("a".to_string(), 4), ("b".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_top_trending_scans_past_first_page() {
        // The first page is all one movie; the rest of the board lies beyond it
        let mut documents: Vec<TrendingDocument> = (0..TRENDING_PAGE_SIZE as u64 + 20)
            .map(|i| TrendingDocument {
                id: format!("popular-{}", i),
                record: record(&format!("dune {}", i), 1, 1_000 - i),
            })
            .collect();
        documents.extend((2..12).map(|movie_id| TrendingDocument {
            id: format!("other-{}", movie_id),
            record: record(&format!("movie {}", movie_id), movie_id, 100 - movie_id as u64),
        }));
        let store = Arc::new(MemoryTrendingStore::with_documents(documents));

        let top = service(store).top_trending(TRENDING_LIMIT).await.unwrap();

        let ids: Vec<ItemId> = top.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(top[0].count, 1_000);
    }

    /// Store that yields between reading a term and writing it, widening the
    /// window for concurrent writers
    struct YieldingStore {
        inner: MemoryTrendingStore,
    }

    #[async_trait::async_trait]
    impl TrendingStore for YieldingStore {
        async fn find_by_term(&self, term: &str) -> AppResult<Vec<TrendingDocument>> {
            let found = self.inner.find_by_term(term).await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            found
        }

        async fn list_by_count(&self, limit: usize, offset: usize) -> AppResult<Vec<TrendingDocument>> {
            self.inner.list_by_count(limit, offset).await
        }

        async fn create(&self, document_id: &str, record: &TrendingRecord) -> AppResult<TrendingDocument> {
            self.inner.create(document_id, record).await
        }

        async fn increment_count(&self, document_id: &str) -> AppResult<TrendingDocument> {
            self.inner.increment_count(document_id).await
        }

        fn name(&self) -> &'static str {
            "yielding"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_searches_are_all_counted() {
        let store = Arc::new(YieldingStore {
            inner: MemoryTrendingStore::new(),
        });
        let trending = Arc::new(service_with(store.clone()));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let trending = Arc::clone(&trending);
                tokio::spawn(async move { trending.record_search("dune", &dune()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let all = store.find_by_term("dune").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].record.count, 20);
    }

    #[tokio::test]
    async fn test_top_trending_unique_and_ordered() {
        let store = Arc::new(MemoryTrendingStore::new());
        let trending = service(store);

        let batman = SearchedItem { id: 268, title: "Batman".to_string(), poster_path: None };
        for _ in 0..3 {
            trending.record_search("dune", &dune()).await.unwrap();
        }
        trending.record_search("dune 2021", &dune()).await.unwrap();
        for _ in 0..2 {
            trending.record_search("batman", &batman).await.unwrap();
        }

        let top = trending.top_trending(TRENDING_LIMIT).await.unwrap();

        let summary: Vec<(ItemId, u64)> = top.iter().map(|r| (r.movie_id, r.count)).collect();
        assert_eq!(summary, vec![(438631, 3), (268, 2)]);
    }
}
