use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{
        CatalogItemDetail, CatalogItemSummary, Credits, DiscoverPage, ImagesResponse, ItemId,
        ReleaseDatesResponse,
    },
    services::catalog::{CatalogClient, DiscoverQuery},
};

const DETAIL_CACHE_TTL: u64 = 86400; // 1 day
const IMAGES_CACHE_TTL: u64 = 86400; // 1 day

/// Redis read-through cache in front of another catalog client
///
/// Only per-item detail and image lookups are cached. Discovery pages and
/// searches always go upstream.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn CatalogClient>,
    cache: Cache,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogClient>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl CatalogClient for CachedCatalog {
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<DiscoverPage> {
        self.inner.discover(query).await
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItemSummary>> {
        self.inner.search(query).await
    }

    async fn item_detail(&self, id: ItemId) -> AppResult<CatalogItemDetail> {
        cached!(
            self.cache,
            CacheKey::ItemDetail(id),
            DETAIL_CACHE_TTL,
            self.inner.item_detail(id)
        )
    }

    async fn item_images(&self, id: ItemId) -> AppResult<ImagesResponse> {
        cached!(
            self.cache,
            CacheKey::ItemImages(id),
            IMAGES_CACHE_TTL,
            self.inner.item_images(id)
        )
    }

    async fn release_dates(&self, id: ItemId) -> AppResult<ReleaseDatesResponse> {
        self.inner.release_dates(id).await
    }

    async fn credits(&self, id: ItemId) -> AppResult<Credits> {
        self.inner.credits(id).await
    }

    fn name(&self) -> &'static str {
        "tmdb+redis"
    }
}
