/// TMDB catalog client
///
/// Authenticates with a v4 bearer token. Endpoints used:
/// - `/discover/movie` for filtered pages
/// - `/search/movie` for free-text search
/// - `/movie/{id}`, `/movie/{id}/images`, `/movie/{id}/release_dates`, `/movie/{id}/credits`
use crate::{
    error::{AppError, AppResult},
    models::{
        CatalogItemDetail, CatalogItemSummary, Credits, DiscoverPage, ImagesResponse, ItemId,
        ReleaseDatesResponse,
    },
    services::catalog::{CatalogClient, DiscoverQuery},
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self::with_client(HttpClient::new(), api_key, api_url)
    }

    pub fn with_client(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Issues an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(path = %path, status = %status, body = %body, "Catalog request failed");
            return Err(AppError::external(
                status,
                format!("Catalog returned status {} for {}", status, path),
            ));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(path = %path, error = %e, "Failed to deserialize catalog response");
            AppError::Internal(format!("Failed to parse catalog response for {}: {}", path, e))
        })
    }
}

#[derive(serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<CatalogItemSummary>,
}

#[async_trait::async_trait]
impl CatalogClient for TmdbCatalog {
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<DiscoverPage> {
        let page: DiscoverPage = self
            .get_json("/discover/movie", &query.to_query_pairs())
            .await?;

        tracing::debug!(
            page = query.page,
            results = page.results.len(),
            total_pages = ?page.total_pages,
            "Discovery page fetched"
        );

        Ok(page)
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItemSummary>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let response: SearchResponse = self
            .get_json("/search/movie", &[("query", query.to_string())])
            .await?;

        tracing::info!(
            query = %query,
            results = response.results.len(),
            "Catalog search completed"
        );

        Ok(response.results)
    }

    async fn item_detail(&self, id: ItemId) -> AppResult<CatalogItemDetail> {
        self.get_json(&format!("/movie/{}", id), &[]).await
    }

    async fn item_images(&self, id: ItemId) -> AppResult<ImagesResponse> {
        self.get_json(&format!("/movie/{}/images", id), &[]).await
    }

    async fn release_dates(&self, id: ItemId) -> AppResult<ReleaseDatesResponse> {
        self.get_json(&format!("/movie/{}/release_dates", id), &[])
            .await
    }

    async fn credits(&self, id: ItemId) -> AppResult<Credits> {
        self.get_json(&format!("/movie/{}/credits", id), &[]).await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
