/// Appwrite Databases REST backend
///
/// Documents carry `searchTerm`, `movie_id`, `title`, `count` and `poster_url`
/// attributes. Authenticates with a server API key.
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, TrendingDocument, TrendingRecord},
};

use super::TrendingStore;

/// Connection settings for one Appwrite collection
#[derive(Debug, Clone)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub collection_id: String,
}

#[derive(Debug, Deserialize)]
struct AppwriteDocument {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "searchTerm")]
    search_term: String,
    movie_id: ItemId,
    title: String,
    count: u64,
    #[serde(default)]
    poster_url: Option<String>,
}

impl From<AppwriteDocument> for TrendingDocument {
    fn from(doc: AppwriteDocument) -> Self {
        TrendingDocument {
            id: doc.id,
            record: TrendingRecord {
                search_term: doc.search_term,
                movie_id: doc.movie_id,
                title: doc.title,
                count: doc.count,
                poster_url: doc.poster_url,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<AppwriteDocument>,
}

#[derive(Debug, Serialize)]
struct DocumentData<'a> {
    #[serde(rename = "searchTerm")]
    search_term: &'a str,
    movie_id: ItemId,
    title: &'a str,
    count: u64,
    poster_url: Option<&'a str>,
}

/// Appwrite query strings, JSON encoded as the REST API expects
fn query_equal(attribute: &str, value: &str) -> String {
    json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
}

fn query_order_desc(attribute: &str) -> String {
    json!({ "method": "orderDesc", "attribute": attribute }).to_string()
}

fn query_limit(limit: usize) -> String {
    json!({ "method": "limit", "values": [limit] }).to_string()
}

fn query_offset(offset: usize) -> String {
    json!({ "method": "offset", "values": [offset] }).to_string()
}

pub struct AppwriteTrendingStore {
    http_client: HttpClient,
    settings: AppwriteSettings,
}

impl AppwriteTrendingStore {
    pub fn new(settings: AppwriteSettings) -> Self {
        Self::with_client(HttpClient::new(), settings)
    }

    pub fn with_client(http_client: HttpClient, mut settings: AppwriteSettings) -> Self {
        settings.endpoint = settings.endpoint.trim_end_matches('/').to_string();
        Self {
            http_client,
            settings,
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.settings.endpoint, self.settings.database_id, self.settings.collection_id
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Appwrite-Project", &self.settings.project_id)
            .header("X-Appwrite-Key", &self.settings.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Sends a request and decodes the JSON body, mapping 409 to `Conflict`
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> AppResult<T> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if status == StatusCode::CONFLICT {
            return Err(AppError::Conflict(format!(
                "Appwrite {} conflicted with an existing document",
                operation
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(operation, status = %status, body = %body, "Appwrite request failed");
            return Err(AppError::external(
                status,
                format!("Appwrite returned status {} for {}", status, operation),
            ));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(operation, error = %e, "Failed to deserialize Appwrite response");
            AppError::Internal(format!("Failed to parse Appwrite response for {}: {}", operation, e))
        })
    }

    async fn list(&self, queries: Vec<String>, operation: &str) -> AppResult<Vec<TrendingDocument>> {
        let params: Vec<(&str, String)> = queries.into_iter().map(|q| ("queries[]", q)).collect();
        let request = self.http_client.get(self.documents_url()).query(&params);

        let list: DocumentList = self.send(request, operation).await?;
        Ok(list.documents.into_iter().map(TrendingDocument::from).collect())
    }
}

#[async_trait::async_trait]
impl TrendingStore for AppwriteTrendingStore {
    async fn find_by_term(&self, term: &str) -> AppResult<Vec<TrendingDocument>> {
        self.list(vec![query_equal("searchTerm", term)], "find_by_term")
            .await
    }

    async fn list_by_count(&self, limit: usize, offset: usize) -> AppResult<Vec<TrendingDocument>> {
        self.list(
            vec![
                query_order_desc("count"),
                query_limit(limit),
                query_offset(offset),
            ],
            "list_by_count",
        )
        .await
    }

    async fn create(&self, document_id: &str, record: &TrendingRecord) -> AppResult<TrendingDocument> {
        let data = DocumentData {
            search_term: &record.search_term,
            movie_id: record.movie_id,
            title: &record.title,
            count: record.count,
            poster_url: record.poster_url.as_deref(),
        };
        let request = self
            .http_client
            .post(self.documents_url())
            .json(&json!({ "documentId": document_id, "data": data }));

        let created: AppwriteDocument = self.send(request, "create").await?;
        Ok(created.into())
    }

    /// Server-side increment, so concurrent writers never overwrite each other
    async fn increment_count(&self, document_id: &str) -> AppResult<TrendingDocument> {
        let request = self
            .http_client
            .patch(format!(
                "{}/{}/count/increment",
                self.documents_url(),
                document_id
            ))
            .json(&json!({ "value": 1 }));

        let updated: AppwriteDocument = self.send(request, "increment_count").await?;
        Ok(updated.into())
    }

    fn name(&self) -> &'static str {
        "appwrite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_encoding() {
        assert_eq!(
            query_equal("searchTerm", "dune"),
            r#"{"attribute":"searchTerm","method":"equal","values":["dune"]}"#
        );
        assert_eq!(query_limit(100), r#"{"method":"limit","values":[100]}"#);
        assert_eq!(query_offset(200), r#"{"method":"offset","values":[200]}"#);
    }

    #[test]
    fn test_document_decoding() {
        let doc: AppwriteDocument = serde_json::from_value(json!({
            "$id": "abc",
            "$createdAt": "2025-01-01T00:00:00.000+00:00",
            "searchTerm": "dune",
            "movie_id": 438631,
            "title": "Dune",
            "count": 3,
            "poster_url": null
        }))
        .unwrap();

        let document = TrendingDocument::from(doc);
        assert_eq!(document.id, "abc");
        assert_eq!(document.record.search_term, "dune");
        assert_eq!(document.record.count, 3);
        assert!(document.record.poster_url.is_none());
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let store = AppwriteTrendingStore::new(AppwriteSettings {
            endpoint: "https://cloud.appwrite.io/v1/".to_string(),
            project_id: "p".to_string(),
            api_key: "k".to_string(),
            database_id: "db".to_string(),
            collection_id: "col".to_string(),
        });
        assert_eq!(
            store.documents_url(),
            "https://cloud.appwrite.io/v1/databases/db/collections/col/documents"
        );
    }
}
