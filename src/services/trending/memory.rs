use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{TrendingDocument, TrendingRecord},
};

use super::{document_id_for_term, TrendingStore};

/// In-process trending store, lost on restart
#[derive(Default)]
pub struct MemoryTrendingStore {
    documents: RwLock<Vec<TrendingDocument>>,
}

impl MemoryTrendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with documents, kept in the given order
    pub fn with_documents(documents: Vec<TrendingDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }
}

#[async_trait::async_trait]
impl TrendingStore for MemoryTrendingStore {
    async fn find_by_term(&self, term: &str) -> AppResult<Vec<TrendingDocument>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.record.search_term == term)
            .cloned()
            .collect())
    }

    async fn list_by_count(&self, limit: usize, offset: usize) -> AppResult<Vec<TrendingDocument>> {
        let mut documents = self.documents.read().await.clone();
        documents.sort_by(|a, b| b.record.count.cmp(&a.record.count));
        Ok(documents.into_iter().skip(offset).take(limit).collect())
    }

    async fn create(&self, document_id: &str, record: &TrendingRecord) -> AppResult<TrendingDocument> {
        let mut documents = self.documents.write().await;
        if documents.iter().any(|d| d.id == document_id) {
            return Err(AppError::Conflict(format!(
                "Document {} already exists",
                document_id
            )));
        }

        let document = TrendingDocument {
            id: document_id.to_string(),
            record: record.clone(),
        };
        documents.push(document.clone());
        Ok(document)
    }

    async fn increment_count(&self, document_id: &str) -> AppResult<TrendingDocument> {
        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", document_id)))?;

        document.record.count += 1;
        Ok(document.clone())
    }

    /// Lookup and write happen under one write guard
    async fn record_search(&self, seed: &TrendingRecord) -> AppResult<TrendingDocument> {
        let mut documents = self.documents.write().await;

        if let Some(existing) = documents
            .iter_mut()
            .find(|d| d.record.search_term == seed.search_term)
        {
            existing.record.count += 1;
            return Ok(existing.clone());
        }

        let document = TrendingDocument {
            id: document_id_for_term(&seed.search_term),
            record: seed.clone(),
        };
        documents.push(document.clone());
        Ok(document)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
