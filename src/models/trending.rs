use serde::{Deserialize, Serialize};

use super::{CatalogItemSummary, ItemId};

/// Search counter row: one per distinct search term
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingRecord {
    pub search_term: String,
    pub movie_id: ItemId,
    pub title: String,
    pub count: u64,
    pub poster_url: Option<String>,
}

/// A trending record together with the store's opaque document id
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingDocument {
    pub id: String,
    pub record: TrendingRecord,
}

/// The movie a search resolved to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchedItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl From<&CatalogItemSummary> for SearchedItem {
    fn from(summary: &CatalogItemSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title.clone(),
            poster_path: summary.poster_path.clone(),
        }
    }
}
