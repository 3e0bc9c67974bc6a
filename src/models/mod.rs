use serde::{Deserialize, Serialize};

pub mod candidate;
pub mod details;
pub mod language;
pub mod trending;

pub use candidate::{
    net_result, release_date, release_year, ClassifiedCandidate, EnrichedCandidate, OutlierMode,
    YearPriority,
};
pub use details::{CastMember, MovieDetailsView, PersonCredit, WriterCredit};
pub use language::{LanguageKind, MovieLanguage};
pub use trending::{SearchedItem, TrendingDocument, TrendingRecord};

/// Catalog identifier of a movie
pub type ItemId = i64;

// ============================================================================
// Catalog (TMDB) API Types
// ============================================================================

/// A movie as listed by the discovery and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItemSummary {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// One page of discovery or search results
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscoverPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<CatalogItemSummary>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpokenLanguage {
    pub iso_639_1: String,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Full movie record from `/movie/{id}`
///
/// `budget` and `revenue` are whole USD; the catalog reports `0` when the
/// figure is unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItemDetail {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub spoken_languages: Vec<SpokenLanguage>,
}

/// A single language-tagged image variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageAsset {
    pub file_path: String,
    #[serde(default)]
    pub iso_639_1: Option<String>,
}

impl ImageAsset {
    /// True when the asset carries no language tag
    fn is_untagged(&self) -> bool {
        self.iso_639_1.as_deref().map_or(true, str::is_empty)
    }

    /// True for untagged or English assets
    fn is_untagged_or_english(&self) -> bool {
        self.is_untagged() || self.iso_639_1.as_deref() == Some("en")
    }
}

/// Response of `/movie/{id}/images`, in the order the catalog returned it
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ImagesResponse {
    #[serde(default)]
    pub posters: Vec<ImageAsset>,
    #[serde(default)]
    pub logos: Vec<ImageAsset>,
    #[serde(default)]
    pub backdrops: Vec<ImageAsset>,
}

/// Backdrop index preferred among the language-neutral backdrops
const PREFERRED_BACKDROP_INDEX: usize = 7;

impl ImagesResponse {
    /// First logo without a language tag or tagged English
    pub fn clean_logo(&self) -> Option<&str> {
        self.logos
            .iter()
            .find(|logo| logo.is_untagged_or_english())
            .map(|logo| logo.file_path.as_str())
    }

    /// First poster without any text language
    pub fn clean_poster(&self) -> Option<&str> {
        self.posters
            .iter()
            .find(|poster| poster.is_untagged())
            .map(|poster| poster.file_path.as_str())
    }

    /// Eighth language-neutral backdrop, or the last one when there are fewer
    pub fn clean_backdrop(&self) -> Option<&str> {
        let clean: Vec<&ImageAsset> = self.backdrops.iter().filter(|b| b.is_untagged()).collect();
        let index = PREFERRED_BACKDROP_INDEX.min(clean.len().checked_sub(1)?);
        clean.get(index).map(|b| b.file_path.as_str())
    }
}

/// Image fields attached to an enriched movie
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ImageAssets {
    pub logo_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl From<&ImagesResponse> for ImageAssets {
    fn from(images: &ImagesResponse) -> Self {
        Self {
            logo_path: images.clean_logo().map(str::to_string),
            backdrop_path: images.clean_backdrop().map(str::to_string),
        }
    }
}

/// Response of `/movie/{id}/release_dates`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReleaseDatesResponse {
    #[serde(default)]
    pub results: Vec<CountryReleases>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryReleases {
    pub iso_3166_1: String,
    #[serde(default)]
    pub release_dates: Vec<ReleaseDateEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDateEntry {
    #[serde(default)]
    pub certification: String,
}

impl ReleaseDatesResponse {
    /// Certification of the first release in the given country, if non-empty
    pub fn certification_for(&self, country: &str) -> Option<&str> {
        self.results
            .iter()
            .find(|r| r.iso_3166_1 == country)?
            .release_dates
            .first()
            .map(|d| d.certification.as_str())
            .filter(|c| !c.is_empty())
    }
}

/// Response of `/movie/{id}/credits`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastEntry>,
    #[serde(default)]
    pub crew: Vec<CrewEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job: String,
}
