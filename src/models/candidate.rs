use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use super::{CatalogItemDetail, CatalogItemSummary, ImageAssets, ImagesResponse, ItemId};

/// Recency bucket used as the primary ranking key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YearPriority {
    CurrentYear = 1,
    PreviousYear = 2,
    Older = 3,
}

impl YearPriority {
    /// Buckets a release year relative to the current year.
    ///
    /// Unknown years and years after the current one land in `Older`.
    pub fn for_year(release_year: Option<i32>, current_year: i32) -> Self {
        match release_year {
            Some(year) if year == current_year => YearPriority::CurrentYear,
            Some(year) if year == current_year - 1 => YearPriority::PreviousYear,
            _ => YearPriority::Older,
        }
    }

    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl Serialize for YearPriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.rank())
    }
}

/// Parses a catalog `YYYY-MM-DD` date; blank or malformed dates are `None`
pub fn release_date(release_date: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(release_date?.trim(), "%Y-%m-%d").ok()
}

/// Parses the year out of a catalog `YYYY-MM-DD` date
pub fn release_year(date: Option<&str>) -> Option<i32> {
    release_date(date).map(|d| d.year())
}

/// `revenue - budget`, saturated to the `i64` range
pub fn net_result(revenue: u64, budget: u64) -> i64 {
    let net = i128::from(revenue) - i128::from(budget);
    i64::try_from(net).unwrap_or(if net < 0 { i64::MIN } else { i64::MAX })
}

/// A candidate carrying summary, financial and imagery fields
///
/// Built once both the detail and image lookups for a movie succeeded. The
/// derived fields are computed here and never touched again.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrichedCandidate {
    pub id: ItemId,
    pub title: String,
    pub release_date: Option<String>,
    pub popularity: f64,
    pub vote_count: u32,
    pub vote_average: f64,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genre_ids: Vec<i64>,
    pub budget: u64,
    pub revenue: u64,
    pub runtime: Option<u32>,
    pub logo_path: Option<String>,
    pub release_year: Option<i32>,
    pub year_priority: YearPriority,
}

impl EnrichedCandidate {
    pub fn new(
        summary: CatalogItemSummary,
        detail: CatalogItemDetail,
        images: &ImagesResponse,
        current_year: i32,
    ) -> Self {
        let assets = ImageAssets::from(images);
        let release_year = release_year(summary.release_date.as_deref());

        Self {
            id: summary.id,
            title: summary.title,
            release_date: summary.release_date,
            popularity: summary.popularity,
            vote_count: summary.vote_count,
            vote_average: summary.vote_average,
            poster_path: summary.poster_path,
            backdrop_path: assets.backdrop_path.or(summary.backdrop_path),
            genre_ids: summary.genre_ids,
            budget: detail.budget,
            revenue: detail.revenue,
            runtime: detail.runtime,
            logo_path: assets.logo_path,
            release_year,
            year_priority: YearPriority::for_year(release_year, current_year),
        }
    }
}

/// Which outlier pool a classification run fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMode {
    Profit,
    Loss,
}

impl std::fmt::Display for OutlierMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlierMode::Profit => write!(f, "profit"),
            OutlierMode::Loss => write!(f, "loss"),
        }
    }
}

/// An eligible candidate with its financial outcome attached
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassifiedCandidate {
    #[serde(flatten)]
    pub candidate: EnrichedCandidate,
    /// `revenue - budget`, negative for losses
    pub profit_or_loss: i64,
    /// `revenue / budget`
    pub ratio: f64,
}
