use serde::Serialize;

use super::{net_result, CatalogItemDetail, Credits, ImageAssets, ReleaseDatesResponse};

const CERTIFICATION_COUNTRY: &str = "US";
const UNRATED: &str = "NR";
const WRITER_JOBS: [&str; 3] = ["Screenplay", "Writer", "Story"];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PersonCredit {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WriterCredit {
    pub id: i64,
    pub name: String,
    pub job: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

/// Movie detail page payload: the catalog record plus presentation fields
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetailsView {
    #[serde(flatten)]
    pub detail: CatalogItemDetail,
    pub certification: String,
    pub formatted_runtime: Option<String>,
    pub formatted_budget: String,
    pub formatted_revenue: String,
    pub formatted_profit: String,
    pub directors: Vec<PersonCredit>,
    pub writers: Vec<WriterCredit>,
    pub cast: Vec<CastMember>,
    pub logo_path: Option<String>,
    pub clean_backdrop_path: Option<String>,
}

impl MovieDetailsView {
    pub fn build(
        detail: CatalogItemDetail,
        release_dates: &ReleaseDatesResponse,
        credits: Credits,
        assets: ImageAssets,
    ) -> Self {
        let certification = release_dates
            .certification_for(CERTIFICATION_COUNTRY)
            .unwrap_or(UNRATED)
            .to_string();
        let profit = net_result(detail.revenue, detail.budget);

        let directors = credits
            .crew
            .iter()
            .filter(|person| person.job == "Director")
            .map(|person| PersonCredit {
                id: person.id,
                name: person.name.clone(),
            })
            .collect();

        let writers = credits
            .crew
            .iter()
            .filter(|person| WRITER_JOBS.contains(&person.job.as_str()))
            .map(|person| WriterCredit {
                id: person.id,
                name: person.name.clone(),
                job: person.job.clone(),
            })
            .collect();

        let cast = credits
            .cast
            .into_iter()
            .map(|actor| CastMember {
                id: actor.id,
                name: actor.name,
                character: actor.character,
                profile_path: actor.profile_path,
            })
            .collect();

        Self {
            certification,
            formatted_runtime: detail.runtime.map(format_runtime),
            formatted_budget: format_compact_usd(i64::try_from(detail.budget).unwrap_or(i64::MAX)),
            formatted_revenue: format_compact_usd(i64::try_from(detail.revenue).unwrap_or(i64::MAX)),
            formatted_profit: format_compact_usd(profit),
            directors,
            writers,
            cast,
            logo_path: assets.logo_path,
            clean_backdrop_path: assets.backdrop_path,
            detail,
        }
    }
}

/// Formats minutes as `"{h}h {m}m"`
pub fn format_runtime(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Compact USD notation with at most one fraction digit (`$1.5M`, `-$20M`).
/// Zero is rendered as `N/A` because the catalog uses it for unknown figures.
pub fn format_compact_usd(amount: i64) -> String {
    if amount == 0 {
        return "N/A".to_string();
    }

    const SUFFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs() as f64;

    let mut body = format_one_decimal(abs);
    for (index, (scale, suffix)) in SUFFIXES.iter().enumerate() {
        if abs < *scale {
            continue;
        }
        let scaled = (abs / scale * 10.0).round() / 10.0;
        // 999.95K rounds up into the next unit
        body = if scaled >= 1000.0 && index > 0 {
            let (bigger_scale, bigger_suffix) = SUFFIXES[index - 1];
            format!("{}{}", format_one_decimal(abs / bigger_scale), bigger_suffix)
        } else {
            format!("{}{}", format_one_decimal(scaled), suffix)
        };
        break;
    }

    format!("{}${}", sign, body)
}

fn format_one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as u64)
    } else {
        format!("{:.1}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CastEntry, CrewEntry};

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(135), "2h 15m");
        assert_eq!(format_runtime(45), "0h 45m");
    }

    #[test]
    fn test_format_compact_usd() {
        assert_eq!(format_compact_usd(0), "N/A");
        assert_eq!(format_compact_usd(999), "$999");
        assert_eq!(format_compact_usd(12_345), "$12.3K");
        assert_eq!(format_compact_usd(1_500_000), "$1.5M");
        assert_eq!(format_compact_usd(250_000_000), "$250M");
        assert_eq!(format_compact_usd(123_456_789), "$123.5M");
        assert_eq!(format_compact_usd(1_234_000_000), "$1.2B");
        assert_eq!(format_compact_usd(-5_000_000), "-$5M");
        assert_eq!(format_compact_usd(999_960), "$1M");
    }

    #[test]
    fn test_build_details_view() {
        let detail: CatalogItemDetail = serde_json::from_value(serde_json::json!({
            "id": 693134,
            "title": "Dune: Part Two",
            "budget": 190_000_000u64,
            "revenue": 714_000_000u64,
            "runtime": 167
        }))
        .unwrap();
        let credits = Credits {
            cast: vec![CastEntry {
                id: 1,
                name: "Timothée Chalamet".to_string(),
                character: Some("Paul Atreides".to_string()),
                profile_path: None,
            }],
            crew: vec![
                CrewEntry { id: 2, name: "Denis Villeneuve".to_string(), job: "Director".to_string() },
                CrewEntry { id: 3, name: "Jon Spaihts".to_string(), job: "Screenplay".to_string() },
                CrewEntry { id: 4, name: "Hans Zimmer".to_string(), job: "Original Music Composer".to_string() },
            ],
        };

        let view = MovieDetailsView::build(detail, &ReleaseDatesResponse::default(), credits, ImageAssets::default());

        assert_eq!(view.certification, "NR");
        assert_eq!(view.formatted_runtime.as_deref(), Some("2h 47m"));
        assert_eq!(view.formatted_budget, "$190M");
        assert_eq!(view.formatted_revenue, "$714M");
        assert_eq!(view.formatted_profit, "$524M");
        assert_eq!(view.directors.len(), 1);
        assert_eq!(view.writers.len(), 1);
        assert_eq!(view.writers[0].job, "Screenplay");
        assert_eq!(view.cast.len(), 1);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "Dune: Part Two");
        assert_eq!(json["formatted_profit"], "$524M");
    }
}
