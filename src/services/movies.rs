use std::sync::Arc;

use chrono::{Months, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        release_date, CatalogItemSummary, ImageAssets, ItemId, LanguageKind, MovieDetailsView,
        MovieLanguage,
    },
    services::catalog::{CatalogClient, DiscoverQuery, SortBy},
};

/// Number of items on the now-playing shelf
pub const NOW_PLAYING_LIMIT: usize = 7;

const NOW_PLAYING_WINDOW_MONTHS: u32 = 2;
const NOW_PLAYING_MIN_VOTES: u32 = 100;

/// Browsing features layered over the catalog: search, now playing, the
/// detail page and spoken languages.
pub struct MovieService {
    catalog: Arc<dyn CatalogClient>,
}

impl MovieService {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    /// Title search; a blank query returns the most popular titles instead
    pub async fn search(&self, query: &str) -> AppResult<Vec<CatalogItemSummary>> {
        let query = query.trim();
        if query.is_empty() {
            let page = self
                .catalog
                .discover(&DiscoverQuery::new(SortBy::PopularityDesc))
                .await?;
            return Ok(page.results);
        }

        self.catalog.search(query).await
    }

    /// Most popular titles carrying every genre in `genres`
    pub async fn by_genres(&self, genres: &[i64]) -> AppResult<Vec<CatalogItemSummary>> {
        if genres.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one genre id is required".to_string(),
            ));
        }

        let mut query = DiscoverQuery::new(SortBy::PopularityDesc);
        query.with_genres = genres.to_vec();

        let page = self.catalog.discover(&query).await?;
        tracing::debug!(?genres, results = page.results.len(), "Genre discovery served");
        Ok(page.results)
    }

    pub async fn now_playing(&self) -> AppResult<Vec<CatalogItemSummary>> {
        self.now_playing_at(Utc::now().date_naive()).await
    }

    /// Popular, well-voted releases from the last two months with
    /// language-neutral posters where the catalog has one.
    pub async fn now_playing_at(&self, today: NaiveDate) -> AppResult<Vec<CatalogItemSummary>> {
        let window_start = today
            .checked_sub_months(Months::new(NOW_PLAYING_WINDOW_MONTHS))
            .unwrap_or(NaiveDate::MIN);

        let mut query = DiscoverQuery::new(SortBy::PopularityDesc);
        query.release_date_gte = Some(window_start);
        query.release_date_lte = Some(today);

        let page = self.catalog.discover(&query).await?;

        let shelf: Vec<CatalogItemSummary> = page
            .results
            .into_iter()
            .filter(|item| {
                item.poster_path.is_some()
                    && item.vote_count > NOW_PLAYING_MIN_VOTES
                    && release_date(item.release_date.as_deref())
                        .is_some_and(|date| date >= window_start && date <= today)
            })
            .take(NOW_PLAYING_LIMIT)
            .collect();

        let mut tasks = Vec::with_capacity(shelf.len());
        for item in shelf {
            let catalog = Arc::clone(&self.catalog);
            tasks.push(tokio::spawn(with_clean_poster(catalog, item)));
        }

        let mut movies = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(item) => movies.push(item),
                Err(e) => tracing::error!(error = %e, "Poster task join error"),
            }
        }

        tracing::info!(count = movies.len(), since = %window_start, "Now playing shelf built");
        Ok(movies)
    }

    /// Detail page: the catalog record with certification, credits and
    /// formatted figures. Missing artwork is not an error.
    pub async fn details(&self, id: ItemId) -> AppResult<MovieDetailsView> {
        let (detail, release_dates, credits) = tokio::try_join!(
            self.catalog.item_detail(id),
            self.catalog.release_dates(id),
            self.catalog.credits(id),
        )?;

        let assets = match self.catalog.item_images(id).await {
            Ok(images) => ImageAssets::from(&images),
            Err(e) => {
                tracing::warn!(item_id = id, error = %e, "Images unavailable for detail page");
                ImageAssets::default()
            }
        };

        Ok(MovieDetailsView::build(detail, &release_dates, credits, assets))
    }

    /// Original language first, then every other spoken language
    pub async fn languages(&self, id: ItemId) -> AppResult<Vec<MovieLanguage>> {
        let detail = self.catalog.item_detail(id).await?;
        let original = detail.original_language.as_str();

        let mut languages = Vec::with_capacity(detail.spoken_languages.len() + 1);
        if !original.is_empty() {
            languages.push(MovieLanguage::resolve(original, None, None, LanguageKind::Original));
        }

        languages.extend(
            detail
                .spoken_languages
                .iter()
                .filter(|lang| lang.iso_639_1 != original)
                .map(|lang| {
                    MovieLanguage::resolve(
                        &lang.iso_639_1,
                        lang.english_name.as_deref(),
                        lang.name.as_deref(),
                        LanguageKind::Subtitled,
                    )
                }),
        );

        Ok(languages)
    }
}

async fn with_clean_poster(
    catalog: Arc<dyn CatalogClient>,
    mut item: CatalogItemSummary,
) -> CatalogItemSummary {
    match catalog.item_images(item.id).await {
        Ok(images) => {
            if let Some(poster) = images.clean_poster() {
                item.poster_path = Some(poster.to_string());
            }
        }
        Err(e) => {
            tracing::debug!(item_id = item.id, error = %e, "Keeping original poster");
        }
    }
    item
}
