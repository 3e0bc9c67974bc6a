use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use boxoffice_api::{
    config::{Config, TrendingBackend},
    create_router,
    db::{create_pool, create_redis_client, run_migrations, Cache, CacheWriterHandle},
    services::{
        catalog::{CachedCatalog, CatalogClient, TmdbCatalog},
        trending::{AppwriteTrendingStore, MemoryTrendingStore, PgTrendingStore, TrendingStore},
        BoxOfficeService, MovieService, TrendingService,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("boxoffice_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (catalog, cache_handle) = build_catalog(&config)?;
    let trending_store = build_trending_store(&config).await?;

    let state = Arc::new(AppState {
        box_office: Arc::new(BoxOfficeService::new(
            Arc::clone(&catalog),
            config.box_office_settings(),
        )),
        trending: Arc::new(TrendingService::new(
            Arc::clone(&trending_store),
            config.image_base_url.clone(),
        )),
        movies: Arc::new(MovieService::new(catalog)),
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %addr,
        trending_store = trending_store.name(),
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// TMDB client, wrapped in the Redis cache when `REDIS_URL` is set
fn build_catalog(
    config: &Config,
) -> anyhow::Result<(Arc<dyn CatalogClient>, Option<CacheWriterHandle>)> {
    let tmdb: Arc<dyn CatalogClient> = Arc::new(TmdbCatalog::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    match &config.redis_url {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?);
            tracing::info!("Catalog response cache enabled");
            Ok((Arc::new(CachedCatalog::new(tmdb, cache)), Some(handle)))
        }
        None => Ok((tmdb, None)),
    }
}

async fn build_trending_store(config: &Config) -> anyhow::Result<Arc<dyn TrendingStore>> {
    let store: Arc<dyn TrendingStore> = match config.trending_backend {
        TrendingBackend::Appwrite => Arc::new(AppwriteTrendingStore::new(config.appwrite_settings())),
        TrendingBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgTrendingStore::new(pool))
        }
        TrendingBackend::Memory => {
            tracing::warn!("Using in-memory trending store; counts are lost on restart");
            Arc::new(MemoryTrendingStore::new())
        }
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
