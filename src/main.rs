use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movieflex_api::{
    config::Config,
    db::{create_redis_client, Cache},
    routes::{create_router, AppState},
    services::{
        catalog_loader::CatalogSources,
        clustering::KMeansConfig,
        metadata::{MetadataProvider, TmdbProvider},
        snapshot::SnapshotStore,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movieflex_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let snapshots = SnapshotStore::new(
        CatalogSources::from_config(&config),
        KMeansConfig::new(config.cluster_count, config.cluster_seed),
    );

    for language in config.preload_languages()? {
        let snapshot = snapshots.get_or_build(language).await?;
        tracing::info!(
            language = %language,
            movies = snapshot.catalog().len(),
            "Catalog preloaded"
        );
    }

    tracing::info!(languages = ?snapshots.published().await, "Snapshots ready");

    let (cache, cache_writer) = match config.redis_url.as_deref() {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?);
            tracing::info!("Redis metadata cache enabled");
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let mut state =
        AppState::new(snapshots).with_num_recommendations(config.num_recommendations);

    match config.tmdb_api_key.clone() {
        Some(api_key) => {
            let provider: Arc<dyn MetadataProvider> =
                Arc::new(TmdbProvider::new(api_key, config.tmdb_api_url.clone(), cache));
            state = state.with_metadata(provider);
        }
        None => tracing::warn!("TMDB_API_KEY not set, movie details will use placeholders"),
    }

    let app = create_router(Arc::new(state));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
