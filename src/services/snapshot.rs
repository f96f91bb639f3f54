//! Immutable per-language catalog snapshots.
//!
//! A snapshot bundles the cleaned catalog, its genre vectors and its cluster
//! labels. Snapshots are built as one blocking batch and published by
//! swapping an `Arc`, so a reader either sees the old snapshot or the new one.
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, Language, SnapshotSummary},
    services::{
        catalog_loader::{load_catalog, CatalogSources},
        clustering::{assign_clusters, KMeansConfig, LabeledCatalog},
        vectorizer::{vectorize_genres, GenreVectorTable},
    },
};

/// Everything the recommender needs for one language selection
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub language: Language,
    pub vectors: GenreVectorTable,
    pub labeled: LabeledCatalog,
    pub built_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn catalog(&self) -> &Catalog {
        self.labeled.catalog()
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            language: self.language,
            movies: self.catalog().len(),
            genres: self.vectors.dimensions(),
            clusters: self.labeled.clusters().k(),
            built_at: self.built_at,
        }
    }
}

/// Load, vectorize and cluster one language's catalog
pub fn build_snapshot(
    sources: &CatalogSources,
    language: Language,
    kmeans: &KMeansConfig,
) -> AppResult<CatalogSnapshot> {
    let start = Instant::now();

    let catalog = load_catalog(sources, language)?;
    let vectors = vectorize_genres(&catalog);
    let labeled = assign_clusters(catalog, &vectors, kmeans)?;

    tracing::info!(
        language = %language,
        movies = labeled.catalog().len(),
        genres = vectors.dimensions(),
        processing_time_ms = start.elapsed().as_millis(),
        "Catalog snapshot built"
    );

    Ok(CatalogSnapshot {
        language,
        vectors,
        labeled,
        built_at: Utc::now(),
    })
}

/// Shared store of published snapshots
///
/// Builds for one language are serialized, so concurrent first requests
/// share a single load-and-cluster pass.
pub struct SnapshotStore {
    sources: CatalogSources,
    kmeans: KMeansConfig,
    snapshots: RwLock<HashMap<Language, Arc<CatalogSnapshot>>>,
    build_locks: HashMap<Language, Mutex<()>>,
    builds: AtomicUsize,
}

impl SnapshotStore {
    pub fn new(sources: CatalogSources, kmeans: KMeansConfig) -> Self {
        Self {
            sources,
            kmeans,
            snapshots: RwLock::new(HashMap::new()),
            build_locks: Language::ALL.into_iter().map(|l| (l, Mutex::new(()))).collect(),
            builds: AtomicUsize::new(0),
        }
    }

    /// Returns the published snapshot, building it on first use
    pub async fn get_or_build(&self, language: Language) -> AppResult<Arc<CatalogSnapshot>> {
        if let Some(snapshot) = self.current(language).await {
            return Ok(snapshot);
        }

        let _guard = self.build_lock(language)?.lock().await;

        // Whoever held the lock before us may have published already
        if let Some(snapshot) = self.current(language).await {
            return Ok(snapshot);
        }

        let snapshot = self.build(language).await?;
        self.snapshots
            .write()
            .await
            .insert(language, Arc::clone(&snapshot));

        Ok(snapshot)
    }

    /// Rebuilds from the sources and replaces the published snapshot
    pub async fn reload(&self, language: Language) -> AppResult<Arc<CatalogSnapshot>> {
        let _guard = self.build_lock(language)?.lock().await;

        let snapshot = self.build(language).await?;
        self.snapshots
            .write()
            .await
            .insert(language, Arc::clone(&snapshot));

        tracing::info!(language = %language, "Catalog snapshot published");
        Ok(snapshot)
    }

    /// Languages that currently have a published snapshot
    pub async fn published(&self) -> Vec<Language> {
        let snapshots = self.snapshots.read().await;
        Language::ALL
            .into_iter()
            .filter(|l| snapshots.contains_key(l))
            .collect()
    }

    /// Number of snapshot builds started since the store was created
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    async fn current(&self, language: Language) -> Option<Arc<CatalogSnapshot>> {
        self.snapshots.read().await.get(&language).cloned()
    }

    fn build_lock(&self, language: Language) -> AppResult<&Mutex<()>> {
        self.build_locks
            .get(&language)
            .ok_or_else(|| AppError::Internal(format!("No build lock for language {}", language)))
    }

    async fn build(&self, language: Language) -> AppResult<Arc<CatalogSnapshot>> {
        self.builds.fetch_add(1, Ordering::Relaxed);

        let sources = self.sources.clone();
        let kmeans = self.kmeans.clone();

        let snapshot = tokio::task::spawn_blocking(move || {
            build_snapshot(&sources, language, &kmeans)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Snapshot build task failed: {}", e)))??;

        Ok(Arc::new(snapshot))
    }
}
