//! Display metadata lookups
//!
//! Providers enrich recommendations with posters, overviews and ratings. They
//! run after ranking and can never change which titles are recommended: any
//! failure degrades to placeholder details.
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Movie, MovieDetails},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch display details for a catalog movie
    async fn fetch_details(&self, movie: &Movie) -> AppResult<MovieDetails>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetches details, falling back to placeholders on any failure
pub async fn enrich(provider: Option<&dyn MetadataProvider>, movie: &Movie) -> MovieDetails {
    let Some(provider) = provider else {
        return MovieDetails::placeholder(movie.id);
    };

    match provider.fetch_details(movie).await {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!(
                error = %e,
                title = %movie.title,
                provider = provider.name(),
                "Metadata lookup failed, using placeholders"
            );
            MovieDetails::placeholder(movie.id)
        }
    }
}

/// Enriches several movies concurrently, preserving input order
pub async fn enrich_all(
    provider: Option<Arc<dyn MetadataProvider>>,
    movies: Vec<Movie>,
) -> Vec<MovieDetails> {
    let Some(provider) = provider else {
        return movies
            .iter()
            .map(|m| MovieDetails::placeholder(m.id))
            .collect();
    };

    let handles: Vec<_> = movies
        .into_iter()
        .map(|movie| {
            let provider = Arc::clone(&provider);
            let fallback_id = movie.id;
            let handle =
                tokio::spawn(async move { enrich(Some(provider.as_ref()), &movie).await });
            (fallback_id, handle)
        })
        .collect();

    let mut details = Vec::with_capacity(handles.len());
    for (fallback_id, handle) in handles {
        match handle.await {
            Ok(d) => details.push(d),
            Err(e) => {
                tracing::error!(error = %e, "Metadata task panicked");
                details.push(MovieDetails::placeholder(fallback_id));
            }
        }
    }

    details
}
