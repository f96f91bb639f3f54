pub mod catalog_loader;
pub mod clustering;
pub mod genre_filter;
pub mod metadata;
pub mod ranker;
pub mod snapshot;
pub mod title_search;
pub mod vectorizer;
