/// Movie metadata provider abstraction
///
/// The recommendation pipeline only talks to the outside world through this
/// trait: title search to resolve catalog ids, the per-movie "related movies"
/// feed, and the genre vocabulary. Transport and caching live in the
/// implementations.
use crate::{
    error::AppResult,
    models::{CandidateSource, CatalogId, CatalogMovie, GenreMap},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Search the catalog for a title, optionally narrowed by release year
    ///
    /// Returns raw hits in provider relevance order; callers decide which hit
    /// (if any) is the same movie.
    async fn search_movies(&self, title: &str, year: Option<i32>) -> AppResult<Vec<CatalogMovie>>;

    /// Related movies for one catalog entry
    async fn recommendations_for(&self, catalog_id: CatalogId) -> AppResult<Vec<CandidateSource>>;

    /// Genre id → name vocabulary
    async fn genre_vocabulary(&self) -> AppResult<GenreMap>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
