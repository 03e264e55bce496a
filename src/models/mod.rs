mod movie;
mod rating;
mod recommendation;

pub use movie::{
    release_year, CandidateSource, CatalogMovie, GenreMap, TmdbGenre, TmdbGenreList, TmdbMovie,
    TmdbPage, UNKNOWN_GENRE,
};
pub use rating::{ImportStats, RatedCatalog, RatedMovie};
pub use recommendation::{
    Candidate, FacetFilter, Facets, RecommendationView, ScoredRecommendation,
};

/// External catalog identifier (TMDB movie id)
pub type CatalogId = u64;
