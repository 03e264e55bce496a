use serde::{Deserialize, Serialize};

use super::{CandidateSource, CatalogId, RatedMovie};

/// A related movie proposed by one or more seeds, not yet scored
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub source: CandidateSource,
    /// Seeds that proposed this candidate, in lookup order
    pub seed_movies: Vec<RatedMovie>,
}

impl Candidate {
    pub fn new(source: CandidateSource, seed: RatedMovie) -> Self {
        Self {
            source,
            seed_movies: vec![seed],
        }
    }

    pub fn catalog_id(&self) -> CatalogId {
        self.source.catalog_id
    }

    pub fn match_count(&self) -> usize {
        self.seed_movies.len()
    }
}

/// A scored, ranked suggestion handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredRecommendation {
    pub catalog_id: CatalogId,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub score: f64,
    pub match_count: usize,
    pub genres: Vec<String>,
}

/// Post-ranking view restriction; `None` fields match everything
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetFilter {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl FacetFilter {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.year.is_none()
    }

    pub fn matches(&self, recommendation: &ScoredRecommendation) -> bool {
        let genre_ok = self
            .genre
            .as_ref()
            .map_or(true, |g| recommendation.genres.contains(g));
        let year_ok = self.year.map_or(true, |y| recommendation.year == Some(y));
        genre_ok && year_ok
    }
}

/// Facet values offered for the authoritative ranked list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Facets {
    /// Ascending
    pub genres: Vec<String>,
    /// Descending
    pub years: Vec<i32>,
}

/// Snapshot of the curated results returned to clients
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendationView {
    pub recommendations: Vec<ScoredRecommendation>,
    /// Size of the authoritative ranked list
    pub total: usize,
    pub filter: FacetFilter,
    pub facets: Facets,
}
