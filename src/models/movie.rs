use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::CatalogId;

/// Name returned for genre ids missing from the vocabulary
pub const UNKNOWN_GENRE: &str = "Unknown";

/// A catalog search hit used to resolve a rated movie to a catalog id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogMovie {
    pub id: CatalogId,
    pub title: String,
    pub release_year: Option<i32>,
}

/// One entry of the external "related movies" feed for a seed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateSource {
    pub catalog_id: CatalogId,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub genre_ids: Vec<u32>,
    pub popularity: f64,
}

/// Genre id → display name vocabulary
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenreMap(HashMap<u32, String>);

impl GenreMap {
    /// Display name for a genre id, `"Unknown"` when unmapped
    pub fn name(&self, genre_id: u32) -> &str {
        self.0
            .get(&genre_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_GENRE)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u32, String)> for GenreMap {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Reduces a `YYYY-MM-DD` release date to its year
pub fn release_year(release_date: Option<&str>) -> Option<i32> {
    release_date
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        .map(|d| d.year())
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged result envelope used by TMDB list endpoints
#[derive(Debug, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Movie entry shared by `/search/movie` and `/movie/{id}/recommendations`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: CatalogId,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub popularity: f64,
}

impl From<TmdbMovie> for CatalogMovie {
    fn from(movie: TmdbMovie) -> Self {
        Self {
            id: movie.id,
            release_year: release_year(movie.release_date.as_deref()),
            title: movie.title,
        }
    }
}

impl From<TmdbMovie> for CandidateSource {
    fn from(movie: TmdbMovie) -> Self {
        Self {
            catalog_id: movie.id,
            year: release_year(movie.release_date.as_deref()),
            title: movie.title,
            overview: movie.overview.filter(|o| !o.is_empty()),
            poster_path: movie.poster_path,
            vote_average: movie.vote_average,
            genre_ids: movie.genre_ids,
            popularity: movie.popularity,
        }
    }
}

/// Response of `/genre/movie/list`
#[derive(Debug, Deserialize)]
pub struct TmdbGenreList {
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

impl From<TmdbGenreList> for GenreMap {
    fn from(list: TmdbGenreList) -> Self {
        list.genres.into_iter().map(|g| (g.id, g.name)).collect()
    }
}
