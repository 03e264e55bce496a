use serde::{Deserialize, Serialize};

use super::CatalogId;

/// A single movie from the user's rating history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatedMovie {
    /// Identifier from the rating export (IMDb `Const`, e.g. "tt0113277")
    pub external_rating_id: String,
    /// User rating on the source 0-10 scale
    pub rating: f64,
    pub title: String,
    pub year: Option<i32>,
    /// Genres in export order; the first one is the main genre
    pub genres: Vec<String>,
    /// Resolved external catalog id; unresolved movies cannot seed lookups
    pub catalog_id: Option<CatalogId>,
}

impl RatedMovie {
    pub fn main_genre(&self) -> Option<&str> {
        self.genres.first().map(String::as_str)
    }
}

/// The user's normalized rating history
///
/// Positions in `movies` are the stable identity of each entry for the
/// lifetime of the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RatedCatalog {
    movies: Vec<RatedMovie>,
}

impl RatedCatalog {
    pub fn new(movies: Vec<RatedMovie>) -> Self {
        Self { movies }
    }

    pub fn movies(&self) -> &[RatedMovie] {
        &self.movies
    }

    pub fn movies_mut(&mut self) -> &mut [RatedMovie] {
        &mut self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn average_rating(&self) -> Option<f64> {
        if self.movies.is_empty() {
            return None;
        }
        let total: f64 = self.movies.iter().map(|m| m.rating).sum();
        Some(total / self.movies.len() as f64)
    }

    pub fn resolved_count(&self) -> usize {
        self.movies.iter().filter(|m| m.catalog_id.is_some()).count()
    }
}

/// Summary of an imported rating history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportStats {
    pub movies: usize,
    pub average_rating: f64,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
    /// Movies matched to a catalog id
    pub resolved: usize,
    pub imported_at: chrono::DateTime<chrono::Utc>,
}

impl ImportStats {
    pub fn from_catalog(catalog: &RatedCatalog) -> Self {
        let years = catalog.movies().iter().filter_map(|m| m.year);

        Self {
            movies: catalog.len(),
            average_rating: catalog.average_rating().unwrap_or_default(),
            earliest_year: years.clone().min(),
            latest_year: years.max(),
            resolved: catalog.resolved_count(),
            imported_at: chrono::Utc::now(),
        }
    }
}
