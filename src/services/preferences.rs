use serde::Serialize;
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::RatedCatalog,
};

/// Ratings at or above this count as "high rated" for genre affinity
const HIGH_RATING: f64 = 8.0;

const AVG_RATING_WEIGHT: f64 = 0.4;
const FREQUENCY_WEIGHT: f64 = 0.3;
const HIGH_RATED_WEIGHT: f64 = 0.3;
const WEIGHT_SCALE: f64 = 10.0;

/// Affinity weight of one genre
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenreWeight {
    pub genre: String,
    pub weight: f64,
}

/// Per-genre affinity derived from a rated catalog
///
/// Genres are kept in order of first appearance in the catalog, which is
/// the tie-break order when genres are ranked by weight.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceProfile {
    pub average_rating: f64,
    pub genre_weights: Vec<GenreWeight>,
    pub seed_threshold: f64,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Default)]
struct GenreStats {
    count: usize,
    total_rating: f64,
    high_rated: usize,
}

impl PreferenceProfile {
    /// Builds the profile for a non-empty catalog
    pub fn analyze(catalog: &RatedCatalog, seed_threshold: f64) -> AppResult<Self> {
        let total_movies = catalog.len();
        let average_rating = catalog.average_rating().ok_or_else(|| {
            AppError::InvalidInput("Cannot analyze an empty rating history".to_string())
        })?;

        let mut order: Vec<String> = Vec::new();
        let mut stats: HashMap<String, GenreStats> = HashMap::new();

        for movie in catalog.movies() {
            for genre in &movie.genres {
                let entry = stats.entry(genre.clone()).or_insert_with(|| {
                    order.push(genre.clone());
                    GenreStats::default()
                });
                entry.count += 1;
                entry.total_rating += movie.rating;
                if movie.rating >= HIGH_RATING {
                    entry.high_rated += 1;
                }
            }
        }

        let genre_weights: Vec<GenreWeight> = order
            .into_iter()
            .map(|genre| {
                let s = &stats[&genre];
                let count = s.count as f64;
                let avg_genre_rating = s.total_rating / count;
                let frequency_weight = count / total_movies as f64;
                let high_rated_ratio = s.high_rated as f64 / count;

                let weight = (AVG_RATING_WEIGHT * avg_genre_rating
                    + FREQUENCY_WEIGHT * frequency_weight
                    + HIGH_RATED_WEIGHT * high_rated_ratio)
                    * WEIGHT_SCALE;

                GenreWeight { genre, weight }
            })
            .collect();

        let index = genre_weights
            .iter()
            .enumerate()
            .map(|(i, gw)| (gw.genre.clone(), i))
            .collect();

        tracing::debug!(
            movies = total_movies,
            genres = genre_weights.len(),
            average_rating,
            "Preference profile built"
        );

        Ok(Self {
            average_rating,
            genre_weights,
            seed_threshold,
            index,
        })
    }

    pub fn weight(&self, genre: &str) -> Option<f64> {
        self.index.get(genre).map(|&i| self.genre_weights[i].weight)
    }
}
