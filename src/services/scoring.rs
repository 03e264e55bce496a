use rand::Rng;

use crate::{
    models::{Candidate, GenreMap, ScoredRecommendation},
    services::{jitter::JitterConfig, preferences::PreferenceProfile},
};

/// Weights of the composite ranking score
///
/// `score = vote_average·va + genre_match·gm + match_count·log2(n + 1)
///          + popularity·log10(p + 1)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub vote_average: f64,
    pub genre_match: f64,
    pub match_count: f64,
    pub popularity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            vote_average: 0.6,
            genre_match: 0.2,
            match_count: 2.0,
            popularity: 0.2,
        }
    }
}

impl ScoringWeights {
    pub fn score(&self, vote_average: f64, genre_match: f64, match_count: usize, popularity: f64) -> f64 {
        self.vote_average * vote_average
            + self.genre_match * genre_match
            + self.match_count * (match_count as f64 + 1.0).log2()
            + self.popularity * (popularity.max(0.0) + 1.0).log10()
    }
}

/// Sum of the user's affinity for each of a candidate's genres
pub fn genre_match_score(genre_ids: &[u32], profile: &PreferenceProfile, genres: &GenreMap) -> f64 {
    genre_ids
        .iter()
        .map(|&id| profile.weight(genres.name(id)).unwrap_or(0.0))
        .sum()
}

/// Scores every candidate; output order follows input order
pub fn score_candidates<R: Rng + ?Sized>(
    candidates: Vec<Candidate>,
    profile: &PreferenceProfile,
    genres: &GenreMap,
    weights: &ScoringWeights,
    jitter: &JitterConfig,
    rng: &mut R,
) -> Vec<ScoredRecommendation> {
    candidates
        .into_iter()
        .map(|candidate| {
            let match_count = candidate.match_count();
            let source = candidate.source;

            let genre_match = genre_match_score(&source.genre_ids, profile, genres)
                * jitter.genre_match_factor(rng);
            let score = weights.score(source.vote_average, genre_match, match_count, source.popularity);

            ScoredRecommendation {
                catalog_id: source.catalog_id,
                genres: source
                    .genre_ids
                    .iter()
                    .map(|&id| genres.name(id).to_string())
                    .collect(),
                title: source.title,
                year: source.year,
                overview: source.overview,
                poster_path: source.poster_path,
                vote_average: source.vote_average,
                score,
                match_count,
            }
        })
        .collect()
}
