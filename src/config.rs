use serde::Deserialize;

use crate::services::{
    jitter::{JitterConfig, JitterRange},
    scoring::ScoringWeights,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key (v3 auth)
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language for titles, overviews and genre names
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Redis connection URL; lookups are not cached when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

/// Tunables of the recommendation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Minimum rating for a movie to seed lookups
    pub seed_threshold: f64,
    pub target_seeds: usize,
    /// Top-rated movies taken per main genre while walking ranked genres
    pub seeds_per_genre: usize,
    /// Size of the authoritative ranked list
    pub top_n: usize,
    /// Upper bound on catalog searches per imported history
    pub resolve_limit: usize,
    /// Concurrent external lookups; 1 issues them strictly in sequence
    pub lookup_concurrency: usize,
    pub weights: ScoringWeights,
    pub jitter: JitterConfig,
    /// Fixed seed for the jitter generator
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed_threshold: 7.0,
            target_seeds: 10,
            seeds_per_genre: 2,
            top_n: 8,
            resolve_limit: 40,
            lookup_concurrency: 4,
            weights: ScoringWeights::default(),
            jitter: JitterConfig::disabled(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = envy::prefixed("ENGINE_")
            .from_env::<EngineSettings>()
            .map_err(|e| anyhow::anyhow!("Failed to load engine config: {}", e))?;
        settings.try_into()
    }
}

/// Flat `ENGINE_*` environment representation of [`EngineConfig`]
#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    #[serde(default = "default_seed_threshold")]
    pub seed_threshold: f64,
    #[serde(default = "default_target_seeds")]
    pub target_seeds: usize,
    #[serde(default = "default_seeds_per_genre")]
    pub seeds_per_genre: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_resolve_limit")]
    pub resolve_limit: usize,
    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,

    #[serde(default = "default_weight_vote_average")]
    pub weight_vote_average: f64,
    #[serde(default = "default_weight_genre_match")]
    pub weight_genre_match: f64,
    #[serde(default = "default_weight_match_count")]
    pub weight_match_count: f64,
    #[serde(default = "default_weight_popularity")]
    pub weight_popularity: f64,

    #[serde(default)]
    pub jitter_enabled: bool,
    #[serde(default = "default_genre_weight_jitter_min")]
    pub genre_weight_jitter_min: f64,
    #[serde(default = "default_genre_weight_jitter_max")]
    pub genre_weight_jitter_max: f64,
    #[serde(default = "default_seeds_per_genre_spread")]
    pub seeds_per_genre_spread: usize,
    #[serde(default = "default_genre_match_jitter_min")]
    pub genre_match_jitter_min: f64,
    #[serde(default = "default_genre_match_jitter_max")]
    pub genre_match_jitter_max: f64,

    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_seed_threshold() -> f64 {
    7.0
}

fn default_target_seeds() -> usize {
    10
}

fn default_seeds_per_genre() -> usize {
    2
}

fn default_top_n() -> usize {
    8
}

fn default_resolve_limit() -> usize {
    40
}

fn default_lookup_concurrency() -> usize {
    4
}

fn default_weight_vote_average() -> f64 {
    0.6
}

fn default_weight_genre_match() -> f64 {
    0.2
}

fn default_weight_match_count() -> f64 {
    2.0
}

fn default_weight_popularity() -> f64 {
    0.2
}

fn default_genre_weight_jitter_min() -> f64 {
    0.8
}

fn default_genre_weight_jitter_max() -> f64 {
    1.2
}

fn default_seeds_per_genre_spread() -> usize {
    1
}

fn default_genre_match_jitter_min() -> f64 {
    0.9
}

fn default_genre_match_jitter_max() -> f64 {
    1.1
}

fn jitter_range(name: &str, min: f64, max: f64) -> anyhow::Result<JitterRange> {
    anyhow::ensure!(
        min.is_finite() && max.is_finite(),
        "{} jitter bounds must be finite, got {}..{}",
        name,
        min,
        max
    );
    Ok(JitterRange::new(min, max))
}

impl TryFrom<EngineSettings> for EngineConfig {
    type Error = anyhow::Error;

    fn try_from(s: EngineSettings) -> anyhow::Result<Self> {
        let jitter = if s.jitter_enabled {
            JitterConfig {
                genre_weight: Some(jitter_range(
                    "Genre weight",
                    s.genre_weight_jitter_min,
                    s.genre_weight_jitter_max,
                )?),
                seeds_per_genre_spread: s.seeds_per_genre_spread,
                genre_match: Some(jitter_range(
                    "Genre match",
                    s.genre_match_jitter_min,
                    s.genre_match_jitter_max,
                )?),
            }
        } else {
            JitterConfig::disabled()
        };

        Ok(Self {
            seed_threshold: s.seed_threshold,
            target_seeds: s.target_seeds,
            seeds_per_genre: s.seeds_per_genre,
            top_n: s.top_n,
            resolve_limit: s.resolve_limit,
            lookup_concurrency: s.lookup_concurrency.max(1),
            weights: ScoringWeights {
                vote_average: s.weight_vote_average,
                genre_match: s.weight_genre_match,
                match_count: s.weight_match_count,
                popularity: s.weight_popularity,
            },
            jitter,
            rng_seed: s.rng_seed,
        })
    }
}
