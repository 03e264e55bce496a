use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use crate::{
    config::EngineConfig,
    error::{AppError, AppResult},
    models::{FacetFilter, GenreMap, ImportStats, RatedCatalog, RecommendationView},
    services::{
        aggregator::aggregate_candidates,
        catalog::{resolve_catalog_ids, ResolvePolicy},
        curator::Curator,
        ingest::parse_ratings_csv,
        preferences::PreferenceProfile,
        providers::MovieProvider,
        scoring::score_candidates,
        seeds::{select_seeds, SeedPolicy},
        watched::{filter_watched, WatchedIndex},
    },
};

/// Result of importing a rating history
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub stats: ImportStats,
    pub recommendations: RecommendationView,
}

#[derive(Default)]
struct Session {
    catalog: Option<Arc<RatedCatalog>>,
    genres: Arc<GenreMap>,
    profile: Option<PreferenceProfile>,
    curator: Curator,
    /// Bumped whenever a generation starts or an import commits
    generation: u64,
    /// Bumped whenever an import starts
    imports: u64,
}

/// Output of one pipeline run, not yet committed
struct Generated {
    profile: PreferenceProfile,
    curator: Curator,
}

/// Session-scoped recommendation pipeline
///
/// One engine holds one imported history. Pipelines run without holding the
/// session lock; catalog, profile and ranked list are replaced together in
/// one write, so readers see either the previous state or the new one.
pub struct RecommendationEngine {
    provider: Arc<dyn MovieProvider>,
    config: EngineConfig,
    rng: Mutex<StdRng>,
    session: RwLock<Session>,
}

impl RecommendationEngine {
    pub fn new(provider: Arc<dyn MovieProvider>, config: EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            provider,
            config,
            rng: Mutex::new(rng),
            session: RwLock::new(Session::default()),
        }
    }

    /// Parses, resolves and generates for a rating history, then commits it
    ///
    /// The previous history stays visible until the new one is committed.
    /// Nothing is committed when the file fails validation, and an import
    /// overtaken by a newer one fails with `Conflict`.
    pub async fn import_history(&self, raw_csv: &str) -> AppResult<ImportOutcome> {
        let mut catalog = parse_ratings_csv(raw_csv)?;

        let import = {
            let mut session = self.session.write().await;
            session.imports += 1;
            session.imports
        };

        let policy = ResolvePolicy {
            min_rating: self.config.seed_threshold,
            limit: self.config.resolve_limit,
            concurrency: self.config.lookup_concurrency,
        };
        resolve_catalog_ids(self.provider.as_ref(), &mut catalog, policy).await;

        let genres = match self.provider.genre_vocabulary().await {
            Ok(genres) => genres,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = self.provider.name(),
                    "Genre vocabulary unavailable, all genres will read as Unknown"
                );
                GenreMap::default()
            }
        };

        let stats = ImportStats::from_catalog(&catalog);
        let generated = self.generate(&catalog, &genres).await?;

        let mut session = self.session.write().await;
        if session.imports != import {
            tracing::info!(
                import,
                current = session.imports,
                "Discarding an import superseded by a newer one"
            );
            return Err(AppError::Conflict(
                "A newer rating history import replaced this one".to_string(),
            ));
        }

        session.catalog = Some(Arc::new(catalog));
        session.genres = Arc::new(genres);
        session.profile = Some(generated.profile);
        session.curator = generated.curator;
        session.generation += 1;

        tracing::info!(
            movies = stats.movies,
            resolved = stats.resolved,
            average_rating = stats.average_rating,
            recommendations = session.curator.all().len(),
            "Rating history imported"
        );

        Ok(ImportOutcome {
            stats,
            recommendations: session.curator.snapshot(),
        })
    }

    /// Reruns the whole pipeline against the imported history
    ///
    /// When a newer generation or import commits first, this run is dropped
    /// and the committed view is returned.
    pub async fn regenerate(&self) -> AppResult<RecommendationView> {
        let (catalog, genres, generation) = {
            let mut session = self.session.write().await;
            let catalog = session.catalog.clone().ok_or_else(no_history)?;
            session.generation += 1;
            (catalog, session.genres.clone(), session.generation)
        };

        let generated = self.generate(&catalog, &genres).await?;

        let mut session = self.session.write().await;
        if session.generation != generation {
            tracing::info!(
                generation,
                current = session.generation,
                "Discarding results of a superseded generation"
            );
            return Ok(session.curator.snapshot());
        }

        tracing::info!(
            generation,
            recommendations = generated.curator.all().len(),
            "Recommendations regenerated"
        );

        session.profile = Some(generated.profile);
        session.curator = generated.curator;
        Ok(session.curator.snapshot())
    }

    /// Analyzer, seeds, aggregation, watched filter, scoring and ranking
    async fn generate(&self, catalog: &RatedCatalog, genres: &GenreMap) -> AppResult<Generated> {
        let profile = PreferenceProfile::analyze(catalog, self.config.seed_threshold)?;

        let policy = SeedPolicy {
            target_seeds: self.config.target_seeds,
            seeds_per_genre: self.config.seeds_per_genre,
            jitter: &self.config.jitter,
        };
        let seeds = self.with_rng(|rng| select_seeds(catalog, &profile, &policy, rng))?;

        let pool = aggregate_candidates(
            self.provider.as_ref(),
            &seeds,
            self.config.lookup_concurrency,
        )
        .await;

        let watched = WatchedIndex::from_catalog(catalog);
        let candidates = filter_watched(pool.into_candidates(), &watched);

        let scored = self.with_rng(|rng| {
            score_candidates(
                candidates,
                &profile,
                genres,
                &self.config.weights,
                &self.config.jitter,
                rng,
            )
        })?;
        let curator = Curator::rank(scored, self.config.top_n);

        tracing::debug!(
            seeds = seeds.len(),
            ranked = curator.all().len(),
            "Pipeline finished"
        );

        Ok(Generated { profile, curator })
    }

    pub async fn apply_filter(&self, filter: FacetFilter) -> AppResult<RecommendationView> {
        let mut session = self.session.write().await;
        ensure_history(&session)?;

        tracing::debug!(genre = ?filter.genre, year = ?filter.year, "Applying facet filter");
        session.curator.apply_filter(filter);
        Ok(session.curator.snapshot())
    }

    pub async fn clear_filter(&self) -> AppResult<RecommendationView> {
        let mut session = self.session.write().await;
        ensure_history(&session)?;

        session.curator.clear_filter();
        Ok(session.curator.snapshot())
    }

    pub async fn view(&self) -> AppResult<RecommendationView> {
        let session = self.session.read().await;
        ensure_history(&session)?;
        Ok(session.curator.snapshot())
    }

    /// CSV of the current view
    pub async fn export_csv(&self) -> AppResult<String> {
        let session = self.session.read().await;
        ensure_history(&session)?;
        session.curator.export_csv()
    }

    /// Preference profile of the committed history
    pub async fn profile(&self) -> AppResult<PreferenceProfile> {
        let session = self.session.read().await;
        session.profile.clone().ok_or_else(no_history)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> AppResult<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("Random generator lock poisoned".to_string()))?;
        Ok(f(&mut *rng))
    }
}

fn no_history() -> AppError {
    AppError::NotFound("No rating history has been imported".to_string())
}

fn ensure_history(session: &Session) -> AppResult<()> {
    if session.catalog.is_none() {
        return Err(no_history());
    }
    Ok(())
}
