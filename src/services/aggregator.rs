use futures::{stream, StreamExt};
use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    models::{Candidate, CandidateSource, CatalogId, RatedMovie},
    services::providers::MovieProvider,
};

/// Merges per-seed feed responses into a pool keyed by catalog id
///
/// Pool order is the order in which ids were first seen; later sightings
/// append their seed to the candidate's provenance.
#[derive(Debug, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
    positions: HashMap<CatalogId, usize>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one seed's response to the pool
    pub fn merge(&mut self, seed: &RatedMovie, sources: Vec<CandidateSource>) {
        // A feed listing the same id twice still counts as one match for this seed
        let mut seen_for_seed: HashSet<CatalogId> = HashSet::new();

        for source in sources {
            let id = source.catalog_id;
            if !seen_for_seed.insert(id) {
                continue;
            }
            match self.positions.get(&id) {
                Some(&pos) => self.candidates[pos].seed_movies.push(seed.clone()),
                None => {
                    self.positions.insert(id, self.candidates.len());
                    self.candidates.push(Candidate::new(source, seed.clone()));
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

/// Queries the related-movies feed for every seed and pools the results
///
/// Up to `concurrency` lookups are in flight at once. Responses are merged
/// in seed order regardless of completion order, and a failed lookup only
/// drops that seed's contribution.
pub async fn aggregate_candidates(
    provider: &dyn MovieProvider,
    seeds: &[RatedMovie],
    concurrency: usize,
) -> CandidatePool {
    // Futures are built eagerly so the returned future stays `Send`
    let lookups: Vec<_> = seeds
        .iter()
        .filter_map(|seed| seed.catalog_id.map(|id| (seed, id)))
        .map(|(seed, id)| async move { (seed, provider.recommendations_for(id).await) })
        .collect();

    let responses: Vec<(&RatedMovie, AppResult<Vec<CandidateSource>>)> = stream::iter(lookups)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut pool = CandidatePool::new();
    let mut failed = 0usize;

    for (seed, response) in responses {
        match response {
            Ok(sources) => pool.merge(seed, sources),
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    error = %e,
                    seed = %seed.title,
                    catalog_id = ?seed.catalog_id,
                    "Recommendation lookup failed, skipping seed"
                );
            }
        }
    }

    tracing::info!(
        seeds = seeds.len(),
        failed,
        candidates = pool.len(),
        provider = provider.name(),
        "Candidate pool aggregated"
    );

    pool
}
