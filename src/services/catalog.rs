use futures::{stream, StreamExt};

use crate::{
    models::{CatalogId, CatalogMovie, RatedCatalog, RatedMovie},
    services::providers::MovieProvider,
};

/// Maximum distance between rated and released year for a search hit to match
const YEAR_TOLERANCE: i32 = 1;

/// Picks the first search hit released within a year of the rated year
pub fn match_search_result(year: Option<i32>, results: &[CatalogMovie]) -> Option<CatalogId> {
    let year = year?;
    results
        .iter()
        .find(|hit| {
            hit.release_year
                .is_some_and(|released| (released - year).abs() <= YEAR_TOLERANCE)
        })
        .map(|hit| hit.id)
}

/// Resolution policy for one import
#[derive(Debug, Clone, Copy)]
pub struct ResolvePolicy {
    /// Only movies rated at least this high are looked up
    pub min_rating: f64,
    /// Upper bound on lookups, taken in history order
    pub limit: usize,
    pub concurrency: usize,
}

/// Fills in catalog ids for the highest-value movies of a catalog
///
/// A failed lookup leaves that movie unresolved and never stops the others.
/// Returns the number of movies resolved.
pub async fn resolve_catalog_ids(
    provider: &dyn MovieProvider,
    catalog: &mut RatedCatalog,
    policy: ResolvePolicy,
) -> usize {
    let targets: Vec<usize> = catalog
        .movies()
        .iter()
        .enumerate()
        .filter(|(_, m)| m.catalog_id.is_none() && m.rating >= policy.min_rating)
        .map(|(i, _)| i)
        .take(policy.limit)
        .collect();

    if targets.is_empty() {
        return 0;
    }

    let lookups: Vec<(usize, Option<CatalogId>)> = {
        let movies = catalog.movies();
        // Futures are built eagerly so the returned future stays `Send`
        let pending: Vec<_> = targets
            .iter()
            .map(|&i| {
                let movie = &movies[i];
                async move { (i, resolve_one(provider, movie).await) }
            })
            .collect();

        stream::iter(pending)
            .buffered(policy.concurrency.max(1))
            .collect()
            .await
    };

    let mut resolved = 0;
    for (i, catalog_id) in lookups {
        if let Some(id) = catalog_id {
            catalog.movies_mut()[i].catalog_id = Some(id);
            resolved += 1;
        }
    }

    tracing::info!(
        attempted = targets.len(),
        resolved,
        provider = provider.name(),
        "Catalog ids resolved"
    );

    resolved
}

async fn resolve_one(provider: &dyn MovieProvider, movie: &RatedMovie) -> Option<CatalogId> {
    if movie.year.is_none() {
        tracing::debug!(title = %movie.title, "No year to match against, skipping lookup");
        return None;
    }

    match provider.search_movies(&movie.title, movie.year).await {
        Ok(results) => {
            let matched = match_search_result(movie.year, &results);
            if matched.is_none() {
                tracing::debug!(
                    title = %movie.title,
                    year = ?movie.year,
                    results = results.len(),
                    "No catalog match within year tolerance"
                );
            }
            matched
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                title = %movie.title,
                year = ?movie.year,
                "Catalog lookup failed, movie left unresolved"
            );
            None
        }
    }
}
