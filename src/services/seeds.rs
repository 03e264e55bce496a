use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::{
    models::{RatedCatalog, RatedMovie},
    services::{jitter::JitterConfig, preferences::PreferenceProfile},
};

/// Seed selection policy
#[derive(Debug, Clone)]
pub struct SeedPolicy<'a> {
    pub target_seeds: usize,
    pub seeds_per_genre: usize,
    pub jitter: &'a JitterConfig,
}

/// Chooses a genre-diversified set of highly rated, resolved movies
///
/// Ranked main genres contribute their top-rated movies first; remaining
/// slots are filled from the whole eligible pool by descending rating.
/// Returns an empty list when no movie is eligible.
pub fn select_seeds<R: Rng + ?Sized>(
    catalog: &RatedCatalog,
    profile: &PreferenceProfile,
    policy: &SeedPolicy<'_>,
    rng: &mut R,
) -> Vec<RatedMovie> {
    let movies = catalog.movies();

    // Catalog positions of eligible movies, in history order
    let eligible: Vec<usize> = movies
        .iter()
        .enumerate()
        .filter(|(_, m)| m.catalog_id.is_some() && m.rating >= profile.seed_threshold)
        .map(|(i, _)| i)
        .collect();

    let eligible_count = eligible.len();
    if eligible.is_empty() || policy.target_seeds == 0 {
        tracing::info!(
            threshold = profile.seed_threshold,
            "No eligible seed movies"
        );
        return Vec::new();
    }

    let mut by_genre: HashMap<&str, Vec<usize>> = HashMap::new();
    for &i in &eligible {
        if let Some(genre) = movies[i].main_genre() {
            by_genre.entry(genre).or_default().push(i);
        }
    }
    for partition in by_genre.values_mut() {
        partition.sort_by(|&a, &b| movies[b].rating.total_cmp(&movies[a].rating));
    }

    let mut ranked_genres: Vec<(&str, f64)> = profile
        .genre_weights
        .iter()
        .map(|gw| {
            (
                gw.genre.as_str(),
                gw.weight * policy.jitter.genre_weight_factor(rng),
            )
        })
        .collect();
    ranked_genres.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut selected: Vec<usize> = Vec::with_capacity(policy.target_seeds);
    let mut taken: HashSet<usize> = HashSet::new();

    'genres: for (genre, _) in &ranked_genres {
        let Some(partition) = by_genre.get(genre) else {
            continue;
        };
        let k = policy.jitter.seeds_per_genre(policy.seeds_per_genre, rng);
        for &i in partition.iter().take(k) {
            if selected.len() >= policy.target_seeds {
                break 'genres;
            }
            if taken.insert(i) {
                selected.push(i);
            }
        }
    }

    if selected.len() < policy.target_seeds {
        let mut by_rating = eligible;
        by_rating.sort_by(|&a, &b| movies[b].rating.total_cmp(&movies[a].rating));
        for i in by_rating {
            if selected.len() >= policy.target_seeds {
                break;
            }
            if taken.insert(i) {
                selected.push(i);
            }
        }
    }

    tracing::info!(
        eligible = eligible_count,
        seeds = selected.len(),
        genres = by_genre.len(),
        "Seed movies selected"
    );

    selected.into_iter().map(|i| movies[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn movie(title: &str, rating: f64, genres: &[&str], catalog_id: Option<u64>) -> RatedMovie {
        RatedMovie {
            external_rating_id: format!("tt-{}", title),
            rating,
            title: title.to_string(),
            year: Some(2000),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            catalog_id,
        }
    }

    fn select(catalog: &RatedCatalog, target_seeds: usize, seeds_per_genre: usize) -> Vec<RatedMovie> {
        let profile = PreferenceProfile::analyze(catalog, 7.0).unwrap();
        let jitter = JitterConfig::disabled();
        let policy = SeedPolicy {
            target_seeds,
            seeds_per_genre,
            jitter: &jitter,
        };
        select_seeds(catalog, &profile, &policy, &mut StdRng::seed_from_u64(0))
    }

    fn titles(seeds: &[RatedMovie]) -> Vec<&str> {
        seeds.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_no_eligible_movies_yields_empty_seed_list() {
        let catalog = RatedCatalog::new(vec![
            movie("Low", 5.0, &["Drama"], Some(1)),
            movie("Unresolved", 9.0, &["Drama"], None),
        ]);
        assert!(select(&catalog, 10, 2).is_empty());
    }

    #[test]
    fn test_ineligible_movies_never_selected() {
        let catalog = RatedCatalog::new(vec![
            movie("A", 9.0, &["Action"], Some(1)),
            movie("B", 6.9, &["Action"], Some(2)),
            movie("C", 10.0, &["Action"], None),
            movie("D", 7.0, &["Drama"], Some(4)),
        ]);
        let seeds = select(&catalog, 10, 2);
        assert_eq!(titles(&seeds), vec!["A", "D"]);
        assert!(seeds
            .iter()
            .all(|s| s.catalog_id.is_some() && s.rating >= 7.0));
    }

    #[test]
    fn test_ranked_genres_contribute_top_rated_first() {
        // Drama is heavier than Comedy: more titles, higher ratings
        let catalog = RatedCatalog::new(vec![
            movie("Comedy1", 7.0, &["Comedy"], Some(1)),
            movie("Drama1", 8.0, &["Drama"], Some(2)),
            movie("Drama2", 10.0, &["Drama"], Some(3)),
            movie("Drama3", 9.0, &["Drama"], Some(4)),
            movie("Comedy2", 7.5, &["Comedy"], Some(5)),
        ]);
        let seeds = select(&catalog, 4, 2);
        assert_eq!(titles(&seeds), vec!["Drama2", "Drama3", "Comedy2", "Comedy1"]);
    }

    #[test]
    fn test_fill_from_pool_by_rating() {
        let catalog = RatedCatalog::new(vec![
            movie("Drama1", 8.0, &["Drama"], Some(1)),
            movie("Drama2", 9.0, &["Drama"], Some(2)),
            movie("Drama3", 10.0, &["Drama"], Some(3)),
            movie("NoGenre", 9.5, &[], Some(4)),
        ]);
        let seeds = select(&catalog, 4, 1);
        assert_eq!(titles(&seeds), vec!["Drama3", "NoGenre", "Drama2", "Drama1"]);
    }

    #[test]
    fn test_never_exceeds_target() {
        let movies: Vec<RatedMovie> = (0..30)
            .map(|i| {
                let genre = ["Action", "Drama", "Comedy", "Horror"][i % 4];
                movie(&format!("M{}", i), 7.0 + (i % 4) as f64, &[genre], Some(i as u64 + 1))
            })
            .collect();
        let catalog = RatedCatalog::new(movies);

        for target in [0, 1, 3, 5, 10, 50] {
            let seeds = select(&catalog, target, 2);
            assert!(seeds.len() <= target);
        }
        assert_eq!(select(&catalog, 10, 2).len(), 10);
    }

    #[test]
    fn test_identical_movies_are_distinct_seeds() {
        // Two history rows with identical values are still separate entries
        let twin = movie("Twin", 9.0, &["Drama"], Some(8));
        let catalog = RatedCatalog::new(vec![twin.clone(), twin]);
        assert_eq!(select(&catalog, 10, 2).len(), 2);
    }

    #[test]
    fn test_jittered_selection_is_reproducible_and_bounded() {
        let movies: Vec<RatedMovie> = (0..20)
            .map(|i| {
                let genre = ["Action", "Drama", "Comedy"][i % 3];
                movie(&format!("M{}", i), 7.0 + (i % 3) as f64, &[genre], Some(i as u64 + 1))
            })
            .collect();
        let catalog = RatedCatalog::new(movies);
        let profile = PreferenceProfile::analyze(&catalog, 7.0).unwrap();
        let jitter = JitterConfig {
            genre_weight: Some(crate::services::jitter::JitterRange::new(0.5, 1.5)),
            seeds_per_genre_spread: 2,
            genre_match: None,
        };
        let policy = SeedPolicy {
            target_seeds: 6,
            seeds_per_genre: 2,
            jitter: &jitter,
        };

        let first = select_seeds(&catalog, &profile, &policy, &mut StdRng::seed_from_u64(11));
        let second = select_seeds(&catalog, &profile, &policy, &mut StdRng::seed_from_u64(11));
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }
}
