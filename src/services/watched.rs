use std::collections::HashSet;

use crate::models::{Candidate, CatalogId, RatedCatalog};

/// Lookup of everything the user has already rated
///
/// Resolved movies match by catalog id. Unresolved movies fall back to a
/// case-insensitive title plus exact year match, and only when both sides
/// carry a year.
#[derive(Debug, Default)]
pub struct WatchedIndex {
    catalog_ids: HashSet<CatalogId>,
    titles: HashSet<(String, i32)>,
}

impl WatchedIndex {
    pub fn from_catalog(catalog: &RatedCatalog) -> Self {
        let mut index = Self::default();
        for movie in catalog.movies() {
            match (movie.catalog_id, movie.year) {
                (Some(id), _) => {
                    index.catalog_ids.insert(id);
                }
                (None, Some(year)) => {
                    index.titles.insert((normalize_title(&movie.title), year));
                }
                (None, None) => {}
            }
        }
        index
    }

    pub fn contains(&self, candidate: &Candidate) -> bool {
        let source = &candidate.source;
        if self.catalog_ids.contains(&source.catalog_id) {
            return true;
        }
        source
            .year
            .is_some_and(|year| self.titles.contains(&(normalize_title(&source.title), year)))
    }

    pub fn len(&self) -> usize {
        self.catalog_ids.len() + self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Drops candidates the user has already rated
pub fn filter_watched(candidates: Vec<Candidate>, watched: &WatchedIndex) -> Vec<Candidate> {
    let before = candidates.len();
    let remaining: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| !watched.contains(c))
        .collect();

    tracing::debug!(
        before,
        removed = before - remaining.len(),
        "Watched candidates filtered"
    );

    remaining
}
