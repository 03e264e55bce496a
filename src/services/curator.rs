use std::collections::BTreeSet;

use crate::{
    error::{AppError, AppResult},
    models::{FacetFilter, Facets, RecommendationView, ScoredRecommendation},
};

pub const EXPORT_HEADER: [&str; 5] = ["Title", "Year", "Rating", "Score", "Matches"];

/// Holds the authoritative ranked list and the filtered view derived from it
///
/// The view is always rebuilt from the ranked list, so filters never
/// compose and clearing restores the ranked list exactly.
#[derive(Debug, Clone, Default)]
pub struct Curator {
    all: Vec<ScoredRecommendation>,
    view: Vec<ScoredRecommendation>,
    filter: FacetFilter,
    facets: Facets,
}

impl Curator {
    /// Ranks scored candidates by descending score and keeps the top `top_n`
    ///
    /// Equal scores keep their input order.
    pub fn rank(mut scored: Vec<ScoredRecommendation>, top_n: usize) -> Self {
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_n);

        let facets = facets_of(&scored);
        Self {
            view: scored.clone(),
            all: scored,
            filter: FacetFilter::default(),
            facets,
        }
    }

    pub fn apply_filter(&mut self, filter: FacetFilter) {
        self.view = self
            .all
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        self.filter = filter;
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(FacetFilter::default());
    }

    pub fn all(&self) -> &[ScoredRecommendation] {
        &self.all
    }

    pub fn view(&self) -> &[ScoredRecommendation] {
        &self.view
    }

    pub fn filter(&self) -> &FacetFilter {
        &self.filter
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn snapshot(&self) -> RecommendationView {
        RecommendationView {
            recommendations: self.view.clone(),
            total: self.all.len(),
            filter: self.filter.clone(),
            facets: self.facets.clone(),
        }
    }

    /// Renders the current view as CSV, score to two decimals
    pub fn export_csv(&self) -> AppResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(EXPORT_HEADER)?;
        for r in &self.view {
            writer.write_record([
                r.title.clone(),
                r.year.map(|y| y.to_string()).unwrap_or_default(),
                r.vote_average.to_string(),
                format!("{:.2}", r.score),
                r.match_count.to_string(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("Failed to flush CSV export: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("CSV export is not valid UTF-8: {}", e)))
    }
}

fn facets_of(recommendations: &[ScoredRecommendation]) -> Facets {
    let genres: BTreeSet<&str> = recommendations
        .iter()
        .flat_map(|r| r.genres.iter().map(String::as_str))
        .collect();
    let years: BTreeSet<i32> = recommendations.iter().filter_map(|r| r.year).collect();

    Facets {
        genres: genres.into_iter().map(String::from).collect(),
        years: years.into_iter().rev().collect(),
    }
}
