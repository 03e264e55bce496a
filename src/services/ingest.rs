use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{RatedCatalog, RatedMovie},
};

/// Columns a rating export must carry
pub const REQUIRED_COLUMNS: [&str; 6] = ["Const", "Your Rating", "Title", "Year", "Genres", "Title Type"];

const MOVIE_TITLE_TYPE: &str = "movie";

/// Source rating scale
const RATING_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// One row of an IMDb-style ratings export; unknown columns are ignored
#[derive(Debug, Deserialize)]
struct RawRatingRow {
    #[serde(rename = "Const")]
    external_id: Option<String>,
    #[serde(rename = "Your Rating")]
    rating: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Genres")]
    genres: Option<String>,
    #[serde(rename = "Title Type")]
    title_type: Option<String>,
}

impl RawRatingRow {
    /// Converts a row into a rated movie, `None` when the row does not qualify
    fn into_rated_movie(self) -> Option<RatedMovie> {
        let is_movie = self
            .title_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(MOVIE_TITLE_TYPE));
        if !is_movie {
            return None;
        }

        let rating = self
            .rating
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .and_then(|r| r.parse::<f64>().ok())
            .filter(|r| r.is_finite() && RATING_RANGE.contains(r))?;

        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;

        let year = self
            .year
            .as_deref()
            .and_then(|y| y.trim().parse::<i32>().ok());

        let genres = self
            .genres
            .as_deref()
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Some(RatedMovie {
            external_rating_id: self.external_id.unwrap_or_default().trim().to_string(),
            rating,
            title,
            year,
            genres,
            catalog_id: None,
        })
    }
}

/// Checks that every required column is present
pub fn validate_schema<'a, I>(headers: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
    REQUIRED_COLUMNS.iter().all(|col| headers.contains(col))
}

/// Parses a ratings export into a catalog of rated movies
///
/// Keeps rows whose title type is a movie and that carry both a numeric
/// rating and a title. Fails when required columns are missing or no row
/// qualifies.
pub fn parse_ratings_csv(raw: &str) -> AppResult<RatedCatalog> {
    let raw = raw.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers = reader.headers()?.clone();
    if !validate_schema(headers.iter()) {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h.trim() == *col))
            .collect();
        return Err(AppError::InvalidInput(format!(
            "Invalid ratings file, missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut movies = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in reader.deserialize::<RawRatingRow>().enumerate() {
        match record {
            Ok(row) => match row.into_rated_movie() {
                Some(movie) => movies.push(movie),
                None => skipped += 1,
            },
            Err(e) => {
                tracing::debug!(error = %e, line = line + 2, "Skipping malformed ratings row");
                skipped += 1;
            }
        }
    }

    if movies.is_empty() {
        return Err(AppError::InvalidInput(
            "No rated movies found in ratings file".to_string(),
        ));
    }

    tracing::info!(movies = movies.len(), skipped, "Ratings file parsed");

    Ok(RatedCatalog::new(movies))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Const,Your Rating,Date Rated,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_validate_schema_accepts_required_columns() {
        assert!(validate_schema(HEADER.split(',')));
        assert!(validate_schema(REQUIRED_COLUMNS));
    }

    #[test]
    fn test_validate_schema_rejects_missing_column() {
        assert!(!validate_schema(["Const", "Your Rating", "Title", "Year", "Genres"]));
    }

    #[test]
    fn test_parse_imdb_export() {
        let raw = csv_with(&[
            r#"tt0113277,9,2023-01-01,Heat,https://www.imdb.com/title/tt0113277/,movie,8.3,170,1995,"Action, Crime, Drama",700000,1995-12-15,Michael Mann"#,
            r#"tt0903747,10,2023-01-02,Breaking Bad,https://www.imdb.com/title/tt0903747/,tvSeries,9.5,49,2008,"Crime, Drama, Thriller",2000000,2008-01-20,"#,
            r#"tt0369339,7,2023-01-03,Collateral,https://www.imdb.com/title/tt0369339/,Movie,7.5,120,2004,"Action, Crime",500000,2004-08-06,Michael Mann"#,
        ]);

        let catalog = parse_ratings_csv(&raw).unwrap();
        assert_eq!(catalog.len(), 2);

        let heat = &catalog.movies()[0];
        assert_eq!(heat.external_rating_id, "tt0113277");
        assert_eq!(heat.rating, 9.0);
        assert_eq!(heat.title, "Heat");
        assert_eq!(heat.year, Some(1995));
        assert_eq!(heat.genres, vec!["Action", "Crime", "Drama"]);
        assert_eq!(heat.catalog_id, None);

        assert_eq!(catalog.movies()[1].title, "Collateral");
    }

    #[test]
    fn test_rows_without_rating_or_title_are_dropped() {
        let raw = csv_with(&[
            "tt1,,2023-01-01,No Rating,,movie,7.0,100,2001,Drama,10,,",
            "tt2,8,2023-01-01,,,movie,7.0,100,2001,Drama,10,,",
            "tt3,8,2023-01-01,Kept,,movie,7.0,100,,,10,,",
        ]);

        let catalog = parse_ratings_csv(&raw).unwrap();
        assert_eq!(catalog.len(), 1);
        let kept = &catalog.movies()[0];
        assert_eq!(kept.title, "Kept");
        assert_eq!(kept.year, None);
        assert!(kept.genres.is_empty());
    }

    #[test]
    fn test_ratings_outside_scale_are_dropped() {
        let raw = csv_with(&[
            "tt1,NaN,2023-01-01,Not A Number,,movie,7.0,100,2001,Action,10,,",
            "tt2,inf,2023-01-01,Infinite,,movie,7.0,100,2001,Action,10,,",
            "tt3,-1,2023-01-01,Negative,,movie,7.0,100,2001,Action,10,,",
            "tt4,11,2023-01-01,Too High,,movie,7.0,100,2001,Action,10,,",
            "tt5,10,2023-01-01,Perfect,,movie,7.0,100,2001,Drama,10,,",
            "tt6,0,2023-01-01,Zero,,movie,7.0,100,2001,Drama,10,,",
        ]);

        let catalog = parse_ratings_csv(&raw).unwrap();
        let titles: Vec<&str> = catalog.movies().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Perfect", "Zero"]);
        assert!(catalog.movies().iter().all(|m| m.rating.is_finite()));
    }

    #[test]
    fn test_only_invalid_ratings_is_invalid_input() {
        let raw = csv_with(&["tt1,NaN,2023-01-01,Not A Number,,movie,7.0,100,2001,Action,10,,"]);
        assert!(matches!(
            parse_ratings_csv(&raw),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let raw = format!(
            "\u{feff}{}",
            csv_with(&["tt1,8,2023-01-01,Alien,,movie,8.5,117,1979,\"Horror, Sci-Fi\",900000,,"])
        );
        let catalog = parse_ratings_csv(&raw).unwrap();
        assert_eq!(catalog.movies()[0].external_rating_id, "tt1");
        assert_eq!(catalog.movies()[0].main_genre(), Some("Horror"));
    }

    #[test]
    fn test_missing_columns_is_invalid_input() {
        let raw = "Const,Your Rating,Title\ntt1,8,Alien";
        match parse_ratings_csv(raw) {
            Err(AppError::InvalidInput(msg)) => {
                assert!(msg.contains("Year"));
                assert!(msg.contains("Title Type"));
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_no_qualifying_rows_is_invalid_input() {
        let raw = csv_with(&["tt0903747,10,2023-01-02,Breaking Bad,,tvSeries,9.5,49,2008,Drama,1,,"]);
        assert!(matches!(
            parse_ratings_csv(&raw),
            Err(AppError::InvalidInput(_))
        ));
    }
}
