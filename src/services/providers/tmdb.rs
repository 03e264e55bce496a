/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Resolution: /search/movie?query=..&year=.. → candidate catalog ids
/// 2. Related feed: /movie/{id}/recommendations → candidate sources
/// 3. Vocabulary: /genre/movie/list → genre id → name
///
/// All three responses are cached through the lookup cache.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        CandidateSource, CatalogId, CatalogMovie, GenreMap, TmdbGenreList, TmdbMovie, TmdbPage,
    },
    services::providers::MovieProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const SEARCH_CACHE_TTL: u64 = 86_400; // 1 day
const RECS_CACHE_TTL: u64 = 86_400; // 1 day
const GENRE_CACHE_TTL: u64 = 604_800; // 1 week

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            cache,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Issues a GET with auth + language and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        extra_query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.endpoint(path);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(extra_query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn search_movies(&self, title: &str, year: Option<i32>) -> AppResult<Vec<CatalogMovie>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search title cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::MovieSearch {
                title: title.to_string(),
                year,
            },
            SEARCH_CACHE_TTL,
            async move {
                let mut query = vec![("query", title.to_string())];
                if let Some(year) = year {
                    query.push(("year", year.to_string()));
                }

                let page: TmdbPage<TmdbMovie> = self.get_json("search/movie", &query).await?;
                let movies: Vec<CatalogMovie> =
                    page.results.into_iter().map(CatalogMovie::from).collect();

                tracing::debug!(
                    title = %title,
                    year = ?year,
                    results = movies.len(),
                    provider = "tmdb",
                    "Movie search completed"
                );

                Ok::<_, AppError>(movies)
            }
        )
    }

    async fn recommendations_for(&self, catalog_id: CatalogId) -> AppResult<Vec<CandidateSource>> {
        cached!(
            self.cache,
            CacheKey::Recommendations(catalog_id),
            RECS_CACHE_TTL,
            async move {
                let path = format!("movie/{}/recommendations", catalog_id);
                let page: TmdbPage<TmdbMovie> = self.get_json(&path, &[]).await?;
                let sources: Vec<CandidateSource> =
                    page.results.into_iter().map(CandidateSource::from).collect();

                tracing::debug!(
                    catalog_id,
                    results = sources.len(),
                    provider = "tmdb",
                    "Recommendations fetched"
                );

                Ok::<_, AppError>(sources)
            }
        )
    }

    async fn genre_vocabulary(&self) -> AppResult<GenreMap> {
        cached!(
            self.cache,
            CacheKey::Genres(self.language.clone()),
            GENRE_CACHE_TTL,
            async move {
                let list: TmdbGenreList = self.get_json("genre/movie/list", &[]).await?;
                let genres = GenreMap::from(list);

                tracing::info!(
                    genres = genres.len(),
                    language = %self.language,
                    provider = "tmdb",
                    "Genre vocabulary loaded"
                );

                Ok::<_, AppError>(genres)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
