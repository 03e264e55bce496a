use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinematch_api::{
    api::{create_router, AppState},
    config::EngineConfig,
    error::{AppError, AppResult},
    models::{CandidateSource, CatalogId, CatalogMovie, GenreMap},
    services::MovieProvider,
};

/// In-process catalog: "Heat" resolves to 42, "Collateral" to 43
struct StubProvider;

fn source(id: CatalogId, title: &str, year: i32, vote_average: f64, genre_ids: Vec<u32>) -> CandidateSource {
    CandidateSource {
        catalog_id: id,
        title: title.to_string(),
        year: Some(year),
        overview: Some(format!("{} overview", title)),
        poster_path: Some(format!("/{}.jpg", id)),
        vote_average,
        genre_ids,
        popularity: 20.0,
    }
}

#[async_trait::async_trait]
impl MovieProvider for StubProvider {
    async fn search_movies(&self, title: &str, year: Option<i32>) -> AppResult<Vec<CatalogMovie>> {
        let id = match title {
            "Heat" => 42,
            "Collateral" => 43,
            _ => return Ok(vec![]),
        };
        Ok(vec![CatalogMovie {
            id,
            title: title.to_string(),
            release_year: year,
        }])
    }

    async fn recommendations_for(&self, catalog_id: CatalogId) -> AppResult<Vec<CandidateSource>> {
        match catalog_id {
            42 => Ok(vec![
                source(7, "Ronin", 1998, 8.0, vec![28]),
                source(43, "Collateral", 2004, 7.5, vec![28, 80]),
                source(8, "Thief", 1981, 6.0, vec![80]),
            ]),
            43 => Ok(vec![source(7, "Ronin", 1998, 8.0, vec![28])]),
            _ => Err(AppError::ExternalApi("unknown id".to_string())),
        }
    }

    async fn genre_vocabulary(&self) -> AppResult<GenreMap> {
        Ok([(28, "Action".to_string()), (80, "Crime".to_string())]
            .into_iter()
            .collect())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

const HISTORY: &str = "\
Const,Your Rating,Date Rated,Title,Title Type,Year,Genres
tt0113277,9,2023-01-01,Heat,movie,1995,\"Action, Crime, Drama\"
tt0369339,8,2023-01-02,Collateral,movie,2004,\"Crime, Drama\"
tt0903747,10,2023-01-03,Breaking Bad,tvSeries,2008,\"Crime, Drama\"
";

fn create_test_server() -> TestServer {
    let config = EngineConfig {
        rng_seed: Some(1),
        ..EngineConfig::default()
    };
    let state = AppState::new(Arc::new(StubProvider), config);
    TestServer::new(create_router(state)).unwrap()
}

async fn imported_server() -> TestServer {
    let server = create_test_server();
    server
        .post("/api/v1/history")
        .text(HISTORY)
        .await
        .assert_status_ok();
    server
}

fn ids(view: &Value) -> Vec<u64> {
    view["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["catalog_id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-me"),
        )
        .await;
    assert_eq!(response.headers()["x-request-id"], "trace-me");

    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_recommendations_before_import_is_not_found() {
    let server = create_test_server();

    server
        .get("/api/v1/recommendations")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/v1/recommendations/export")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/api/v1/preferences").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_import_rejects_invalid_files() {
    let server = create_test_server();

    server
        .post("/api/v1/history")
        .text("")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/history")
        .text("Title,Year\nHeat,1995\n")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Title Type"));
}

#[tokio::test]
async fn test_import_generates_recommendations() {
    let server = create_test_server();

    let response = server.post("/api/v1/history").text(HISTORY).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["stats"]["movies"], 2);
    assert_eq!(body["stats"]["resolved"], 2);
    assert_eq!(body["stats"]["earliest_year"], 1995);
    assert_eq!(body["stats"]["latest_year"], 2004);

    let view = &body["recommendations"];
    // Collateral is already rated; Ronin is proposed by both seeds
    assert_eq!(ids(view), vec![7, 8]);
    assert_eq!(view["recommendations"][0]["match_count"], 2);
    assert_eq!(view["recommendations"][0]["genres"], json!(["Action"]));
    assert_eq!(view["total"], 2);
    assert_eq!(view["facets"]["genres"], json!(["Action", "Crime"]));
    assert_eq!(view["facets"]["years"], json!([1998, 1981]));

    let response = server.get("/api/v1/recommendations").await;
    response.assert_status_ok();
    assert_eq!(&response.json::<Value>(), view);
}

#[tokio::test]
async fn test_filter_and_clear() {
    let server = imported_server().await;

    let response = server
        .post("/api/v1/recommendations/filter")
        .json(&json!({ "genre": "Crime" }))
        .await;
    response.assert_status_ok();
    let filtered: Value = response.json();
    assert_eq!(ids(&filtered), vec![8]);
    assert_eq!(filtered["total"], 2);
    assert_eq!(filtered["filter"]["genre"], "Crime");

    let response = server
        .post("/api/v1/recommendations/filter")
        .json(&json!({ "year": 1998 }))
        .await;
    assert_eq!(ids(&response.json::<Value>()), vec![7]);

    let response = server.delete("/api/v1/recommendations/filter").await;
    response.assert_status_ok();
    assert_eq!(ids(&response.json::<Value>()), vec![7, 8]);
}

#[tokio::test]
async fn test_export_csv() {
    let server = imported_server().await;

    let response = server.get("/api/v1/recommendations/export").await;
    response.assert_status_ok();
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let text = response.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Title,Year,Rating,Score,Matches");
    assert!(lines[1].starts_with("Ronin,1998,8,"));
    assert!(lines[1].ends_with(",2"));
    assert!(lines[2].starts_with("Thief,1981,6,"));
}

#[tokio::test]
async fn test_regenerate_and_preferences() {
    let server = imported_server().await;

    server
        .post("/api/v1/recommendations/filter")
        .json(&json!({ "genre": "Crime" }))
        .await
        .assert_status_ok();

    let response = server.post("/api/v1/recommendations/regenerate").await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(ids(&view), vec![7, 8]);
    assert_eq!(view["filter"], json!({ "genre": null, "year": null }));

    let response = server.get("/api/v1/preferences").await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["seed_threshold"], 7.0);
    let genres: Vec<&str> = profile["genre_weights"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["genre"].as_str().unwrap())
        .collect();
    assert_eq!(genres, vec!["Action", "Crime", "Drama"]);
}
