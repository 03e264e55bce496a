use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{FacetFilter, RecommendationView},
    services::{preferences::PreferenceProfile, ImportOutcome},
};

use super::AppState;

const EXPORT_FILENAME: &str = "recommendations.csv";

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Imports a ratings export (raw CSV body) and generates recommendations
pub async fn import_history(
    State(state): State<AppState>,
    body: String,
) -> AppResult<Json<ImportOutcome>> {
    if body.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Request body must contain a ratings CSV".to_string(),
        ));
    }

    let outcome = state.engine.import_history(&body).await?;
    Ok(Json(outcome))
}

/// Current (possibly filtered) view
pub async fn get_recommendations(
    State(state): State<AppState>,
) -> AppResult<Json<RecommendationView>> {
    Ok(Json(state.engine.view().await?))
}

pub async fn regenerate(State(state): State<AppState>) -> AppResult<Json<RecommendationView>> {
    Ok(Json(state.engine.regenerate().await?))
}

pub async fn apply_filter(
    State(state): State<AppState>,
    Json(filter): Json<FacetFilter>,
) -> AppResult<Json<RecommendationView>> {
    Ok(Json(state.engine.apply_filter(filter).await?))
}

pub async fn clear_filter(State(state): State<AppState>) -> AppResult<Json<RecommendationView>> {
    Ok(Json(state.engine.clear_filter().await?))
}

/// Current view as a CSV attachment
pub async fn export_csv(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let csv = state.engine.export_csv().await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        csv,
    ))
}

pub async fn get_preferences(State(state): State<AppState>) -> AppResult<Json<PreferenceProfile>> {
    Ok(Json(state.engine.profile().await?))
}
