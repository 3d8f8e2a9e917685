use crate::api::handlers::common::error_status;
use crate::api::state::AppState;
use crate::api::types::{MortalityResponse, StayAnalysisResponse};
use crate::etl::aggregate;
use crate::models::DiagnosisStats;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;

const TOP_DIAGNOSES_LIMIT: usize = 10;

pub async fn get_mortality_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MortalityResponse>, StatusCode> {
    let counts = state
        .warehouse
        .fetch_condition_counts()
        .await
        .map_err(|e| error_status("Failed to fetch discharge condition counts", e))?;

    let (total_cases, distribution) = aggregate::mortality_distribution(&counts);
    Ok(Json(MortalityResponse {
        total_cases,
        distribution,
    }))
}

pub async fn get_top_diagnoses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DiagnosisStats>>, StatusCode> {
    let rows = state
        .warehouse
        .fetch_diagnosis_rows()
        .await
        .map_err(|e| error_status("Failed to fetch diagnosis rows", e))?;

    Ok(Json(aggregate::top_diagnoses(&rows, TOP_DIAGNOSES_LIMIT)))
}

pub async fn get_stay_analysis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StayAnalysisResponse>, StatusCode> {
    let stays = state
        .warehouse
        .fetch_stay_days()
        .await
        .map_err(|e| error_status("Failed to fetch lengths of stay", e))?;

    let (summary, distribution) = aggregate::stay_distribution(&stays);
    Ok(Json(StayAnalysisResponse {
        summary,
        distribution,
    }))
}
