use crate::api::handlers::common::error_status;
use crate::api::state::AppState;
use crate::api::types::{ChartHistoryResponse, OutcomeQuery};
use crate::models::OutcomeRecord;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn get_outcomes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OutcomeQuery>,
) -> Result<Json<Vec<OutcomeRecord>>, StatusCode> {
    let filter = params.into_filter();
    info!("Fetching outcome records with filter {:?}", filter);

    let records = state
        .warehouse
        .fetch_outcomes(&filter)
        .await
        .map_err(|e| error_status("Failed to fetch outcome records", e))?;

    info!("Returning {} outcome records", records.len());
    Ok(Json(records))
}

pub async fn get_outcome_by_id(
    State(state): State<Arc<AppState>>,
    Path(outcome_id): Path<i64>,
) -> Result<Json<OutcomeRecord>, StatusCode> {
    state
        .warehouse
        .fetch_outcome_by_id(outcome_id)
        .await
        .map(Json)
        .map_err(|e| error_status("Failed to fetch outcome record", e))
}

pub async fn get_outcomes_by_chart(
    State(state): State<Arc<AppState>>,
    Path(chart_number): Path<String>,
) -> Result<Json<ChartHistoryResponse>, StatusCode> {
    let records = state
        .warehouse
        .fetch_outcomes_by_chart(&chart_number)
        .await
        .map_err(|e| error_status("Failed to fetch patient history", e))?;

    if records.is_empty() {
        warn!("No outcome records found for chart number {}", chart_number);
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Json(ChartHistoryResponse {
        chart_number,
        total_records: records.len(),
        records,
    }))
}
