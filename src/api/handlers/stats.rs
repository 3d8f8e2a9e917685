use crate::api::handlers::common::error_status;
use crate::api::state::AppState;
use crate::api::types::MonthlyStatsRow;
use crate::constants::MONTH_NAMES;
use crate::models::{DashboardSummary, DemographicStats, InsurerStats};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;
use tracing::info;

pub async fn get_dashboard_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSummary>, StatusCode> {
    let summary = state
        .warehouse
        .fetch_summary()
        .await
        .map_err(|e| error_status("Failed to compute dashboard summary", e))?;

    info!(
        "Dashboard summary: {} patients, {} active cases, mortality rate {:.2}%",
        summary.total_patients, summary.active_cases, summary.mortality_rate
    );
    Ok(Json(summary))
}

pub async fn get_insurer_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InsurerStats>>, StatusCode> {
    state
        .warehouse
        .fetch_insurer_stats()
        .await
        .map(Json)
        .map_err(|e| error_status("Failed to fetch insurer statistics", e))
}

pub async fn get_monthly_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MonthlyStatsRow>>, StatusCode> {
    let stats = state
        .warehouse
        .fetch_monthly_stats()
        .await
        .map_err(|e| error_status("Failed to fetch monthly statistics", e))?;

    let rows = stats
        .into_iter()
        .map(|stats| MonthlyStatsRow {
            month_name: MONTH_NAMES
                .get(&stats.month)
                .copied()
                .unwrap_or("Desconocido"),
            stats,
        })
        .collect();

    Ok(Json(rows))
}

pub async fn get_demographic_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DemographicStats>>, StatusCode> {
    state
        .warehouse
        .fetch_demographic_stats()
        .await
        .map(Json)
        .map_err(|e| error_status("Failed to fetch demographic statistics", e))
}
