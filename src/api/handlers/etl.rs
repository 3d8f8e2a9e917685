use crate::api::handlers::common::error_status;
use crate::api::state::AppState;
use crate::api::types::InitializeResponse;
use crate::models::{DataSource, RunReport, RunStatus};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;
use tracing::info;

pub async fn run_etl(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RunReport>, StatusCode> {
    info!("ETL run requested over HTTP");
    state
        .pipeline
        .run(DataSource::Sample)
        .await
        .map(Json)
        .map_err(|e| error_status("ETL run failed", e))
}

pub async fn get_etl_status(State(state): State<Arc<AppState>>) -> Json<RunStatus> {
    Json(state.pipeline.status())
}

/// One-shot demo bootstrap: runs the sample pipeline and tells the caller
/// which endpoints are now backed by data.
pub async fn initialize_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InitializeResponse>, StatusCode> {
    info!("Dashboard initialization requested");

    let mut report = state
        .pipeline
        .run(DataSource::Sample)
        .await
        .map_err(|e| error_status("Dashboard initialization failed", e))?;
    report.message = "Dashboard initialized with sample medical data".to_string();

    Ok(Json(InitializeResponse {
        report,
        ready_for_demo: true,
        next_steps: vec![
            "GET /estadisticas/resumen for the headline numbers",
            "GET /estadisticas/aseguradoras for the insurer breakdown",
            "GET /desenlaces for the record list",
        ],
    }))
}
