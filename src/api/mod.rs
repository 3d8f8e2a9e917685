mod handlers;
mod state;
mod types;
pub use handlers::*;
pub use state::*;
pub use types::*;

use crate::db::warehouse::Warehouse;
use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub async fn serve(host: String, port: u16, warehouse: Arc<Warehouse>) -> Result<()> {
    let state = Arc::new(AppState::new(warehouse));

    // The dashboard frontend is served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let app = Router::new()
        // Core endpoints
        .route("/", get(service_banner))
        .route("/health", get(health_check))
        // Outcome records
        .route("/desenlaces", get(get_outcomes))
        .route("/desenlaces/export/csv", get(export_outcomes_csv))
        .route("/desenlaces/paciente/{historia_clinica}", get(get_outcomes_by_chart))
        .route("/desenlaces/{desenlace_id}", get(get_outcome_by_id))
        // Aggregate statistics
        .route("/estadisticas/resumen", get(get_dashboard_summary))
        .route("/estadisticas/aseguradoras", get(get_insurer_stats))
        .route("/estadisticas/mensuales", get(get_monthly_stats))
        .route("/estadisticas/demografia", get(get_demographic_stats))
        .route("/estadisticas/mortalidad", get(get_mortality_stats))
        .route("/estadisticas/top-diagnosticos", get(get_top_diagnoses))
        .route("/estadisticas/estancia-promedio", get(get_stay_analysis))
        // Pipeline control
        .route("/etl/run", post(run_etl))
        .route("/etl/status", get(get_etl_status))
        .route("/etl/initialize", post(initialize_dashboard))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port).parse::<SocketAddr>()?;
    let listener = TcpListener::bind(&addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
