use crate::api::types::{HealthResponse, ServiceBanner};
use axum::response::Json;
use chrono::Utc;

pub async fn service_banner() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        message: "Burn Unit Dashboard API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}
