use crate::api::handlers::common::error_status;
use crate::api::state::AppState;
use crate::api::types::ExportQuery;
use crate::constants::MAX_RECORD_LIMIT;
use crate::db::warehouse::OutcomeFilter;
use crate::models::OutcomeRecord;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{info, warn};

const CSV_HEADER: &str =
    "fecha_ingreso,nombre_paciente,edad,sexo,diagnostico,aseguradora,dias_estancia,estado";

pub async fn export_outcomes_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, StatusCode> {
    let filter = OutcomeFilter {
        from_date: params.from_date,
        to_date: params.to_date,
        insurer: params.insurer,
        limit: Some(MAX_RECORD_LIMIT),
        ..Default::default()
    };

    let records = state
        .warehouse
        .fetch_outcomes(&filter)
        .await
        .map_err(|e| error_status("Failed to fetch records for CSV export", e))?;

    if records.is_empty() {
        warn!("CSV export requested but no records match the filter");
        return Err(StatusCode::NOT_FOUND);
    }

    info!("Exporting {} outcome records as CSV", records.len());
    let body = render_csv(&records);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=desenlaces_quemados.csv",
            ),
        ],
        body,
    )
        .into_response())
}

/// Renders the export rows. The `estado` column collapses the discharge state
/// to either the recorded condition or a still-admitted marker.
pub fn render_csv(records: &[OutcomeRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for record in records {
        let status = match (&record.discharge_date, &record.discharge_condition) {
            (None, _) => "Hospitalizado",
            (Some(_), Some(condition)) => condition.as_str(),
            (Some(_), None) => "",
        };

        let row = [
            record
                .admission_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            csv_field(record.patient_name.as_deref().unwrap_or("")),
            record.age.map(|a| a.to_string()).unwrap_or_default(),
            csv_field(record.sex.as_deref().unwrap_or("")),
            csv_field(record.diagnosis.as_deref().unwrap_or("")),
            csv_field(record.insurer.as_deref().unwrap_or("")),
            record.stay_days.map(|d| d.to_string()).unwrap_or_default(),
            csv_field(status),
        ];

        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quotes a field when it contains a delimiter, a quote, or a line break;
/// embedded quotes are doubled per RFC 4180.
pub fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
