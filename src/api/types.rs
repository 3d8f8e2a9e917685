use crate::db::warehouse::OutcomeFilter;
use crate::models::{
    ConditionShare, MonthlyStats, OutcomeRecord, RunReport, StayBucketStats, StaySummary,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ServiceBanner {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

/// Query parameters of the outcome-record list. Wire names match the
/// dashboard frontend; absent parameters are pass-through filters.
#[derive(Debug, Deserialize)]
pub struct OutcomeQuery {
    #[serde(rename = "fecha_inicio")]
    pub from_date: Option<NaiveDate>,
    #[serde(rename = "fecha_fin")]
    pub to_date: Option<NaiveDate>,
    #[serde(rename = "aseguradora")]
    pub insurer: Option<String>,
    #[serde(rename = "sexo")]
    pub sex: Option<String>,
    #[serde(rename = "edad_min")]
    pub min_age: Option<i64>,
    #[serde(rename = "edad_max")]
    pub max_age: Option<i64>,
    #[serde(rename = "condicion_egreso")]
    pub discharge_condition: Option<String>,
    pub limit: Option<usize>,
}

impl OutcomeQuery {
    pub fn into_filter(self) -> OutcomeFilter {
        OutcomeFilter {
            from_date: self.from_date,
            to_date: self.to_date,
            insurer: self.insurer,
            sex: self.sex,
            min_age: self.min_age,
            max_age: self.max_age,
            discharge_condition: self.discharge_condition,
            limit: self.limit,
        }
    }
}

/// The CSV export accepts the date-range and insurer filters only.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "fecha_inicio")]
    pub from_date: Option<NaiveDate>,
    #[serde(rename = "fecha_fin")]
    pub to_date: Option<NaiveDate>,
    #[serde(rename = "aseguradora")]
    pub insurer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChartHistoryResponse {
    #[serde(rename = "historia_clinica")]
    pub chart_number: String,
    #[serde(rename = "total_registros")]
    pub total_records: usize,
    #[serde(rename = "desenlaces")]
    pub records: Vec<OutcomeRecord>,
}

/// Stored monthly aggregate plus the Spanish month name the frontend shows.
#[derive(Debug, Serialize)]
pub struct MonthlyStatsRow {
    #[serde(flatten)]
    pub stats: MonthlyStats,
    #[serde(rename = "nombre_mes")]
    pub month_name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MortalityResponse {
    #[serde(rename = "total_casos")]
    pub total_cases: u64,
    #[serde(rename = "distribución")]
    pub distribution: Vec<ConditionShare>,
}

#[derive(Debug, Serialize)]
pub struct StayAnalysisResponse {
    #[serde(rename = "resumen_general")]
    pub summary: StaySummary,
    #[serde(rename = "distribución_por_rangos")]
    pub distribution: Vec<StayBucketStats>,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    #[serde(flatten)]
    pub report: RunReport,
    pub ready_for_demo: bool,
    pub next_steps: Vec<&'static str>,
}
