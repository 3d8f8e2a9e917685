use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One record as it arrives from a data source, before cleaning. Every field
/// is an optional string so that a malformed cell can degrade to null instead
/// of failing the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutcome {
    pub outcome_id: Option<String>,
    pub episode: Option<String>,
    pub admission_date: Option<String>,
    pub discharge_date: Option<String>,
    pub stay_days: Option<String>,
    pub diagnosis: Option<String>,
    pub discharge_ward: Option<String>,
    pub cause: Option<String>,
    pub patient_name: Option<String>,
    pub sex: Option<String>,
    pub age: Option<String>,
    pub physician: Option<String>,
    pub chart_number: Option<String>,
    pub insurer: Option<String>,
    pub discharge_condition: Option<String>,
}

/// One patient admission-to-discharge episode, cleaned and persisted as an
/// immutable snapshot in `dashboard_desenlaces`. Serialized field names match
/// the wire format the dashboard frontend consumes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct OutcomeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "desenlaceq_id")]
    pub outcome_id: Option<i64>,
    #[serde(rename = "numero_episodio")]
    pub episode: Option<i64>,
    #[serde(rename = "fecha_ingreso")]
    pub admission_date: Option<NaiveDate>,
    #[serde(rename = "fecha_egreso")]
    pub discharge_date: Option<NaiveDate>,
    #[serde(rename = "dias_estancia")]
    pub stay_days: Option<i64>,
    #[serde(rename = "diagnostico")]
    pub diagnosis: Option<String>,
    #[serde(rename = "sala_egreso")]
    pub discharge_ward: Option<String>,
    #[serde(rename = "causa")]
    pub cause: Option<String>,
    #[serde(rename = "nombre_paciente")]
    pub patient_name: Option<String>,
    #[serde(rename = "sexo")]
    pub sex: Option<String>,
    #[serde(rename = "edad")]
    pub age: Option<i64>,
    #[serde(rename = "medico_tratante")]
    pub physician: Option<String>,
    #[serde(rename = "numero_historia_clinica")]
    pub chart_number: Option<String>,
    #[serde(rename = "nombre_aseguradora")]
    pub insurer: Option<String>,
    #[serde(rename = "condicion_egreso_nombre")]
    pub discharge_condition: Option<String>,
    #[serde(rename = "fecha_procesamiento")]
    pub processed_at: Option<NaiveDateTime>,
}

impl Default for OutcomeRecord {
    fn default() -> Self {
        Self {
            id: None,
            outcome_id: None,
            episode: None,
            admission_date: None,
            discharge_date: None,
            stay_days: None,
            diagnosis: None,
            discharge_ward: None,
            cause: None,
            patient_name: None,
            sex: None,
            age: None,
            physician: None,
            chart_number: None,
            insurer: None,
            discharge_condition: None,
            processed_at: None,
        }
    }
}

/// Per-insurer aggregate, recomputed wholesale on every run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InsurerStats {
    #[serde(rename = "nombre_aseguradora")]
    pub insurer: String,
    #[serde(rename = "total_casos")]
    pub total_cases: u64,
    #[serde(rename = "promedio_estancia")]
    pub avg_stay: Option<f64>,
    #[serde(rename = "casos_mejorados")]
    pub improved_cases: u64,
    #[serde(rename = "casos_fallecidos")]
    pub deceased_cases: u64,
}

/// Per-(year, month) aggregate keyed on the admission date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyStats {
    #[serde(rename = "año")]
    pub year: i32,
    #[serde(rename = "mes")]
    pub month: u32,
    #[serde(rename = "total_ingresos")]
    pub admissions: u64,
    #[serde(rename = "promedio_estancia")]
    pub avg_stay: Option<f64>,
    #[serde(rename = "casos_mejorados")]
    pub improved_cases: u64,
    #[serde(rename = "casos_fallecidos")]
    pub deceased_cases: u64,
}

/// Per-(sex, age bucket) aggregate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DemographicStats {
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "rango_edad")]
    pub age_range: String,
    #[serde(rename = "total_casos")]
    pub total_cases: u64,
    #[serde(rename = "promedio_estancia")]
    pub avg_stay: Option<f64>,
}

/// Headline KPIs for the dashboard landing view.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    #[serde(rename = "total_pacientes")]
    pub total_patients: u64,
    #[serde(rename = "total_ingresos_mes")]
    pub admissions_this_month: u64,
    #[serde(rename = "promedio_estancia")]
    pub avg_stay: f64,
    #[serde(rename = "tasa_mortalidad")]
    pub mortality_rate: f64,
    #[serde(rename = "casos_activos")]
    pub active_cases: u64,
}

/// Share of one discharge condition within the stored batch.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConditionShare {
    #[serde(rename = "condicion_egreso_nombre")]
    pub condition: String,
    #[serde(rename = "total_casos")]
    pub total_cases: u64,
    #[serde(rename = "porcentaje")]
    pub percentage: f64,
}

/// One entry of the top-diagnoses ranking.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiagnosisStats {
    #[serde(rename = "diagnostico")]
    pub diagnosis: String,
    #[serde(rename = "total_casos")]
    pub total_cases: u64,
    #[serde(rename = "promedio_estancia")]
    pub avg_stay: Option<f64>,
}

/// One fixed length-of-stay bucket. Empty buckets keep a zero count and null
/// stats rather than disappearing from the distribution.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StayBucketStats {
    #[serde(rename = "rango_estancia")]
    pub range: String,
    #[serde(rename = "total_casos")]
    pub total_cases: u64,
    #[serde(rename = "promedio_estancia")]
    pub avg_stay: Option<f64>,
    #[serde(rename = "minimo")]
    pub min_stay: Option<i64>,
    #[serde(rename = "maximo")]
    pub max_stay: Option<i64>,
}

/// Whole-batch length-of-stay figures accompanying the bucket distribution.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StaySummary {
    #[serde(rename = "total_casos")]
    pub total_cases: u64,
    #[serde(rename = "promedio_general")]
    pub avg_stay: Option<f64>,
    #[serde(rename = "minimo_general")]
    pub min_stay: Option<i64>,
    #[serde(rename = "maximo_general")]
    pub max_stay: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DataSource {
    /// Synthetic sample data generated in-process.
    Sample,
    /// Extraction from the external clinical system.
    Clinical,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Sample => write!(f, "sample_data"),
            DataSource::Clinical => write!(f, "clinical_system"),
        }
    }
}

/// Phase of the single process-wide pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Running,
    Completed,
    Error,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::Running => write!(f, "running"),
            RunPhase::Completed => write!(f, "completed"),
            RunPhase::Error => write!(f, "error"),
        }
    }
}

/// Snapshot of the pipeline state triple, readable at any time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunStatus {
    pub status: RunPhase,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub is_running: bool,
}

/// Row counts written to each destination table by a successful run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TableCounts {
    #[serde(rename = "desenlaces_count")]
    pub outcomes: usize,
    #[serde(rename = "aseguradoras_count")]
    pub insurers: usize,
    #[serde(rename = "meses_count")]
    pub months: usize,
    #[serde(rename = "grupos_demograficos_count")]
    pub demographic_groups: usize,
}

/// Result of one completed pipeline run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunReport {
    pub status: &'static str,
    pub message: String,
    pub execution_time_seconds: f64,
    pub timestamp: DateTime<Utc>,
    pub data_source: String,
    pub statistics: TableCounts,
}
