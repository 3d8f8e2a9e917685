use crate::config::WarehouseConfig;
use crate::constants::{DEFAULT_RECORD_LIMIT, MAX_RECORD_LIMIT};
use crate::db::DatabaseConnection;
use crate::models::{
    DashboardSummary, DemographicStats, InsurerStats, MonthlyStats, OutcomeRecord,
};
use crate::Error;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use mysql_async::prelude::Queryable;
use mysql_async::{params, Params, Pool, PoolConstraints, PoolOpts, Row, TxOpts, Value};
use tracing::info;

/// Optional filters applied to the stored outcome records. Absent filters are
/// pass-through; the limit is clamped to [1, MAX_RECORD_LIMIT].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeFilter {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub insurer: Option<String>,
    pub sex: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub discharge_condition: Option<String>,
    pub limit: Option<usize>,
}

impl OutcomeFilter {
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_RECORD_LIMIT)
            .clamp(1, MAX_RECORD_LIMIT)
    }
}

/// Reporting warehouse behind the dashboard. Destination tables are fully
/// replaced on every pipeline run; each replace commits as its own
/// transaction, there is no cross-table transaction.
pub struct Warehouse {
    pool: Pool,
    config: WarehouseConfig,
}

impl Warehouse {
    pub fn new(config: WarehouseConfig) -> Result<Self> {
        let pool_constraints =
            PoolConstraints::new(0, 12).context("Failed to create pool constraints")?;
        let pool_opts = PoolOpts::default().with_constraints(pool_constraints);

        let opts = mysql_async::OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()))
            .pool_opts(pool_opts);

        Ok(Self {
            pool: Pool::new(opts),
            config,
        })
    }

    /// Idempotent create-if-absent for the four destination tables.
    pub async fn create_tables(&self) -> Result<(), Error> {
        let mut conn = self.pool.get_conn().await?;

        conn.query_drop(
            r"CREATE TABLE IF NOT EXISTS dashboard_desenlaces (
                id INT AUTO_INCREMENT PRIMARY KEY,
                desenlaceq_id INT,
                numero_episodio INT,
                fecha_ingreso DATE,
                fecha_egreso DATE,
                dias_estancia INT,
                diagnostico TEXT,
                sala_egreso VARCHAR(100),
                causa TEXT,
                nombre_paciente VARCHAR(200),
                sexo VARCHAR(20),
                edad INT,
                medico_tratante VARCHAR(200),
                numero_historia_clinica VARCHAR(50),
                nombre_aseguradora VARCHAR(200),
                condicion_egreso_nombre VARCHAR(100),
                fecha_procesamiento TIMESTAMP NULL
            ) DEFAULT CHARSET=utf8mb4",
        )
        .await?;

        conn.query_drop(
            r"CREATE TABLE IF NOT EXISTS dashboard_stats_aseguradora (
                id INT AUTO_INCREMENT PRIMARY KEY,
                nombre_aseguradora VARCHAR(200),
                total_casos INT,
                promedio_estancia DOUBLE,
                casos_mejorados INT,
                casos_fallecidos INT,
                fecha_procesamiento TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ) DEFAULT CHARSET=utf8mb4",
        )
        .await?;

        conn.query_drop(
            r"CREATE TABLE IF NOT EXISTS dashboard_stats_mensual (
                id INT AUTO_INCREMENT PRIMARY KEY,
                anio INT,
                mes INT,
                total_ingresos INT,
                promedio_estancia DOUBLE,
                casos_mejorados INT,
                casos_fallecidos INT,
                fecha_procesamiento TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ) DEFAULT CHARSET=utf8mb4",
        )
        .await?;

        conn.query_drop(
            r"CREATE TABLE IF NOT EXISTS dashboard_stats_demografia (
                id INT AUTO_INCREMENT PRIMARY KEY,
                sexo VARCHAR(20),
                rango_edad VARCHAR(20),
                total_casos INT,
                promedio_estancia DOUBLE,
                fecha_procesamiento TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            ) DEFAULT CHARSET=utf8mb4",
        )
        .await?;

        info!("Destination tables verified in warehouse");
        Ok(())
    }

    /// Full-replace load of the outcome records table.
    pub async fn replace_outcomes(&self, records: &[OutcomeRecord]) -> Result<usize, Error> {
        let mut conn = self.pool.get_conn().await?;
        let mut tx = conn.start_transaction(TxOpts::default()).await?;

        tx.query_drop("DELETE FROM dashboard_desenlaces").await?;
        tx.exec_batch(
            r"INSERT INTO dashboard_desenlaces
              (desenlaceq_id, numero_episodio, fecha_ingreso, fecha_egreso, dias_estancia,
               diagnostico, sala_egreso, causa, nombre_paciente, sexo, edad,
               medico_tratante, numero_historia_clinica, nombre_aseguradora,
               condicion_egreso_nombre, fecha_procesamiento)
              VALUES (:desenlaceq_id, :numero_episodio, :fecha_ingreso, :fecha_egreso,
                      :dias_estancia, :diagnostico, :sala_egreso, :causa, :nombre_paciente,
                      :sexo, :edad, :medico_tratante, :numero_historia_clinica,
                      :nombre_aseguradora, :condicion_egreso_nombre, :fecha_procesamiento)",
            records.iter().map(|r| {
                params! {
                    "desenlaceq_id" => r.outcome_id,
                    "numero_episodio" => r.episode,
                    "fecha_ingreso" => r.admission_date,
                    "fecha_egreso" => r.discharge_date,
                    "dias_estancia" => r.stay_days,
                    "diagnostico" => r.diagnosis.clone(),
                    "sala_egreso" => r.discharge_ward.clone(),
                    "causa" => r.cause.clone(),
                    "nombre_paciente" => r.patient_name.clone(),
                    "sexo" => r.sex.clone(),
                    "edad" => r.age,
                    "medico_tratante" => r.physician.clone(),
                    "numero_historia_clinica" => r.chart_number.clone(),
                    "nombre_aseguradora" => r.insurer.clone(),
                    "condicion_egreso_nombre" => r.discharge_condition.clone(),
                    "fecha_procesamiento" => r.processed_at,
                }
            }),
        )
        .await?;
        tx.commit().await?;

        info!("Loaded {} rows into dashboard_desenlaces", records.len());
        Ok(records.len())
    }

    pub async fn replace_insurer_stats(&self, stats: &[InsurerStats]) -> Result<usize, Error> {
        let mut conn = self.pool.get_conn().await?;
        let mut tx = conn.start_transaction(TxOpts::default()).await?;

        tx.query_drop("DELETE FROM dashboard_stats_aseguradora").await?;
        tx.exec_batch(
            r"INSERT INTO dashboard_stats_aseguradora
              (nombre_aseguradora, total_casos, promedio_estancia, casos_mejorados, casos_fallecidos)
              VALUES (:nombre_aseguradora, :total_casos, :promedio_estancia,
                      :casos_mejorados, :casos_fallecidos)",
            stats.iter().map(|s| {
                params! {
                    "nombre_aseguradora" => s.insurer.clone(),
                    "total_casos" => s.total_cases,
                    "promedio_estancia" => s.avg_stay,
                    "casos_mejorados" => s.improved_cases,
                    "casos_fallecidos" => s.deceased_cases,
                }
            }),
        )
        .await?;
        tx.commit().await?;

        info!("Loaded {} rows into dashboard_stats_aseguradora", stats.len());
        Ok(stats.len())
    }

    pub async fn replace_monthly_stats(&self, stats: &[MonthlyStats]) -> Result<usize, Error> {
        let mut conn = self.pool.get_conn().await?;
        let mut tx = conn.start_transaction(TxOpts::default()).await?;

        tx.query_drop("DELETE FROM dashboard_stats_mensual").await?;
        tx.exec_batch(
            r"INSERT INTO dashboard_stats_mensual
              (anio, mes, total_ingresos, promedio_estancia, casos_mejorados, casos_fallecidos)
              VALUES (:anio, :mes, :total_ingresos, :promedio_estancia,
                      :casos_mejorados, :casos_fallecidos)",
            stats.iter().map(|s| {
                params! {
                    "anio" => s.year,
                    "mes" => s.month,
                    "total_ingresos" => s.admissions,
                    "promedio_estancia" => s.avg_stay,
                    "casos_mejorados" => s.improved_cases,
                    "casos_fallecidos" => s.deceased_cases,
                }
            }),
        )
        .await?;
        tx.commit().await?;

        info!("Loaded {} rows into dashboard_stats_mensual", stats.len());
        Ok(stats.len())
    }

    pub async fn replace_demographic_stats(
        &self,
        stats: &[DemographicStats],
    ) -> Result<usize, Error> {
        let mut conn = self.pool.get_conn().await?;
        let mut tx = conn.start_transaction(TxOpts::default()).await?;

        tx.query_drop("DELETE FROM dashboard_stats_demografia").await?;
        tx.exec_batch(
            r"INSERT INTO dashboard_stats_demografia
              (sexo, rango_edad, total_casos, promedio_estancia)
              VALUES (:sexo, :rango_edad, :total_casos, :promedio_estancia)",
            stats.iter().map(|s| {
                params! {
                    "sexo" => s.sex.clone(),
                    "rango_edad" => s.age_range.clone(),
                    "total_casos" => s.total_cases,
                    "promedio_estancia" => s.avg_stay,
                }
            }),
        )
        .await?;
        tx.commit().await?;

        info!("Loaded {} rows into dashboard_stats_demografia", stats.len());
        Ok(stats.len())
    }

    /// Filtered read over the stored outcome records, most recent admission
    /// first, capped by the filter's effective limit.
    pub async fn fetch_outcomes(&self, filter: &OutcomeFilter) -> Result<Vec<OutcomeRecord>, Error> {
        let (clauses, values) = filter_clauses(filter);
        let query = format!(
            "SELECT id, desenlaceq_id, numero_episodio, fecha_ingreso, fecha_egreso, \
             dias_estancia, diagnostico, sala_egreso, causa, nombre_paciente, sexo, edad, \
             medico_tratante, numero_historia_clinica, nombre_aseguradora, \
             condicion_egreso_nombre, fecha_procesamiento \
             FROM dashboard_desenlaces WHERE 1=1{} \
             ORDER BY fecha_ingreso DESC LIMIT {}",
            clauses,
            filter.effective_limit()
        );

        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<Row> = conn.exec(query.as_str(), Params::from(values)).await?;

        Ok(rows.into_iter().map(outcome_from_row).collect())
    }

    pub async fn fetch_outcome_by_id(&self, outcome_id: i64) -> Result<OutcomeRecord, Error> {
        let mut conn = self.pool.get_conn().await?;
        let row: Option<Row> = conn
            .exec_first(
                "SELECT id, desenlaceq_id, numero_episodio, fecha_ingreso, fecha_egreso, \
                 dias_estancia, diagnostico, sala_egreso, causa, nombre_paciente, sexo, edad, \
                 medico_tratante, numero_historia_clinica, nombre_aseguradora, \
                 condicion_egreso_nombre, fecha_procesamiento \
                 FROM dashboard_desenlaces WHERE desenlaceq_id = :outcome_id",
                params! { "outcome_id" => outcome_id },
            )
            .await?;

        row.map(outcome_from_row).ok_or(Error::NotFound)
    }

    pub async fn fetch_outcomes_by_chart(
        &self,
        chart_number: &str,
    ) -> Result<Vec<OutcomeRecord>, Error> {
        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<Row> = conn
            .exec(
                "SELECT id, desenlaceq_id, numero_episodio, fecha_ingreso, fecha_egreso, \
                 dias_estancia, diagnostico, sala_egreso, causa, nombre_paciente, sexo, edad, \
                 medico_tratante, numero_historia_clinica, nombre_aseguradora, \
                 condicion_egreso_nombre, fecha_procesamiento \
                 FROM dashboard_desenlaces WHERE numero_historia_clinica = :chart_number \
                 ORDER BY fecha_ingreso DESC",
                params! { "chart_number" => chart_number },
            )
            .await?;

        Ok(rows.into_iter().map(outcome_from_row).collect())
    }

    pub async fn fetch_insurer_stats(&self) -> Result<Vec<InsurerStats>, Error> {
        let mut conn = self.pool.get_conn().await?;
        let stats = conn
            .exec_map(
                "SELECT nombre_aseguradora, total_casos, promedio_estancia, \
                 casos_mejorados, casos_fallecidos \
                 FROM dashboard_stats_aseguradora ORDER BY total_casos DESC",
                (),
                |(insurer, total_cases, avg_stay, improved_cases, deceased_cases): (
                    String,
                    u64,
                    Option<f64>,
                    u64,
                    u64,
                )| InsurerStats {
                    insurer,
                    total_cases,
                    avg_stay,
                    improved_cases,
                    deceased_cases,
                },
            )
            .await?;
        Ok(stats)
    }

    /// Most recent twelve months of stored monthly aggregates.
    pub async fn fetch_monthly_stats(&self) -> Result<Vec<MonthlyStats>, Error> {
        let mut conn = self.pool.get_conn().await?;
        let stats = conn
            .exec_map(
                "SELECT anio, mes, total_ingresos, promedio_estancia, \
                 casos_mejorados, casos_fallecidos \
                 FROM dashboard_stats_mensual ORDER BY anio DESC, mes DESC LIMIT 12",
                (),
                |(year, month, admissions, avg_stay, improved_cases, deceased_cases): (
                    i32,
                    u32,
                    u64,
                    Option<f64>,
                    u64,
                    u64,
                )| MonthlyStats {
                    year,
                    month,
                    admissions,
                    avg_stay,
                    improved_cases,
                    deceased_cases,
                },
            )
            .await?;
        Ok(stats)
    }

    pub async fn fetch_demographic_stats(&self) -> Result<Vec<DemographicStats>, Error> {
        let mut conn = self.pool.get_conn().await?;
        let stats = conn
            .exec_map(
                "SELECT sexo, rango_edad, total_casos, promedio_estancia \
                 FROM dashboard_stats_demografia ORDER BY sexo, rango_edad",
                (),
                |(sex, age_range, total_cases, avg_stay): (String, String, u64, Option<f64>)| {
                    DemographicStats {
                        sex,
                        age_range,
                        total_cases,
                        avg_stay,
                    }
                },
            )
            .await?;
        Ok(stats)
    }

    /// Headline KPIs computed directly against the stored records.
    pub async fn fetch_summary(&self) -> Result<DashboardSummary, Error> {
        let (total_patients, admissions_this_month, active_cases, (known, deceased), stays) =
            futures::try_join!(
                self.count_scalar(
                    "SELECT COUNT(DISTINCT numero_historia_clinica) FROM dashboard_desenlaces \
                     WHERE numero_historia_clinica IS NOT NULL",
                ),
                self.count_scalar(
                    "SELECT COUNT(*) FROM dashboard_desenlaces \
                     WHERE MONTH(fecha_ingreso) = MONTH(CURDATE()) \
                     AND YEAR(fecha_ingreso) = YEAR(CURDATE())",
                ),
                self.count_scalar(
                    "SELECT COUNT(*) FROM dashboard_desenlaces WHERE fecha_egreso IS NULL",
                ),
                self.mortality_counts(),
                self.fetch_stay_days(),
            )?;

        let avg_stay = if stays.is_empty() {
            0.0
        } else {
            stays.iter().sum::<i64>() as f64 / stays.len() as f64
        };
        let mortality_rate = if known > 0 {
            ((deceased as f64 / known as f64) * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Ok(DashboardSummary {
            total_patients,
            admissions_this_month,
            avg_stay,
            mortality_rate,
            active_cases,
        })
    }

    /// Per-condition case counts over rows with a known discharge condition.
    pub async fn fetch_condition_counts(&self) -> Result<Vec<(String, u64)>, Error> {
        let mut conn = self.pool.get_conn().await?;
        let counts = conn
            .exec_map(
                "SELECT condicion_egreso_nombre, COUNT(*) FROM dashboard_desenlaces \
                 WHERE condicion_egreso_nombre IS NOT NULL \
                 GROUP BY condicion_egreso_nombre",
                (),
                |(condition, total): (String, u64)| (condition, total),
            )
            .await?;
        Ok(counts)
    }

    /// (diagnosis, stay) pairs for the top-diagnoses ranking.
    pub async fn fetch_diagnosis_rows(&self) -> Result<Vec<(String, Option<i64>)>, Error> {
        let mut conn = self.pool.get_conn().await?;
        let rows = conn
            .exec_map(
                "SELECT diagnostico, dias_estancia FROM dashboard_desenlaces \
                 WHERE diagnostico IS NOT NULL AND diagnostico != ''",
                (),
                |(diagnosis, stay): (String, Option<i64>)| (diagnosis, stay),
            )
            .await?;
        Ok(rows)
    }

    /// All non-null lengths of stay in the stored batch.
    pub async fn fetch_stay_days(&self) -> Result<Vec<i64>, Error> {
        let mut conn = self.pool.get_conn().await?;
        let stays = conn
            .exec_map(
                "SELECT dias_estancia FROM dashboard_desenlaces WHERE dias_estancia IS NOT NULL",
                (),
                |stay: i64| stay,
            )
            .await?;
        Ok(stays)
    }

    async fn count_scalar(&self, query: &str) -> Result<u64, Error> {
        let mut conn = self.pool.get_conn().await?;
        let count: Option<u64> = conn.query_first(query).await?;
        Ok(count.unwrap_or(0))
    }

    async fn mortality_counts(&self) -> Result<(u64, u64), Error> {
        let mut conn = self.pool.get_conn().await?;
        let counts: Option<(u64, u64)> = conn
            .query_first(
                "SELECT COUNT(*), \
                 COUNT(CASE WHEN LOWER(condicion_egreso_nombre) LIKE '%fallecido%' THEN 1 END) \
                 FROM dashboard_desenlaces WHERE condicion_egreso_nombre IS NOT NULL",
            )
            .await?;
        Ok(counts.unwrap_or((0, 0)))
    }
}

/// Builds the WHERE fragment and positional bindings for an outcome filter.
/// Absent filters contribute no clause; insurer and discharge condition match
/// as substrings, dates and ages as range bounds, sex exactly.
pub fn filter_clauses(filter: &OutcomeFilter) -> (String, Vec<Value>) {
    let mut clauses = String::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(from) = filter.from_date {
        clauses.push_str(" AND fecha_ingreso >= ?");
        values.push(from.into());
    }
    if let Some(to) = filter.to_date {
        clauses.push_str(" AND fecha_ingreso <= ?");
        values.push(to.into());
    }
    if let Some(insurer) = &filter.insurer {
        clauses.push_str(" AND nombre_aseguradora LIKE ?");
        values.push(format!("%{}%", insurer).into());
    }
    if let Some(sex) = &filter.sex {
        clauses.push_str(" AND sexo = ?");
        values.push(sex.clone().into());
    }
    if let Some(min_age) = filter.min_age {
        clauses.push_str(" AND edad >= ?");
        values.push(min_age.into());
    }
    if let Some(max_age) = filter.max_age {
        clauses.push_str(" AND edad <= ?");
        values.push(max_age.into());
    }
    if let Some(condition) = &filter.discharge_condition {
        clauses.push_str(" AND condicion_egreso_nombre LIKE ?");
        values.push(format!("%{}%", condition).into());
    }

    (clauses, values)
}

fn outcome_from_row(mut row: Row) -> OutcomeRecord {
    OutcomeRecord {
        id: row.take("id").flatten(),
        outcome_id: row.take("desenlaceq_id").flatten(),
        episode: row.take("numero_episodio").flatten(),
        admission_date: row.take("fecha_ingreso").flatten(),
        discharge_date: row.take("fecha_egreso").flatten(),
        stay_days: row.take("dias_estancia").flatten(),
        diagnosis: row.take("diagnostico").flatten(),
        discharge_ward: row.take("sala_egreso").flatten(),
        cause: row.take("causa").flatten(),
        patient_name: row.take("nombre_paciente").flatten(),
        sex: row.take("sexo").flatten(),
        age: row.take("edad").flatten(),
        physician: row.take("medico_tratante").flatten(),
        chart_number: row.take("numero_historia_clinica").flatten(),
        insurer: row.take("nombre_aseguradora").flatten(),
        discharge_condition: row.take("condicion_egreso_nombre").flatten(),
        processed_at: row.take("fecha_procesamiento").flatten(),
    }
}

#[async_trait]
impl DatabaseConnection for Warehouse {
    async fn connect(&self) -> Result<()> {
        match self.pool.get_conn().await {
            Ok(_) => {
                info!(
                    "Connected to warehouse {} at {}:{}",
                    self.config.database, self.config.host, self.config.port
                );
                Ok(())
            }
            Err(e) => Err(anyhow!("Failed to verify warehouse connection: {}", e)),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        self.pool
            .clone()
            .disconnect()
            .await
            .context("Failed to disconnect warehouse pool")
    }

    async fn is_connected(&self) -> bool {
        self.pool.get_conn().await.is_ok()
    }
}
