use crate::config::ClinicalConfig;
use crate::constants::EXTRACTION_WINDOW_DAYS;
use crate::db::DatabaseConnection;
use crate::models::RawOutcome;
use crate::Error;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Pool, PoolConstraints, PoolOpts, Row, SslOpts, Value};
use tracing::info;

/// Read-only connector to the external clinical system. Every extracted
/// column is surfaced as an optional string so the cleaner decides what a
/// cell is worth; connectivity failures are fatal to the run and never
/// retried here.
pub struct ClinicalSource {
    pool: Pool,
    config: ClinicalConfig,
}

impl ClinicalSource {
    pub fn new(config: ClinicalConfig) -> Result<Self> {
        let pool_constraints =
            PoolConstraints::new(0, 4).context("Failed to create pool constraints")?;
        let pool_opts = PoolOpts::default().with_constraints(pool_constraints);

        let opts = mysql_async::OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(config.database.clone()))
            .ssl_opts(SslOpts::default().with_danger_accept_invalid_certs(true))
            .pool_opts(pool_opts);

        Ok(Self {
            pool: Pool::new(opts),
            config,
        })
    }

    /// One joined extraction over the episode, insurer and discharge-condition
    /// catalogs, limited to the recent admission window.
    pub async fn extract_outcomes(&self) -> Result<Vec<RawOutcome>, Error> {
        let mut conn = self
            .pool
            .get_conn()
            .await
            .map_err(|e| Error::Extraction(format!("Failed to connect to clinical system: {}", e)))?;

        let query = format!(
            r"SELECT
                dq.desenlaceq_id,
                dq.numero_episodio,
                dq.fecha_ingreso,
                dq.fecha_egreso,
                dq.dias_estancia,
                dq.diagnostico,
                dq.sala_egreso,
                dq.causa,
                a.nombre_aseguradora,
                ce.nombre_estado AS condicion_egreso_nombre,
                e.nombre_paciente,
                e.sexo,
                e.edad,
                e.medico_tratante,
                e.numero_historia_clinica
            FROM desenlaces_quemados dq
            LEFT JOIN aseguradora a ON dq.aseguradora = a.aseguradora_id
            LEFT JOIN condicion_egreso ce ON dq.condicion_egreso = ce.condicion_egreso_id
            LEFT JOIN episodio e ON dq.numero_episodio = e.numero_episodio_id
            WHERE dq.fecha_ingreso >= DATE_SUB(CURDATE(), INTERVAL {} DAY)
            ORDER BY dq.fecha_ingreso DESC",
            EXTRACTION_WINDOW_DAYS
        );

        let rows: Vec<Row> = conn
            .query(query)
            .await
            .map_err(|e| Error::Extraction(format!("Clinical extraction query failed: {}", e)))?;

        let records: Vec<RawOutcome> = rows.into_iter().map(raw_from_row).collect();
        info!(
            "Extracted {} raw outcome records from clinical system",
            records.len()
        );

        Ok(records)
    }
}

fn raw_from_row(mut row: Row) -> RawOutcome {
    RawOutcome {
        outcome_id: raw_field(&mut row, "desenlaceq_id"),
        episode: raw_field(&mut row, "numero_episodio"),
        admission_date: raw_field(&mut row, "fecha_ingreso"),
        discharge_date: raw_field(&mut row, "fecha_egreso"),
        stay_days: raw_field(&mut row, "dias_estancia"),
        diagnosis: raw_field(&mut row, "diagnostico"),
        discharge_ward: raw_field(&mut row, "sala_egreso"),
        cause: raw_field(&mut row, "causa"),
        patient_name: raw_field(&mut row, "nombre_paciente"),
        sex: raw_field(&mut row, "sexo"),
        age: raw_field(&mut row, "edad"),
        physician: raw_field(&mut row, "medico_tratante"),
        chart_number: raw_field(&mut row, "numero_historia_clinica"),
        insurer: raw_field(&mut row, "nombre_aseguradora"),
        discharge_condition: raw_field(&mut row, "condicion_egreso_nombre"),
    }
}

/// Stringify whatever the source column holds; NULL stays None.
fn raw_field(row: &mut Row, name: &str) -> Option<String> {
    match row.take::<Value, _>(name)? {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Int(v) => Some(v.to_string()),
        Value::UInt(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Double(v) => Some(v.to_string()),
        Value::Date(year, month, day, 0, 0, 0, 0) => {
            Some(format!("{:04}-{:02}-{:02}", year, month, day))
        }
        Value::Date(year, month, day, hour, minute, second, _) => Some(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        )),
        Value::Time(..) => None,
    }
}

#[async_trait]
impl DatabaseConnection for ClinicalSource {
    async fn connect(&self) -> Result<()> {
        match self.pool.get_conn().await {
            Ok(_) => {
                info!(
                    "Connected to clinical system {} at {}:{}",
                    self.config.database, self.config.host, self.config.port
                );
                Ok(())
            }
            Err(e) => Err(anyhow!("Failed to verify clinical connection: {}", e)),
        }
    }

    async fn disconnect(&self) -> Result<()> {
        self.pool
            .clone()
            .disconnect()
            .await
            .context("Failed to disconnect clinical pool")
    }

    async fn is_connected(&self) -> bool {
        self.pool.get_conn().await.is_ok()
    }
}
