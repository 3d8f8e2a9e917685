use crate::config::ClinicalConfig;
use crate::constants::SAMPLE_BATCH_SIZE;
use crate::db::clinical::ClinicalSource;
use crate::db::warehouse::Warehouse;
use crate::db::DatabaseConnection;
use crate::etl::{aggregate, cleaner, sample};
use crate::models::{DataSource, RunPhase, RunReport, RunStatus, TableCounts};
use crate::Error;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info, warn};

struct TrackerInner {
    phase: RunPhase,
    last_run: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Process-wide run state: Idle → Running → {Completed, Error}. A terminal
/// state is overwritten directly by the next run; only one run may hold the
/// Running phase at a time.
pub struct RunTracker {
    state: Mutex<TrackerInner>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerInner {
                phase: RunPhase::Idle,
                last_run: None,
                last_error: None,
            }),
        }
    }

    /// Claims the Running phase, or fails fast with a conflict while another
    /// run is in flight. A rejected attempt leaves the state untouched.
    pub fn begin(&self) -> Result<(), Error> {
        let mut state = self.lock();
        if state.phase == RunPhase::Running {
            return Err(Error::AlreadyRunning);
        }
        state.phase = RunPhase::Running;
        Ok(())
    }

    pub fn complete(&self, finished: DateTime<Utc>) {
        let mut state = self.lock();
        state.phase = RunPhase::Completed;
        state.last_run = Some(finished);
        state.last_error = None;
    }

    pub fn fail(&self, message: String) {
        let mut state = self.lock();
        state.phase = RunPhase::Error;
        state.last_error = Some(message);
    }

    /// Pure read of the state triple; never blocks on a run.
    pub fn snapshot(&self) -> RunStatus {
        let state = self.lock();
        RunStatus {
            status: state.phase,
            last_run: state.last_run,
            last_error: state.last_error.clone(),
            is_running: state.phase == RunPhase::Running,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerInner> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequences one clean → aggregate → load run against the warehouse. Each
/// destination table is replaced in its own transaction; a failure after some
/// tables committed does not roll the earlier ones back.
pub struct Pipeline {
    warehouse: Arc<Warehouse>,
    tracker: RunTracker,
}

impl Pipeline {
    pub fn new(warehouse: Arc<Warehouse>) -> Self {
        Self {
            warehouse,
            tracker: RunTracker::new(),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.tracker.snapshot()
    }

    pub async fn run(&self, source: DataSource) -> Result<RunReport, Error> {
        self.tracker.begin()?;

        let started_at = Instant::now();
        info!("=== Starting ETL run (source: {}) ===", source);

        match self.execute(source).await {
            Ok(counts) => {
                let finished = Utc::now();
                self.tracker.complete(finished);

                let execution_time_seconds =
                    aggregate::round2(started_at.elapsed().as_secs_f64());
                info!(
                    "ETL run completed in {}s: {} outcomes, {} insurers, {} months, {} demographic groups",
                    execution_time_seconds,
                    counts.outcomes,
                    counts.insurers,
                    counts.months,
                    counts.demographic_groups
                );

                Ok(RunReport {
                    status: "success",
                    message: "ETL run completed successfully".to_string(),
                    execution_time_seconds,
                    timestamp: finished,
                    data_source: source.to_string(),
                    statistics: counts,
                })
            }
            Err(e) => {
                error!("ETL run failed: {}", e);
                self.tracker.fail(e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(&self, source: DataSource) -> Result<TableCounts, Error> {
        self.warehouse.create_tables().await?;

        let raw = match source {
            DataSource::Sample => sample::generate_batch(SAMPLE_BATCH_SIZE),
            DataSource::Clinical => {
                let config = ClinicalConfig::from_env().map_err(Error::from)?;
                let clinical = ClinicalSource::new(config).map_err(Error::from)?;
                let records = clinical.extract_outcomes().await?;
                if let Err(e) = clinical.disconnect().await {
                    warn!("Failed to disconnect clinical source: {}", e);
                }
                records
            }
        };

        let report = cleaner::clean_batch(raw);
        let records = report.records;

        let summary = aggregate::summarize(&records, Utc::now().date_naive());
        info!(
            "Cleaned batch: {} records ({} duplicates dropped), {} distinct patients, mortality rate {:.2}%",
            records.len(),
            report.duplicates_removed,
            summary.total_patients,
            summary.mortality_rate
        );

        let insurer_stats = aggregate::by_insurer(&records);
        let monthly_stats = aggregate::by_month(&records);
        let demographic_stats = aggregate::by_demographics(&records);

        let outcomes = self.warehouse.replace_outcomes(&records).await?;
        let insurers = self.warehouse.replace_insurer_stats(&insurer_stats).await?;
        let months = self.warehouse.replace_monthly_stats(&monthly_stats).await?;
        let demographic_groups = self
            .warehouse
            .replace_demographic_stats(&demographic_stats)
            .await?;

        Ok(TableCounts {
            outcomes,
            insurers,
            months,
            demographic_groups,
        })
    }
}
