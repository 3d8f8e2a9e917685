use crate::constants::{CAUSES, DIAGNOSES, INSURERS, PATIENT_NAMES, PHYSICIANS, WARDS};
use crate::models::RawOutcome;
use chrono::{Duration, Utc};
use rand::prelude::*;
use tracing::info;

const SEX_VALUES: [&str; 6] = ["Masculino", "Femenino", "M", "F", "MALE", "FEMALE"];

/// Generates a batch of realistic synthetic outcome records. Output is raw on
/// purpose: sample data takes the same cleaning path as a real extraction.
pub fn generate_batch(num_records: usize) -> Vec<RawOutcome> {
    info!("Generating {} sample outcome records", num_records);

    let mut rng = thread_rng();
    let base_date = Utc::now().date_naive() - Duration::days(90);
    let mut records = Vec::with_capacity(num_records);

    for i in 0..num_records {
        let admission_date = base_date + Duration::days(rng.gen_range(0..=90));
        let stay_days = rng.gen_range(1..=45);
        // One in ten episodes is still admitted.
        let discharge_date = if rng.gen_bool(0.9) {
            Some(admission_date + Duration::days(stay_days))
        } else {
            None
        };

        // Longer stays skew toward worse outcomes.
        let condition = if stay_days > 30 {
            ["Fallecido", "Traslado", "Mejorado"].choose(&mut rng)
        } else if stay_days > 15 {
            ["Mejorado", "Alta médica", "Traslado"].choose(&mut rng)
        } else {
            ["Mejorado", "Alta médica"].choose(&mut rng)
        };

        records.push(RawOutcome {
            outcome_id: Some((i + 1).to_string()),
            episode: Some((i + 1000).to_string()),
            admission_date: Some(admission_date.format("%Y-%m-%d").to_string()),
            discharge_date: discharge_date.map(|d| d.format("%Y-%m-%d").to_string()),
            stay_days: Some(stay_days.to_string()),
            diagnosis: DIAGNOSES.choose(&mut rng).map(|d| d.to_string()),
            discharge_ward: WARDS.choose(&mut rng).map(|w| w.to_string()),
            cause: CAUSES.choose(&mut rng).map(|c| c.to_string()),
            patient_name: PATIENT_NAMES.choose(&mut rng).map(|n| n.to_string()),
            sex: SEX_VALUES.choose(&mut rng).map(|s| s.to_string()),
            age: Some(rng.gen_range(5..=85).to_string()),
            physician: PHYSICIANS.choose(&mut rng).map(|p| p.to_string()),
            chart_number: Some(format!("HC{}", rng.gen_range(100000..=999999))),
            insurer: INSURERS.choose(&mut rng).map(|a| a.to_string()),
            discharge_condition: condition.map(|c| c.to_string()),
        });
    }

    records
}
