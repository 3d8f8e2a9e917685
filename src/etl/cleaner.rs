use crate::constants::{MAX_AGE, MAX_STAY_DAYS, SEX_ALIASES};
use crate::models::{OutcomeRecord, RawOutcome};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use tracing::info;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%d/%m/%Y"];

/// Result of cleaning one batch: the surviving records plus how many exact
/// duplicates were dropped.
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub records: Vec<OutcomeRecord>,
    pub duplicates_removed: usize,
}

/// Normalizes a raw batch into cleaned outcome records. Best-effort per cell:
/// an unparsable or out-of-range value degrades to null, the batch itself
/// never fails. Exact duplicates collapse to their first occurrence and every
/// surviving row is stamped with the same processing timestamp.
pub fn clean_batch(raw: Vec<RawOutcome>) -> CleanReport {
    let initial_count = raw.len();
    info!("Cleaning batch of {} raw outcome records", initial_count);

    let cleaned = raw.into_iter().map(clean_record);

    let mut seen = HashSet::new();
    let mut records: Vec<OutcomeRecord> = Vec::new();
    for record in cleaned {
        if seen.insert(record.clone()) {
            records.push(record);
        }
    }
    let duplicates_removed = initial_count - records.len();
    if duplicates_removed > 0 {
        info!("Removed {} duplicate records", duplicates_removed);
    }

    let stamp = Utc::now().naive_utc();
    for record in &mut records {
        record.processed_at = Some(stamp);
    }

    info!("Cleaning completed, {} records remain", records.len());
    CleanReport {
        records,
        duplicates_removed,
    }
}

fn clean_record(raw: RawOutcome) -> OutcomeRecord {
    OutcomeRecord {
        id: None,
        outcome_id: parse_int(raw.outcome_id.as_deref()),
        episode: parse_int(raw.episode.as_deref()),
        admission_date: parse_date(raw.admission_date.as_deref()),
        discharge_date: parse_date(raw.discharge_date.as_deref()),
        stay_days: parse_int(raw.stay_days.as_deref()).filter(|&d| (0..=MAX_STAY_DAYS).contains(&d)),
        diagnosis: clean_string(raw.diagnosis),
        discharge_ward: clean_string(raw.discharge_ward),
        cause: clean_string(raw.cause),
        patient_name: clean_string(raw.patient_name),
        sex: clean_string(raw.sex).map(|s| normalize_sex(&s)),
        age: parse_int(raw.age.as_deref()).filter(|&a| (0..=MAX_AGE).contains(&a)),
        physician: clean_string(raw.physician),
        chart_number: clean_string(raw.chart_number),
        insurer: clean_string(raw.insurer),
        discharge_condition: clean_string(raw.discharge_condition),
        processed_at: None,
    }
}

/// Trims and drops empty strings and the usual null markers.
fn clean_string(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("null")
    {
        None
    } else {
        Some(trimmed)
    }
}

pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let trimmed = value?.trim();
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(trimmed, format)
            .or_else(|_| {
                chrono::NaiveDateTime::parse_from_str(trimmed, format).map(|dt| dt.date())
            })
            .ok()
    })
}

pub fn parse_int(value: Option<&str>) -> Option<i64> {
    let trimmed = value?.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    // Some sources hand back integers formatted as floats ("42.0").
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && v.is_finite())
        .map(|v| v as i64)
}

/// Maps the known sex aliases onto the two canonical values. Unrecognized
/// values pass through upper-cased, never silently remapped.
pub fn normalize_sex(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    match SEX_ALIASES.get(upper.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => upper,
    }
}
