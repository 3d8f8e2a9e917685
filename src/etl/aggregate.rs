use crate::constants::{
    AGE_BUCKET_18_30, AGE_BUCKET_31_50, AGE_BUCKET_51_70, AGE_BUCKET_OVER_70,
    AGE_BUCKET_UNDER_18, AGE_BUCKET_UNKNOWN, DECEASED_CONDITION, IMPROVED_CONDITIONS,
    STAY_BUCKETS,
};
use crate::models::{
    ConditionShare, DashboardSummary, DemographicStats, DiagnosisStats, InsurerStats,
    MonthlyStats, OutcomeRecord, StayBucketStats, StaySummary,
};
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn is_improved(condition: &str) -> bool {
    IMPROVED_CONDITIONS.contains(&condition)
}

pub fn is_deceased(condition: &str) -> bool {
    condition == DECEASED_CONDITION
}

fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
    }
}

/// Headline KPIs over a cleaned batch. An empty batch yields zeros across the
/// board, never a division error.
pub fn summarize(records: &[OutcomeRecord], today: NaiveDate) -> DashboardSummary {
    let total_patients = records
        .iter()
        .filter_map(|r| r.chart_number.as_deref())
        .collect::<HashSet<_>>()
        .len() as u64;

    let admissions_this_month = records
        .iter()
        .filter_map(|r| r.admission_date)
        .filter(|d| d.year() == today.year() && d.month() == today.month())
        .count() as u64;

    let stays: Vec<i64> = records.iter().filter_map(|r| r.stay_days).collect();
    let avg_stay = mean(&stays).unwrap_or(0.0);

    let known_conditions: Vec<&str> = records
        .iter()
        .filter_map(|r| r.discharge_condition.as_deref())
        .collect();
    let deceased = known_conditions
        .iter()
        .filter(|c| c.to_lowercase().contains("fallecido"))
        .count();
    let mortality_rate = if known_conditions.is_empty() {
        0.0
    } else {
        round2(deceased as f64 / known_conditions.len() as f64 * 100.0)
    };

    let active_cases = records.iter().filter(|r| r.discharge_date.is_none()).count() as u64;

    DashboardSummary {
        total_patients,
        admissions_this_month,
        avg_stay,
        mortality_rate,
        active_cases,
    }
}

/// Per-insurer aggregate in insertion order of first occurrence. Records
/// without an insurer are left out of the grouping.
pub fn by_insurer(records: &[OutcomeRecord]) -> Vec<InsurerStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&OutcomeRecord>)> = Vec::new();

    for record in records {
        let Some(insurer) = record.insurer.as_deref() else {
            continue;
        };
        let slot = *index.entry(insurer).or_insert_with(|| {
            groups.push((insurer.to_string(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }

    groups
        .into_iter()
        .map(|(insurer, members)| {
            let stays: Vec<i64> = members.iter().filter_map(|r| r.stay_days).collect();
            InsurerStats {
                insurer,
                total_cases: members.len() as u64,
                avg_stay: mean(&stays).map(round1),
                improved_cases: count_conditions(&members, is_improved),
                deceased_cases: count_conditions(&members, is_deceased),
            }
        })
        .collect()
}

/// Per-(year, month) aggregate keyed on the admission date, insertion order.
pub fn by_month(records: &[OutcomeRecord]) -> Vec<MonthlyStats> {
    let mut index: HashMap<(i32, u32), usize> = HashMap::new();
    let mut groups: Vec<((i32, u32), Vec<&OutcomeRecord>)> = Vec::new();

    for record in records {
        let Some(admission) = record.admission_date else {
            continue;
        };
        let key = (admission.year(), admission.month());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }

    groups
        .into_iter()
        .map(|((year, month), members)| {
            let stays: Vec<i64> = members.iter().filter_map(|r| r.stay_days).collect();
            MonthlyStats {
                year,
                month,
                admissions: members.len() as u64,
                avg_stay: mean(&stays).map(round1),
                improved_cases: count_conditions(&members, is_improved),
                deceased_cases: count_conditions(&members, is_deceased),
            }
        })
        .collect()
}

/// Per-(sex, age bucket) aggregate, insertion order. Records without a sex
/// are left out; a null age lands in the unknown bucket.
pub fn by_demographics(records: &[OutcomeRecord]) -> Vec<DemographicStats> {
    let mut index: HashMap<(String, &'static str), usize> = HashMap::new();
    let mut groups: Vec<((String, &'static str), Vec<&OutcomeRecord>)> = Vec::new();

    for record in records {
        let Some(sex) = record.sex.as_deref() else {
            continue;
        };
        let key = (sex.to_string(), age_bucket(record.age));
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }

    groups
        .into_iter()
        .map(|((sex, age_range), members)| {
            let stays: Vec<i64> = members.iter().filter_map(|r| r.stay_days).collect();
            DemographicStats {
                sex,
                age_range: age_range.to_string(),
                total_cases: members.len() as u64,
                avg_stay: mean(&stays).map(round1),
            }
        })
        .collect()
}

fn count_conditions(members: &[&OutcomeRecord], predicate: fn(&str) -> bool) -> u64 {
    members
        .iter()
        .filter_map(|r| r.discharge_condition.as_deref())
        .filter(|c| predicate(c))
        .count() as u64
}

/// Fixed, non-overlapping age buckets for demographic grouping.
pub fn age_bucket(age: Option<i64>) -> &'static str {
    match age {
        None => AGE_BUCKET_UNKNOWN,
        Some(a) if a < 18 => AGE_BUCKET_UNDER_18,
        Some(a) if a <= 30 => AGE_BUCKET_18_30,
        Some(a) if a <= 50 => AGE_BUCKET_31_50,
        Some(a) if a <= 70 => AGE_BUCKET_51_70,
        Some(_) => AGE_BUCKET_OVER_70,
    }
}

/// Fixed length-of-stay bucket boundaries: ≤7, 8-14, 15-21, 22-30, >30 days.
pub fn stay_bucket(days: i64) -> &'static str {
    if days <= 7 {
        STAY_BUCKETS[0]
    } else if days <= 14 {
        STAY_BUCKETS[1]
    } else if days <= 21 {
        STAY_BUCKETS[2]
    } else if days <= 30 {
        STAY_BUCKETS[3]
    } else {
        STAY_BUCKETS[4]
    }
}

/// Share of each discharge condition, ordered by descending count with ties
/// broken lexicographically on the condition name.
pub fn mortality_distribution(counts: &[(String, u64)]) -> (u64, Vec<ConditionShare>) {
    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return (0, Vec::new());
    }

    let shares = counts
        .iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(condition, count)| ConditionShare {
            condition: condition.clone(),
            total_cases: *count,
            percentage: round2(*count as f64 / total as f64 * 100.0),
        })
        .collect();

    (total, shares)
}

/// Most frequent diagnoses with their mean stay, descending count with a
/// lexicographic tie-break, capped at `limit`.
pub fn top_diagnoses(rows: &[(String, Option<i64>)], limit: usize) -> Vec<DiagnosisStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<i64>, u64)> = Vec::new();

    for (diagnosis, stay) in rows {
        let slot = *index.entry(diagnosis.as_str()).or_insert_with(|| {
            groups.push((diagnosis.clone(), Vec::new(), 0));
            groups.len() - 1
        });
        groups[slot].2 += 1;
        if let Some(stay) = stay {
            groups[slot].1.push(*stay);
        }
    }

    groups
        .into_iter()
        .sorted_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)))
        .take(limit)
        .map(|(diagnosis, stays, total_cases)| DiagnosisStats {
            diagnosis,
            total_cases,
            avg_stay: mean(&stays).map(round1),
        })
        .collect()
}

/// Length-of-stay distribution over the fixed buckets plus whole-batch
/// figures. Only positive stays count, matching the source reports; every
/// bucket is always present, empty ones with a zero count and null stats.
pub fn stay_distribution(stays: &[i64]) -> (StaySummary, Vec<StayBucketStats>) {
    let positive: Vec<i64> = stays.iter().copied().filter(|&d| d > 0).collect();

    let summary = StaySummary {
        total_cases: positive.len() as u64,
        avg_stay: mean(&positive).map(round1),
        min_stay: positive.iter().min().copied(),
        max_stay: positive.iter().max().copied(),
    };

    let buckets = STAY_BUCKETS
        .iter()
        .map(|&label| {
            let members: Vec<i64> = positive
                .iter()
                .copied()
                .filter(|&d| stay_bucket(d) == label)
                .collect();
            StayBucketStats {
                range: label.to_string(),
                total_cases: members.len() as u64,
                avg_stay: mean(&members).map(round1),
                min_stay: members.iter().min().copied(),
                max_stay: members.iter().max().copied(),
            }
        })
        .collect();

    (summary, buckets)
}
