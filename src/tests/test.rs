pub use crate::*;

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::api::export::{csv_field, render_csv};
    use crate::db::warehouse::{filter_clauses, OutcomeFilter};
    use crate::etl::pipeline::RunTracker;
    use crate::etl::{aggregate, cleaner, sample};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        insurer: Option<&str>,
        sex: Option<&str>,
        age: Option<i64>,
        stay_days: Option<i64>,
        condition: Option<&str>,
    ) -> OutcomeRecord {
        OutcomeRecord {
            insurer: insurer.map(str::to_string),
            sex: sex.map(str::to_string),
            age,
            stay_days,
            discharge_condition: condition.map(str::to_string),
            admission_date: Some(date(2026, 3, 10)),
            discharge_date: stay_days.map(|d| date(2026, 3, 10) + chrono::Duration::days(d)),
            chart_number: Some("HC123456".to_string()),
            ..Default::default()
        }
    }

    fn raw_with(mutate: impl FnOnce(&mut RawOutcome)) -> RawOutcome {
        let mut raw = RawOutcome {
            outcome_id: Some("1".to_string()),
            admission_date: Some("2026-03-10".to_string()),
            sex: Some("Masculino".to_string()),
            age: Some("40".to_string()),
            stay_days: Some("10".to_string()),
            ..Default::default()
        };
        mutate(&mut raw);
        raw
    }

    // --- Cleaner tests ---

    #[test]
    fn test_clean_drops_out_of_range_values() {
        let batch = vec![
            raw_with(|r| r.age = Some("-5".to_string())),
            raw_with(|r| {
                r.outcome_id = Some("2".to_string());
                r.age = Some("200".to_string());
            }),
            raw_with(|r| {
                r.outcome_id = Some("3".to_string());
                r.stay_days = Some("400".to_string());
            }),
        ];

        let report = cleaner::clean_batch(batch);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.records[0].age, None);
        assert_eq!(report.records[1].age, None);
        assert_eq!(report.records[2].stay_days, None);
    }

    #[test]
    fn test_clean_preserves_in_range_values() {
        let report = cleaner::clean_batch(vec![raw_with(|_| {})]);
        let record = &report.records[0];
        assert_eq!(record.outcome_id, Some(1));
        assert_eq!(record.age, Some(40));
        assert_eq!(record.stay_days, Some(10));
        assert_eq!(record.admission_date, Some(date(2026, 3, 10)));
    }

    #[test]
    fn test_clean_string_null_markers() {
        let batch = vec![raw_with(|r| {
            r.diagnosis = Some("  nan  ".to_string());
            r.cause = Some("NULL".to_string());
            r.patient_name = Some("  María García  ".to_string());
            r.insurer = Some("".to_string());
        })];

        let record = &cleaner::clean_batch(batch).records[0];
        assert_eq!(record.diagnosis, None);
        assert_eq!(record.cause, None);
        assert_eq!(record.insurer, None);
        assert_eq!(record.patient_name.as_deref(), Some("María García"));
    }

    #[test]
    fn test_parse_int_handles_float_formatted_integers() {
        assert_eq!(cleaner::parse_int(Some("42")), Some(42));
        assert_eq!(cleaner::parse_int(Some(" 17 ")), Some(17));
        assert_eq!(cleaner::parse_int(Some("42.0")), Some(42));
        assert_eq!(cleaner::parse_int(Some("42.5")), None);
        assert_eq!(cleaner::parse_int(Some("abc")), None);
        assert_eq!(cleaner::parse_int(None), None);
    }

    #[test]
    fn test_parse_date_accepted_formats() {
        let expected = Some(date(2026, 3, 5));
        assert_eq!(cleaner::parse_date(Some("2026-03-05")), expected);
        assert_eq!(cleaner::parse_date(Some("2026-03-05 14:30:00")), expected);
        assert_eq!(cleaner::parse_date(Some("05/03/2026")), expected);
        assert_eq!(cleaner::parse_date(Some("garbage")), None);
        assert_eq!(cleaner::parse_date(None), None);
    }

    #[test]
    fn test_normalize_sex_aliases() {
        assert_eq!(cleaner::normalize_sex("m"), SEX_MALE);
        assert_eq!(cleaner::normalize_sex(" F "), SEX_FEMALE);
        assert_eq!(cleaner::normalize_sex("MALE"), SEX_MALE);
        assert_eq!(cleaner::normalize_sex("femenino"), SEX_FEMALE);
        // Unrecognized values pass through upper-cased.
        assert_eq!(cleaner::normalize_sex("Indeterminado"), "INDETERMINADO");
    }

    #[test]
    fn test_clean_collapses_exact_duplicates() {
        let batch = vec![raw_with(|_| {}), raw_with(|_| {}), raw_with(|_| {})];
        let report = cleaner::clean_batch(batch);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.duplicates_removed, 2);
    }

    #[test]
    fn test_cleaning_is_idempotent_modulo_timestamp() {
        let first = cleaner::clean_batch(vec![raw_with(|r| {
            r.sex = Some("male".to_string());
            r.patient_name = Some("  Juan Carlos Rodríguez ".to_string());
            r.discharge_date = Some("2026-03-20".to_string());
        })]);
        let cleaned = &first.records[0];

        // Feed the cleaned values back through as a raw record.
        let recycled = RawOutcome {
            outcome_id: cleaned.outcome_id.map(|v| v.to_string()),
            episode: cleaned.episode.map(|v| v.to_string()),
            admission_date: cleaned
                .admission_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            discharge_date: cleaned
                .discharge_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            stay_days: cleaned.stay_days.map(|v| v.to_string()),
            diagnosis: cleaned.diagnosis.clone(),
            discharge_ward: cleaned.discharge_ward.clone(),
            cause: cleaned.cause.clone(),
            patient_name: cleaned.patient_name.clone(),
            sex: cleaned.sex.clone(),
            age: cleaned.age.map(|v| v.to_string()),
            physician: cleaned.physician.clone(),
            chart_number: cleaned.chart_number.clone(),
            insurer: cleaned.insurer.clone(),
            discharge_condition: cleaned.discharge_condition.clone(),
        };

        let second = cleaner::clean_batch(vec![recycled]);
        let mut recleaned = second.records[0].clone();
        recleaned.processed_at = cleaned.processed_at;
        assert_eq!(&recleaned, cleaned);
    }

    #[test]
    fn test_clean_stamps_whole_batch_once() {
        let batch = vec![
            raw_with(|_| {}),
            raw_with(|r| r.outcome_id = Some("2".to_string())),
        ];
        let report = cleaner::clean_batch(batch);
        let stamps: Vec<_> = report.records.iter().map(|r| r.processed_at).collect();
        assert!(stamps[0].is_some());
        assert_eq!(stamps[0], stamps[1]);
    }

    // --- Aggregation tests ---

    #[test]
    fn test_summarize_mortality_rate() {
        let records = vec![
            record(None, None, None, Some(5), Some("Fallecido")),
            record(None, None, None, Some(3), Some("Mejorado")),
            record(None, None, None, Some(8), Some("Mejorado")),
            // Unknown condition stays out of the denominator.
            record(None, None, None, Some(2), None),
        ];

        let summary = aggregate::summarize(&records, date(2026, 3, 15));
        assert_eq!(summary.mortality_rate, 33.33);
        assert_eq!(summary.admissions_this_month, 4);
    }

    #[test]
    fn test_summarize_empty_batch_is_all_zeros() {
        let summary = aggregate::summarize(&[], date(2026, 3, 15));
        assert_eq!(summary.total_patients, 0);
        assert_eq!(summary.admissions_this_month, 0);
        assert_eq!(summary.avg_stay, 0.0);
        assert_eq!(summary.mortality_rate, 0.0);
        assert_eq!(summary.active_cases, 0);
    }

    #[test]
    fn test_summarize_active_cases_and_distinct_patients() {
        let mut still_admitted = record(None, None, None, None, None);
        still_admitted.discharge_date = None;
        let records = vec![
            record(None, None, None, Some(5), Some("Mejorado")),
            still_admitted,
        ];

        let summary = aggregate::summarize(&records, date(2026, 3, 15));
        // Both rows share the same chart number.
        assert_eq!(summary.total_patients, 1);
        assert_eq!(summary.active_cases, 1);
    }

    #[test]
    fn test_by_insurer_grouping() {
        let records = vec![
            record(Some("SURA EPS"), None, None, Some(10), Some("Mejorado")),
            record(Some("Nueva EPS"), None, None, Some(4), Some("Fallecido")),
            record(Some("SURA EPS"), None, None, Some(20), Some("Alta médica")),
            record(None, None, None, Some(7), None),
        ];

        let stats = aggregate::by_insurer(&records);
        assert_eq!(stats.len(), 2);
        // Insertion order of first occurrence.
        assert_eq!(stats[0].insurer, "SURA EPS");
        assert_eq!(stats[0].total_cases, 2);
        assert_eq!(stats[0].avg_stay, Some(15.0));
        assert_eq!(stats[0].improved_cases, 2);
        assert_eq!(stats[0].deceased_cases, 0);
        assert_eq!(stats[1].insurer, "Nueva EPS");
        assert_eq!(stats[1].deceased_cases, 1);

        let total: u64 = stats.iter().map(|s| s.total_cases).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_by_month_keys_on_admission_date() {
        let mut february = record(None, None, None, Some(6), Some("Mejorado"));
        february.admission_date = Some(date(2026, 2, 20));
        let records = vec![
            record(None, None, None, Some(10), Some("Mejorado")),
            february,
            record(None, None, None, Some(2), Some("Fallecido")),
        ];

        let stats = aggregate::by_month(&records);
        assert_eq!(stats.len(), 2);
        assert_eq!((stats[0].year, stats[0].month), (2026, 3));
        assert_eq!(stats[0].admissions, 2);
        assert_eq!(stats[0].avg_stay, Some(6.0));
        assert_eq!((stats[1].year, stats[1].month), (2026, 2));
    }

    #[test]
    fn test_by_demographics_null_age_bucket() {
        let records = vec![
            record(None, Some(SEX_MALE), Some(25), Some(5), None),
            record(None, Some(SEX_MALE), None, Some(3), None),
            record(None, Some(SEX_FEMALE), Some(25), Some(9), None),
        ];

        let stats = aggregate::by_demographics(&records);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].sex, SEX_MALE);
        assert_eq!(stats[0].age_range, "18-30");
        assert_eq!(stats[1].age_range, AGE_BUCKET_UNKNOWN);
        assert_eq!(stats[2].sex, SEX_FEMALE);
    }

    #[test]
    fn test_age_bucket_boundaries() {
        assert_eq!(aggregate::age_bucket(Some(17)), AGE_BUCKET_UNDER_18);
        assert_eq!(aggregate::age_bucket(Some(18)), "18-30");
        assert_eq!(aggregate::age_bucket(Some(30)), "18-30");
        assert_eq!(aggregate::age_bucket(Some(31)), "31-50");
        assert_eq!(aggregate::age_bucket(Some(50)), "31-50");
        assert_eq!(aggregate::age_bucket(Some(51)), "51-70");
        assert_eq!(aggregate::age_bucket(Some(70)), "51-70");
        assert_eq!(aggregate::age_bucket(Some(71)), AGE_BUCKET_OVER_70);
        assert_eq!(aggregate::age_bucket(None), AGE_BUCKET_UNKNOWN);
    }

    #[test]
    fn test_stay_bucket_boundaries() {
        assert_eq!(aggregate::stay_bucket(1), STAY_BUCKETS[0]);
        assert_eq!(aggregate::stay_bucket(7), STAY_BUCKETS[0]);
        assert_eq!(aggregate::stay_bucket(8), STAY_BUCKETS[1]);
        assert_eq!(aggregate::stay_bucket(14), STAY_BUCKETS[1]);
        assert_eq!(aggregate::stay_bucket(15), STAY_BUCKETS[2]);
        assert_eq!(aggregate::stay_bucket(21), STAY_BUCKETS[2]);
        assert_eq!(aggregate::stay_bucket(22), STAY_BUCKETS[3]);
        assert_eq!(aggregate::stay_bucket(30), STAY_BUCKETS[3]);
        assert_eq!(aggregate::stay_bucket(31), STAY_BUCKETS[4]);
    }

    #[test]
    fn test_mortality_distribution_ordering_and_shares() {
        let counts = vec![
            ("Fallecido".to_string(), 1),
            ("Mejorado".to_string(), 2),
        ];

        let (total, shares) = aggregate::mortality_distribution(&counts);
        assert_eq!(total, 3);
        assert_eq!(shares[0].condition, "Mejorado");
        assert_eq!(shares[0].percentage, 66.67);
        assert_eq!(shares[1].condition, "Fallecido");
        assert_eq!(shares[1].percentage, 33.33);
    }

    #[test]
    fn test_mortality_distribution_tie_break_is_lexicographic() {
        let counts = vec![
            ("Traslado".to_string(), 2),
            ("Alta médica".to_string(), 2),
        ];
        let (_, shares) = aggregate::mortality_distribution(&counts);
        assert_eq!(shares[0].condition, "Alta médica");
        assert_eq!(shares[1].condition, "Traslado");
    }

    #[test]
    fn test_mortality_distribution_empty() {
        let (total, shares) = aggregate::mortality_distribution(&[]);
        assert_eq!(total, 0);
        assert!(shares.is_empty());
    }

    #[test]
    fn test_top_diagnoses_ranking_and_cap() {
        let rows = vec![
            ("Quemadura térmica".to_string(), Some(10)),
            ("Quemadura eléctrica".to_string(), Some(20)),
            ("Quemadura térmica".to_string(), Some(20)),
            ("Quemadura química".to_string(), None),
        ];

        let ranking = aggregate::top_diagnoses(&rows, 2);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].diagnosis, "Quemadura térmica");
        assert_eq!(ranking[0].total_cases, 2);
        assert_eq!(ranking[0].avg_stay, Some(15.0));
        // Tie at one case: lexicographic order decides.
        assert_eq!(ranking[1].diagnosis, "Quemadura eléctrica");
        assert_eq!(ranking[1].total_cases, 1);
    }

    #[test]
    fn test_top_diagnoses_null_stay_counts_without_skewing_average() {
        let rows = vec![
            ("Quemadura química".to_string(), None),
            ("Quemadura química".to_string(), Some(8)),
        ];
        let ranking = aggregate::top_diagnoses(&rows, 10);
        assert_eq!(ranking[0].total_cases, 2);
        assert_eq!(ranking[0].avg_stay, Some(8.0));
    }

    #[test]
    fn test_stay_distribution_all_buckets_present() {
        let (summary, buckets) = aggregate::stay_distribution(&[3, 10, 40, 0, -2]);

        assert_eq!(summary.total_cases, 3);
        assert_eq!(summary.min_stay, Some(3));
        assert_eq!(summary.max_stay, Some(40));

        assert_eq!(buckets.len(), STAY_BUCKETS.len());
        let counts: Vec<u64> = buckets.iter().map(|b| b.total_cases).collect();
        assert_eq!(counts, vec![1, 1, 0, 0, 1]);
        // Empty buckets keep null stats rather than fabricating zeros.
        assert_eq!(buckets[2].avg_stay, None);
        assert_eq!(buckets[2].min_stay, None);
    }

    #[test]
    fn test_stay_distribution_empty_input() {
        let (summary, buckets) = aggregate::stay_distribution(&[]);
        assert_eq!(summary.total_cases, 0);
        assert_eq!(summary.avg_stay, None);
        assert_eq!(buckets.len(), STAY_BUCKETS.len());
        assert!(buckets.iter().all(|b| b.total_cases == 0));
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(aggregate::round1(12.34), 12.3);
        assert_eq!(aggregate::round1(12.36), 12.4);
        assert_eq!(aggregate::round2(33.333333), 33.33);
        assert_eq!(aggregate::round2(66.666666), 66.67);
    }

    // --- Sample generator tests ---

    #[test]
    fn test_generate_batch_size_and_shape() {
        let batch = sample::generate_batch(50);
        assert_eq!(batch.len(), 50);

        for raw in &batch {
            assert!(raw.outcome_id.is_some());
            assert!(raw.admission_date.is_some());
            let stay: i64 = raw.stay_days.as_ref().unwrap().parse().unwrap();
            assert!((1..=45).contains(&stay));
            assert!(raw.chart_number.as_ref().unwrap().starts_with("HC"));
        }
    }

    #[test]
    fn test_generated_batch_survives_cleaning() {
        let report = cleaner::clean_batch(sample::generate_batch(100));
        assert_eq!(report.records.len() + report.duplicates_removed, 100);

        for record in &report.records {
            // Every generated sex alias maps onto a canonical value.
            let sex = record.sex.as_deref().unwrap();
            assert!(sex == SEX_MALE || sex == SEX_FEMALE);
            assert!(record.age.is_some());
            assert!(record.stay_days.is_some());
            assert!(record.admission_date.is_some());
        }
    }

    // --- Run tracker tests ---

    #[test]
    fn test_tracker_rejects_concurrent_run() {
        let tracker = RunTracker::new();
        assert!(tracker.begin().is_ok());
        assert!(matches!(tracker.begin(), Err(Error::AlreadyRunning)));

        let status = tracker.snapshot();
        assert!(status.is_running);
        assert_eq!(status.status, RunPhase::Running);
    }

    #[test]
    fn test_tracker_completion_clears_error() {
        let tracker = RunTracker::new();
        tracker.begin().unwrap();
        tracker.fail("boom".to_string());

        let status = tracker.snapshot();
        assert_eq!(status.status, RunPhase::Error);
        assert_eq!(status.last_error.as_deref(), Some("boom"));
        assert!(!status.is_running);

        // A failed run releases the guard for the next attempt.
        tracker.begin().unwrap();
        tracker.complete(chrono::Utc::now());

        let status = tracker.snapshot();
        assert_eq!(status.status, RunPhase::Completed);
        assert_eq!(status.last_error, None);
        assert!(status.last_run.is_some());
    }

    // --- Filter tests ---

    #[test]
    fn test_effective_limit_clamping() {
        let mut filter = OutcomeFilter::default();
        assert_eq!(filter.effective_limit(), DEFAULT_RECORD_LIMIT);

        filter.limit = Some(0);
        assert_eq!(filter.effective_limit(), 1);

        filter.limit = Some(5000);
        assert_eq!(filter.effective_limit(), MAX_RECORD_LIMIT);

        filter.limit = Some(250);
        assert_eq!(filter.effective_limit(), 250);
    }

    #[test]
    fn test_insurer_filter_matches_substring() {
        let filter = OutcomeFilter {
            insurer: Some("EPS".to_string()),
            ..Default::default()
        };

        let (clauses, values) = filter_clauses(&filter);
        // "EPS" must match "SURA EPS" but not "Particular".
        assert_eq!(clauses, " AND nombre_aseguradora LIKE ?");
        assert_eq!(values, vec![mysql_async::Value::from("%EPS%")]);
    }

    #[test]
    fn test_absent_filters_add_no_clauses() {
        let (clauses, values) = filter_clauses(&OutcomeFilter::default());
        assert!(clauses.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn test_filter_clauses_bind_in_clause_order() {
        let filter = OutcomeFilter {
            from_date: Some(date(2026, 1, 1)),
            to_date: Some(date(2026, 3, 31)),
            insurer: Some("EPS".to_string()),
            sex: Some(SEX_FEMALE.to_string()),
            min_age: Some(18),
            max_age: Some(65),
            discharge_condition: Some("Mejorado".to_string()),
            limit: None,
        };

        let (clauses, values) = filter_clauses(&filter);
        assert_eq!(
            clauses,
            " AND fecha_ingreso >= ? AND fecha_ingreso <= ? \
             AND nombre_aseguradora LIKE ? AND sexo = ? \
             AND edad >= ? AND edad <= ? AND condicion_egreso_nombre LIKE ?"
        );
        assert_eq!(values.len(), 7);
        assert_eq!(values[3], mysql_async::Value::from(SEX_FEMALE));
        assert_eq!(values[6], mysql_async::Value::from("%Mejorado%"));
    }

    // --- CSV export tests ---

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_render_csv_rows_and_status_column() {
        let discharged = record(Some("SURA EPS"), Some(SEX_MALE), Some(40), Some(5), Some("Mejorado"));
        let mut admitted = record(Some("Nueva EPS"), Some(SEX_FEMALE), Some(25), None, None);
        admitted.discharge_date = None;

        let csv = render_csv(&[discharged, admitted]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "fecha_ingreso,nombre_paciente,edad,sexo,diagnostico,aseguradora,dias_estancia,estado"
        );
        assert!(lines[1].ends_with("Mejorado"));
        assert!(lines[2].ends_with("Hospitalizado"));
    }

    // --- Serialization tests ---

    #[test]
    fn test_outcome_record_wire_names() {
        let record = record(Some("SURA EPS"), Some(SEX_MALE), Some(40), Some(5), Some("Mejorado"));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["fecha_ingreso"], "2026-03-10");
        assert_eq!(json["nombre_aseguradora"], "SURA EPS");
        assert_eq!(json["condicion_egreso_nombre"], "Mejorado");
        assert_eq!(json["dias_estancia"], 5);
        // The internal row id is omitted while unset.
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_monthly_stats_wire_names() {
        let stats = MonthlyStats {
            year: 2026,
            month: 3,
            admissions: 12,
            avg_stay: Some(9.5),
            improved_cases: 10,
            deceased_cases: 1,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["año"], 2026);
        assert_eq!(json["mes"], 3);
        assert_eq!(json["total_ingresos"], 12);
    }

    #[test]
    fn test_data_source_labels() {
        assert_eq!(DataSource::Sample.to_string(), "sample_data");
        assert_eq!(DataSource::Clinical.to_string(), "clinical_system");
    }
}
