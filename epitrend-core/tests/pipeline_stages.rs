//! Integration tests for the load → select → clean → metrics chain using an
//! in-memory CSV fixture shaped like the Our World in Data export.

use chrono::NaiveDate;
use epitrend_core::data::{ingest_csv, FileProvider, Loader, SourceLocator};
use epitrend_core::pipeline::{Cleaner, Metrics, Selector};
use epitrend_core::{PipelineConfig, PipelineError};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

const FIXTURE: &str = "\
iso_code,continent,location,date,total_cases,new_cases,total_deaths,new_deaths,people_vaccinated,population,hosp_patients
KEN,Africa,Kenya,2022-01-03,30,20,,,,1000,
KEN,Africa,Kenya,2022-01-01,10,10,,,,1000,
IND,Asia,India,2022-01-01,100,100,1,1,50,2000,
KEN,Africa,Kenya,2022-01-02,,,,,,1000,
OWID_WRL,,World,2022-01-03,5000,50,90,2,4000,8000,12
IND,Asia,India,2022-01-02,,5,2,1,,2000,
IND,Asia,India,2022-01-03,120,15,,0,80,2000,
";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn config(entities: &[&str]) -> PipelineConfig {
    PipelineConfig {
        entities: entities.iter().map(|s| s.to_string()).collect(),
        ..PipelineConfig::default()
    }
}

#[test]
fn raw_rows_fill_forward_to_expected_sequence() {
    let cfg = config(&["Kenya"]);
    let raw = ingest_csv(FIXTURE.as_bytes()).unwrap();
    let selected = Selector::select(&raw, &cfg.selection()).unwrap();
    let series = Cleaner::clean(&selected, &cfg.schema()).unwrap();

    let kenya = series.entity("Kenya").unwrap();
    let dates: Vec<NaiveDate> = kenya.rows.iter().map(|o| o.date).collect();
    assert_eq!(
        dates,
        vec![date("2022-01-01"), date("2022-01-02"), date("2022-01-03")]
    );
    let cases: Vec<Option<f64>> = kenya.rows.iter().map(|o| o.total_cases).collect();
    assert_eq!(cases, vec![Some(10.0), Some(10.0), Some(30.0)]);

    let snap = Metrics::latest_snapshot(&series);
    let row = snap.row("Kenya").unwrap();
    assert_eq!(snap.date, Some(date("2022-01-03")));
    // no deaths and no vaccinations ever reported: null, not zero
    assert_eq!(row.death_rate, None);
    assert_eq!(row.vaccination_rate, None);
}

#[test]
fn selection_excludes_entities_outside_allow_list() {
    let cfg = config(&["Kenya", "India"]);
    let raw = ingest_csv(FIXTURE.as_bytes()).unwrap();
    let selected = Selector::select(&raw, &cfg.selection()).unwrap();
    assert_eq!(selected.height(), 6);
    assert_eq!(selected.width(), 9);

    let series = Cleaner::clean(&selected, &cfg.schema()).unwrap();
    assert_eq!(series.entity_ids(), vec!["India", "Kenya"]);
    assert!(series.entity("World").is_none());
}

#[test]
fn india_snapshot_has_both_rates() {
    let cfg = config(&["Kenya", "India"]);
    let raw = ingest_csv(FIXTURE.as_bytes()).unwrap();
    let selected = Selector::select(&raw, &cfg.selection()).unwrap();
    let series = Cleaner::clean(&selected, &cfg.schema()).unwrap();

    let india = series.entity("India").unwrap();
    let deaths: Vec<Option<f64>> = india.rows.iter().map(|o| o.total_deaths).collect();
    assert_eq!(deaths, vec![Some(1.0), Some(2.0), Some(2.0)]);

    let snap = Metrics::latest_snapshot(&series);
    let row = snap.row("India").unwrap();
    let death_rate = row.death_rate.unwrap();
    assert!((death_rate - 2.0 / 120.0 * 100.0).abs() < 1e-9);
    let vaccination_rate = row.vaccination_rate.unwrap();
    assert!((vaccination_rate - 4.0).abs() < 1e-9);
}

#[test]
fn entity_absent_on_global_max_date_is_dropped() {
    let csv = "\
date,location,iso_code,total_cases,new_cases,total_deaths,new_deaths,people_vaccinated,population
2022-01-09,A,AAA,1,1,0,0,,10
2022-01-10,A,AAA,2,1,0,0,,10
2022-01-09,B,BBB,5,5,1,1,,10
";
    let cfg = config(&["A", "B"]);
    let raw = ingest_csv(csv.as_bytes()).unwrap();
    let selected = Selector::select(&raw, &cfg.selection()).unwrap();
    let series = Cleaner::clean(&selected, &cfg.schema()).unwrap();
    let snap = Metrics::latest_snapshot(&series);

    assert_eq!(snap.date, Some(date("2022-01-10")));
    assert_eq!(snap.rows.len(), 1);
    assert!(snap.row("A").is_some());
    assert!(snap.row("B").is_none());
}

#[test]
fn missing_projection_column_fails_selection() {
    let csv = "date,location,total_cases\n2022-01-01,Kenya,1\n";
    let raw = ingest_csv(csv.as_bytes()).unwrap();
    let err = Selector::select(&raw, &config(&["Kenya"]).selection()).unwrap_err();
    assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
}

#[test]
fn bad_date_in_selected_rows_fails_cleaning() {
    let csv = "\
date,location,iso_code,total_cases,new_cases,total_deaths,new_deaths,people_vaccinated,population
2022-13-01,Kenya,KEN,1,1,0,0,,10
";
    let cfg = config(&["Kenya"]);
    let raw = ingest_csv(csv.as_bytes()).unwrap();
    let selected = Selector::select(&raw, &cfg.selection()).unwrap();
    let err = Cleaner::clean(&selected, &cfg.schema()).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidDate { row: 0, .. }));
}

#[test]
fn bad_date_outside_allow_list_is_ignored() {
    let csv = "\
date,location,iso_code,total_cases,new_cases,total_deaths,new_deaths,people_vaccinated,population
not-a-date,France,FRA,1,1,0,0,,10
2022-01-01,Kenya,KEN,1,1,0,0,,10
";
    let cfg = config(&["Kenya"]);
    let raw = ingest_csv(csv.as_bytes()).unwrap();
    let selected = Selector::select(&raw, &cfg.selection()).unwrap();
    assert!(Cleaner::clean(&selected, &cfg.schema()).is_ok());
}

#[test]
fn loader_reads_fixture_from_disk() {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "epitrend_core_fixture_{}_{id}.csv",
        std::process::id()
    ));
    std::fs::write(&path, FIXTURE).unwrap();

    let loaded = Loader::new(&FileProvider)
        .load(&SourceLocator::Path(path.clone()))
        .unwrap();
    assert_eq!(loaded.dataset.height(), 7);
    assert_eq!(loaded.byte_len, FIXTURE.len());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn loader_failure_is_data_unavailable() {
    let missing = std::env::temp_dir().join("epitrend_core_no_such_file.csv");
    let err: PipelineError = Loader::new(&FileProvider)
        .load(&SourceLocator::Path(missing))
        .unwrap_err()
        .into();
    assert!(matches!(err, PipelineError::DataUnavailable(_)));
}
