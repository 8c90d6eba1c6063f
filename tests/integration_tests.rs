use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use eval_visuals::config::{ColumnAliases, OutputLayout, Thresholds};
use eval_visuals::error::LoadError;
use eval_visuals::loader::{CleanedTable, load_clean};
use eval_visuals::pipeline::{RunConfig, aggregate, run, write_summaries};
use flate2::Compression;
use flate2::write::GzEncoder;

const SCHOOL_YEAR: &str = "2023/2024";

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/evaluations.csv")
}

fn load(filter: Option<&str>) -> CleanedTable {
    load_clean(&fixture(), &ColumnAliases::default(), filter).expect("Failed to load fixture")
}

fn summaries(thresholds: Thresholds, dir: &Path) -> OutputLayout {
    let layout = OutputLayout::new(dir.join("figures"), dir.join("outputs"), Some(SCHOOL_YEAR));
    layout.ensure_dirs().unwrap();
    let aggs = aggregate(&load(Some(SCHOOL_YEAR)), &thresholds);
    write_summaries(&aggs, &ColumnAliases::default(), &layout).unwrap();
    layout
}

fn thresholds(min_group_n: usize, min_observer_n: usize) -> Thresholds {
    Thresholds {
        min_group_n,
        min_observer_n,
    }
}

#[test]
fn test_load_drops_invalid_rows() {
    let table = load(None);
    assert_eq!(table.stats.rows_read, 15);
    assert_eq!(table.stats.bad_score, 1);
    assert_eq!(table.stats.bad_date, 1);
    assert_eq!(table.len(), 13);
}

#[test]
fn test_filter_by_present_school_year() {
    let table = load(Some(SCHOOL_YEAR));
    assert_eq!(table.len(), 12);
    assert!(
        table
            .observations
            .iter()
            .all(|o| o.school_year.as_deref() == Some(SCHOOL_YEAR))
    );
}

#[test]
fn test_filter_by_absent_school_year_is_empty() {
    let table = load(Some("2030/2031"));
    assert!(table.is_empty());
}

#[test]
fn test_gzip_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("evaluations.csv.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&fs::read(fixture()).unwrap()).unwrap();
    fs::write(&path, encoder.finish().unwrap()).unwrap();

    let table = load_clean(&path, &ColumnAliases::default(), None).unwrap();
    assert_eq!(table.len(), 13);
}

#[test]
fn test_missing_score_column_is_configuration_error() {
    let aliases = ColumnAliases {
        score: "Rating".into(),
        ..Default::default()
    };
    let err = load_clean(&fixture(), &aliases, None).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumns { .. }));
}

#[test]
fn test_missing_column_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        csv_path: fixture(),
        school_year: None,
        aliases: ColumnAliases {
            date: "When".into(),
            ..Default::default()
        },
        thresholds: Thresholds::default(),
        layout: OutputLayout::new(dir.path().join("figures"), dir.path().join("outputs"), None),
    };

    let err = run(&config).unwrap_err();
    assert!(format!("{err:#}").contains("When"));
    assert!(!dir.path().join("figures").exists());
    assert!(!dir.path().join("outputs").exists());
}

fn run_config(csv_path: PathBuf, school_year: Option<&str>, t: Thresholds, dir: &Path) -> RunConfig {
    RunConfig {
        csv_path,
        school_year: school_year.map(str::to_string),
        aliases: ColumnAliases::default(),
        thresholds: t,
        layout: OutputLayout::new(dir.join("figures"), dir.join("outputs"), school_year),
    }
}

fn assert_non_empty(paths: &[PathBuf]) {
    for path in paths {
        let len = fs::metadata(path)
            .unwrap_or_else(|e| panic!("{} missing: {e}", path.display()))
            .len();
        assert!(len > 0, "{} is empty", path.display());
    }
}

#[test]
fn test_run_writes_every_chart_and_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = run_config(fixture(), Some(SCHOOL_YEAR), thresholds(4, 5), dir.path());
    let layout = &config.layout;

    let report = run(&config).unwrap();

    let figures = vec![
        layout.histogram_png(),
        layout.boxplot_png(),
        layout.trend_png(),
        layout.observer_png(),
    ];
    let tables = vec![
        layout.grouped_csv(),
        layout.type_means_csv(),
        layout.monthly_csv(),
        layout.observer_csv(),
    ];
    assert_eq!(report.figures, figures);
    assert_eq!(report.summaries, tables);
    assert_non_empty(&figures);
    assert_non_empty(&tables);

    assert_eq!(report.load.retained, 12);
    assert_eq!(report.groups_retained, 2);
    assert_eq!(report.months, 3);
    assert_eq!(report.observers_retained, 2);
}

#[test]
fn test_run_with_nothing_over_thresholds_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("flat.csv");
    fs::write(
        &csv,
        "ObservationDateTime,ObservationScore,ObserverLastFirstName,EvaluationType\n\
         2023-11-02 09:00:00,3,\"Smith, Ann\",Teacher Announced Observation\n\
         2023-11-03 09:00:00,3,\"Smith, Ann\",Teacher Announced Observation\n\
         2023-11-04 09:00:00,3,\"Smith, Ann\",Teacher Announced Observation\n",
    )
    .unwrap();
    let config = run_config(csv, None, Thresholds::default(), dir.path());

    let report = run(&config).unwrap();

    assert_eq!(report.groups_retained, 0);
    assert_eq!(report.observers_retained, 0);
    assert_eq!(report.overall.std, Some(0.0));
    assert_non_empty(&report.figures);
    assert_non_empty(&report.summaries);
}

#[test]
fn test_summary_tables_are_idempotent() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let a = summaries(thresholds(4, 5), first.path());
    let b = summaries(thresholds(4, 5), second.path());

    for (x, y) in [
        (a.grouped_csv(), b.grouped_csv()),
        (a.type_means_csv(), b.type_means_csv()),
        (a.monthly_csv(), b.monthly_csv()),
        (a.observer_csv(), b.observer_csv()),
    ] {
        assert_eq!(fs::read(x).unwrap(), fs::read(y).unwrap());
    }
}

#[test]
fn test_grouped_table_threshold_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let layout = summaries(thresholds(4, 5), dir.path());

    assert!(layout.grouped_csv().ends_with("type_means_grouped_2023-2024.csv"));
    let content = fs::read_to_string(layout.grouped_csv()).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "EvalGroup,count,mean,median,std");
    assert!(lines[1].starts_with("Teacher (Announced),6,3.25,3.25,"));
    assert!(lines[2].starts_with("Teacher (Unannounced),4,3.5,3.75,"));
}

#[test]
fn test_grouped_table_with_all_groups_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let layout = summaries(thresholds(10, 5), dir.path());

    let content = fs::read_to_string(layout.grouped_csv()).unwrap();
    assert_eq!(content, "EvalGroup,count,mean,median,std\n");
}

#[test]
fn test_type_means_use_raw_labels() {
    let dir = tempfile::tempdir().unwrap();
    let layout = summaries(thresholds(4, 5), dir.path());

    let content = fs::read_to_string(layout.type_means_csv()).unwrap();
    assert_eq!(
        content,
        "EvaluationType,ObservationScore\n\
         Teacher Announced Observation,3.25\n\
         Teacher Unannounced Observation Domain 2,3.5\n\
         Volunteer Review,3.5\n"
    );
}

#[test]
fn test_monthly_means_are_chronological() {
    let dir = tempfile::tempdir().unwrap();
    let layout = summaries(thresholds(4, 5), dir.path());

    let content = fs::read_to_string(layout.monthly_csv()).unwrap();
    assert_eq!(
        content,
        "Month,ObservationScore\n2023-11,3.375\n2023-12,3.25\n2024-01,3.5\n"
    );
}

#[test]
fn test_observer_rows_match_retained_observers() {
    let dir = tempfile::tempdir().unwrap();
    let layout = summaries(thresholds(4, 6), dir.path());
    let content = fs::read_to_string(layout.observer_csv()).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "ObserverLastFirstName,Mean,Count,Std");
    assert!(lines[1].starts_with("\"Lee, Sam\",3.16666"));
    assert!(lines[2].starts_with("\"Smith, Ann\",3.58333"));

    let dir = tempfile::tempdir().unwrap();
    let layout = summaries(thresholds(4, 7), dir.path());
    let content = fs::read_to_string(layout.observer_csv()).unwrap();
    assert_eq!(content.lines().count(), 1);
}
