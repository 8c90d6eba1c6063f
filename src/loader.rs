//! CSV loader for evaluation observations.
//!
//! Reads the whole table, resolves the configured column aliases once, drops
//! rows whose timestamp or score does not parse, applies the optional
//! school-year filter, and derives the month bucket used for trend ordering.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use flate2::read::GzDecoder;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ColumnAliases;
use crate::error::LoadError;

/// Date-time layouts tried in order after RFC 3339.
static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Bare-date layouts; these resolve to midnight.
static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// One retained observation row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub observed_at: NaiveDateTime,
    pub score: f64,
    pub school_year: Option<String>,
    pub observer: Option<String>,
    pub observee: Option<String>,
    pub eval_type: Option<String>,
    /// `YYYY-MM` label of the observation month.
    pub month: String,
    /// First day of the observation month.
    pub month_start: NaiveDate,
}

impl Observation {
    pub fn new(observed_at: NaiveDateTime, score: f64) -> Self {
        let date = observed_at.date();
        Observation {
            observed_at,
            score,
            school_year: None,
            observer: None,
            observee: None,
            eval_type: None,
            month: date.format("%Y-%m").to_string(),
            month_start: date.with_day(1).unwrap_or(date),
        }
    }
}

/// Row accounting for a single load.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub bad_date: usize,
    pub bad_score: usize,
    pub filtered_out: usize,
    pub retained: usize,
}

/// The cleaned working set every aggregator reads from.
#[derive(Debug, Clone, Default)]
pub struct CleanedTable {
    pub observations: Vec<Observation>,
    pub stats: LoadStats,
}

impl CleanedTable {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.score).collect()
    }
}

/// Loads and cleans the table at `path`.
///
/// Paths ending in `.gz` are decompressed on the fly.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumns`] if the date or score alias is absent
/// from the header, or an I/O / CSV error if the file cannot be read.
#[tracing::instrument(skip(path, aliases), fields(path = %path.display()))]
pub fn load_clean(
    path: &Path,
    aliases: &ColumnAliases,
    school_year: Option<&str>,
) -> Result<CleanedTable, LoadError> {
    let file = BufReader::new(File::open(path)?);
    let gzipped = path.extension().and_then(|e| e.to_str()) == Some("gz");
    debug!(gzipped, "Opening evaluation table");

    if gzipped {
        load_from_reader(GzDecoder::new(file), aliases, school_year)
    } else {
        load_from_reader(file, aliases, school_year)
    }
}

/// Loads and cleans a CSV table from any reader.
pub fn load_from_reader<R: Read>(
    reader: R,
    aliases: &ColumnAliases,
    school_year: Option<&str>,
) -> Result<CleanedTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let (date_idx, score_idx) = match (position(&aliases.date), position(&aliases.score)) {
        (Some(d), Some(s)) => (d, s),
        (d, s) => {
            let mut missing = Vec::new();
            if d.is_none() {
                missing.push(aliases.date.clone());
            }
            if s.is_none() {
                missing.push(aliases.score.clone());
            }
            return Err(LoadError::MissingColumns {
                date: aliases.date.clone(),
                score: aliases.score.clone(),
                missing,
            });
        }
    };

    let school_year_idx = position(&aliases.school_year);
    let observer_idx = position(&aliases.observer);
    let observee_idx = position(&aliases.observee);
    let eval_type_idx = position(&aliases.eval_type);

    for (alias, idx) in [
        (&aliases.observer, observer_idx),
        (&aliases.eval_type, eval_type_idx),
    ] {
        if idx.is_none() {
            warn!(column = %alias, "Optional column not found, treating as missing");
        }
    }

    // An empty filter value means no filtering.
    let filter = school_year.filter(|s| !s.is_empty());
    if filter.is_some() && school_year_idx.is_none() {
        warn!(column = %aliases.school_year, "School-year column not found, filter ignored");
    }

    let mut table = CleanedTable::default();
    let stats = &mut table.stats;

    for result in rdr.records() {
        let record = result?;
        stats.rows_read += 1;

        let cell = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let observed_at = record.get(date_idx).and_then(parse_timestamp);
        let score = record.get(score_idx).and_then(parse_score);

        let (observed_at, score) = match (observed_at, score) {
            (Some(t), Some(s)) => (t, s),
            (t, s) => {
                if t.is_none() {
                    stats.bad_date += 1;
                }
                if s.is_none() {
                    stats.bad_score += 1;
                }
                continue;
            }
        };

        let school_year_value = cell(school_year_idx);
        if let (Some(wanted), Some(_)) = (filter, school_year_idx) {
            if school_year_value.as_deref() != Some(wanted) {
                stats.filtered_out += 1;
                continue;
            }
        }

        let mut obs = Observation::new(observed_at, score);
        obs.school_year = school_year_value;
        obs.observer = cell(observer_idx);
        obs.observee = cell(observee_idx);
        obs.eval_type = cell(eval_type_idx);
        table.observations.push(obs);
    }

    table.stats.retained = table.observations.len();
    info!(
        rows_read = table.stats.rows_read,
        bad_date = table.stats.bad_date,
        bad_score = table.stats.bad_score,
        filtered_out = table.stats.filtered_out,
        retained = table.stats.retained,
        "Evaluation table loaded"
    );

    Ok(table)
}

/// Parses an observation timestamp, returning `None` when no known layout matches.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a numeric score. Blank, non-numeric, and non-finite values yield `None`.
pub fn parse_score(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
 ObservationDateTime ,ObservationScore,SchoolYear,ObserverLastFirstName,ObserveeLastFirstName,EvaluationType
2023-11-02 09:15:00,3.5,2023/2024,\"Smith, Ann\",\"Doe, Jo\",Teacher Announced Observation
2023-12-04 10:00:00,abc,2023/2024,\"Smith, Ann\",\"Doe, Jo\",Teacher Announced Observation
not a date,3.0,2023/2024,\"Smith, Ann\",\"Doe, Jo\",Teacher Announced Observation
01/15/2024 01:30:00 PM,4,2023/2024,\"Lee, Sam\",,Media Review
2022-10-01,2.5,2022/2023,,,
";

    fn load(filter: Option<&str>) -> CleanedTable {
        load_from_reader(CSV.as_bytes(), &ColumnAliases::default(), filter).unwrap()
    }

    #[test]
    fn test_drops_unparseable_rows() {
        let table = load(None);
        assert_eq!(table.stats.rows_read, 5);
        assert_eq!(table.stats.bad_score, 1);
        assert_eq!(table.stats.bad_date, 1);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_header_whitespace_is_trimmed() {
        let table = load(None);
        assert_eq!(table.observations[0].score, 3.5);
    }

    #[test]
    fn test_missing_columns_is_configuration_error() {
        let aliases = ColumnAliases {
            score: "Score".into(),
            ..Default::default()
        };
        let err = load_from_reader(CSV.as_bytes(), &aliases, None).unwrap_err();
        match err {
            LoadError::MissingColumns { missing, .. } => assert_eq!(missing, vec!["Score"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_school_year_filter() {
        let table = load(Some("2023/2024"));
        assert_eq!(table.len(), 2);
        assert!(
            table
                .observations
                .iter()
                .all(|o| o.school_year.as_deref() == Some("2023/2024"))
        );
        assert_eq!(table.stats.filtered_out, 1);
    }

    #[test]
    fn test_absent_school_year_yields_empty_table() {
        let table = load(Some("1999/2000"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_filter_is_ignored() {
        assert_eq!(load(Some("")).len(), 3);
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let table = load(None);
        let media = &table.observations[1];
        assert_eq!(media.observer.as_deref(), Some("Lee, Sam"));
        assert_eq!(media.observee, None);
        let last = &table.observations[2];
        assert_eq!(last.eval_type, None);
    }

    #[test]
    fn test_month_derivation() {
        let table = load(None);
        let obs = &table.observations[1];
        assert_eq!(obs.month, "2024-01");
        assert_eq!(obs.month_start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-15 13:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T13:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 13:30"), Some(expected));
        assert_eq!(parse_timestamp("01/15/2024 1:30:00 PM"), Some(expected));
        assert_eq!(parse_timestamp("01/15/2024 13:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T13:30:00-05:00"), Some(expected));
        assert!(parse_timestamp("2024-01-15").is_some());
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(" 3.25 "), Some(3.25));
        assert_eq!(parse_score("4"), Some(4.0));
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("N/A"), None);
        assert_eq!(parse_score("NaN"), None);
    }
}
