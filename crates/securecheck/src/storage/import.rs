//! CSV import of police log exports.
//!
//! Headers are matched by name and unknown columns are ignored. Flags accept
//! the usual spreadsheet spellings, and a `stop_time` holding only a clock
//! time is joined with `stop_date` into a full timestamp.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{parse_whole_age, StopRecord};

use super::Database;

/// How an import treats existing rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Delete existing rows before loading.
    pub replace: bool,
}

/// Outcome of a completed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows inserted.
    pub inserted: usize,
    /// Rows in the table afterwards.
    pub total: i64,
}

/// One CSV row as written by common exports.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvStopRow {
    stop_date: Option<String>,
    stop_time: Option<String>,
    country_name: Option<String>,
    driver_gender: Option<String>,
    driver_age: Option<String>,
    driver_race: Option<String>,
    is_arrested: Option<String>,
    search_conducted: Option<String>,
    search_type: Option<String>,
    stop_duration: Option<String>,
    drugs_related_stop: Option<String>,
    violation: Option<String>,
    stop_outcome: Option<String>,
    vehicle_number: Option<String>,
}

impl CsvStopRow {
    fn into_record(self, row: usize) -> Result<StopRecord> {
        let stop_date = blank_to_none(self.stop_date).map(|d| normalize_date(&d));
        let stop_time =
            blank_to_none(self.stop_time).map(|t| combine_date_time(stop_date.as_deref(), &t));

        Ok(StopRecord {
            stop_time,
            country_name: blank_to_none(self.country_name),
            driver_gender: blank_to_none(self.driver_gender),
            driver_age: parse_age(self.driver_age, row)?,
            driver_race: blank_to_none(self.driver_race),
            is_arrested: parse_flag(self.is_arrested, row, "is_arrested")?,
            search_conducted: parse_flag(self.search_conducted, row, "search_conducted")?,
            search_type: blank_to_none(self.search_type),
            stop_duration: blank_to_none(self.stop_duration),
            drugs_related_stop: parse_flag(self.drugs_related_stop, row, "drugs_related_stop")?,
            violation: blank_to_none(self.violation),
            stop_outcome: blank_to_none(self.stop_outcome),
            vehicle_number: blank_to_none(self.vehicle_number),
            stop_date,
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_flag(value: Option<String>, row: usize, column: &str) -> Result<Option<bool>> {
    let Some(raw) = blank_to_none(value) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Ok(Some(true)),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Ok(Some(false)),
        _ => Err(Error::record_decode(
            row,
            column,
            format!("'{raw}' is not a yes/no value"),
        )),
    }
}

fn parse_age(value: Option<String>, row: usize) -> Result<Option<i64>> {
    let Some(raw) = blank_to_none(value) else {
        return Ok(None);
    };
    match parse_whole_age(&raw) {
        Some(age) => Ok(Some(age)),
        None => Err(Error::record_decode(
            row,
            "driver_age",
            format!("'{raw}' is not a whole number"),
        )),
    }
}

fn normalize_date(raw: &str) -> String {
    ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map_or_else(|| raw.to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Join a clock-only time with the stop date; full timestamps pass through.
fn combine_date_time(date: Option<&str>, time: &str) -> String {
    let clock = ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time, format).ok());
    match (date, clock) {
        (Some(date), Some(clock)) => format!("{date} {}", clock.format("%H:%M:%S")),
        _ => time.to_string(),
    }
}

/// Parse stop records from CSV data.
///
/// # Errors
///
/// Returns an error if the CSV is malformed or a value cannot be interpreted.
pub fn read_records(reader: impl Read) -> Result<Vec<StopRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<CsvStopRow>().enumerate() {
        records.push(result?.into_record(row)?);
    }

    debug!("Parsed {} CSV rows", records.len());
    Ok(records)
}

/// Load a CSV file into the database.
///
/// Parsing finishes before anything is written, so a bad row leaves the
/// table untouched.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an insert fails.
pub fn import_csv(db: &Database, path: &Path, options: ImportOptions) -> Result<ImportSummary> {
    info!("Importing stops from {}", path.display());
    let file = std::fs::File::open(path)?;
    let records = read_records(file)?;

    let inserted = db.insert_all(&records, options.replace)?;
    let total = db.count()?;

    Ok(ImportSummary { inserted, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{QueryExecutor, Value};
    use crate::record::Dataset;
    use crate::testing::fixture_database;

    const SAMPLE: &str = "\
stop_date,stop_time,country_name,driver_gender,driver_age,driver_race,is_arrested,search_conducted,search_type,stop_duration,drugs_related_stop,violation,stop_outcome,vehicle_number,officer
2020-01-15,21:30:00,Canada,M,22,Asian,True,True,Frisk,6-15 min,True,Speeding,Arrest,ABC123,Smith
2020-01-16,2020-01-16 02:10:00,USA,F,30.0,White,False,no,,16-30 min,0,DUI,Citation,XYZ000,
,,India,,,,,,,,,,,,
";

    #[test]
    fn test_read_records() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.stop_date.as_deref(), Some("2020-01-15"));
        assert_eq!(first.stop_time.as_deref(), Some("2020-01-15 21:30:00"));
        assert_eq!(first.driver_age, Some(22));
        assert_eq!(first.is_arrested, Some(true));
        assert_eq!(first.search_type.as_deref(), Some("Frisk"));

        let second = &records[1];
        assert_eq!(second.stop_time.as_deref(), Some("2020-01-16 02:10:00"));
        assert_eq!(second.driver_age, Some(30));
        assert_eq!(second.search_conducted, Some(false));
        assert_eq!(second.search_type, None);
        assert_eq!(second.drugs_related_stop, Some(false));

        let third = &records[2];
        assert_eq!(third.country_name.as_deref(), Some("India"));
        assert_eq!(third.stop_time, None);
        assert_eq!(third.is_arrested, None);
        assert_eq!(third.driver_age, None);
    }

    #[test]
    fn test_missing_columns_are_absent() {
        let csv = "vehicle_number,violation\nABC123,Speeding\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].vehicle_number.as_deref(), Some("ABC123"));
        assert_eq!(records[0].country_name, None);
        assert_eq!(records[0].is_arrested, None);
    }

    #[test]
    fn test_time_without_date_is_kept() {
        assert_eq!(combine_date_time(None, "21:30"), "21:30");
        assert_eq!(
            combine_date_time(Some("2020-01-15"), "21:30"),
            "2020-01-15 21:30:00"
        );
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("01/15/2020"), "2020-01-15");
        assert_eq!(normalize_date("2020-01-15"), "2020-01-15");
        assert_eq!(normalize_date("sometime"), "sometime");
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let err = read_records("is_arrested\nmaybe\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::RecordDecode { row: 0, .. }));
        assert!(err.to_string().contains("is_arrested"));
    }

    #[test]
    fn test_bad_age_is_rejected() {
        assert!(read_records("driver_age\n22\n22.5\n".as_bytes()).is_err());
        assert!(read_records("driver_age\nadult\n".as_bytes()).is_err());
    }

    #[test]
    fn test_import_round_trips_flags_and_times() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let db = Database::open_in_memory().unwrap();
        let summary = import_csv(&db, &path, ImportOptions::default()).unwrap();
        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.total, 3);

        let sql = "SELECT is_arrested, stop_time FROM traffic_stops WHERE country_name = 'Canada'";
        let result = db.execute(sql).unwrap();
        assert_eq!(result.rows[0][0], Value::Integer(1));
        assert_eq!(result.rows[0][1], Value::from("2020-01-15 21:30:00"));

        let result = db.execute(crate::record::DATASET_QUERY).unwrap();
        let dataset = Dataset::from_result(&result).unwrap();
        let first = &dataset.records()[0];
        assert_eq!(first.stop_time.as_deref(), Some("2020-01-15 21:30:00"));
        assert_eq!(dataset.records()[1].is_arrested, Some(false));
        assert_eq!(dataset.records()[1].driver_age, Some(30));
    }

    #[test]
    fn test_import_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let db = fixture_database();
        let summary = import_csv(&db, &path, ImportOptions { replace: true }).unwrap();
        assert_eq!(summary.total, 3);

        let db = fixture_database();
        let summary = import_csv(&db, &path, ImportOptions::default()).unwrap();
        assert_eq!(summary.total, 11);
    }

    #[test]
    fn test_failed_parse_leaves_table_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "vehicle_number,is_arrested\nA1,yes\nA2,perhaps\n").unwrap();

        let db = fixture_database();
        assert!(import_csv(&db, &path, ImportOptions { replace: true }).is_err());
        assert_eq!(db.count().unwrap(), 8);
    }

    #[test]
    fn test_missing_file() {
        let db = Database::open_in_memory().unwrap();
        let err = import_csv(&db, Path::new("/nonexistent/log.csv"), ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
