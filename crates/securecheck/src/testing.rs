//! Shared test fixtures.

use crate::access::QueryExecutor;
use crate::record::{Dataset, StopRecord, DATASET_QUERY};
use crate::storage::Database;

#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
fn stop(
    stop_time: &str,
    country: &str,
    gender: &str,
    age: i64,
    race: &str,
    arrested: bool,
    searched: bool,
    duration: &str,
    drugs: bool,
    violation: &str,
    outcome: &str,
    vehicle: &str,
) -> StopRecord {
    StopRecord {
        stop_date: Some(stop_time[..10].to_string()),
        stop_time: Some(stop_time.to_string()),
        country_name: Some(country.to_string()),
        driver_gender: Some(gender.to_string()),
        driver_age: Some(age),
        driver_race: Some(race.to_string()),
        is_arrested: Some(arrested),
        search_conducted: Some(searched),
        search_type: searched.then(|| "Frisk".to_string()),
        stop_duration: Some(duration.to_string()),
        drugs_related_stop: Some(drugs),
        violation: Some(violation.to_string()),
        stop_outcome: Some(outcome.to_string()),
        vehicle_number: Some(vehicle.to_string()),
    }
}

/// Eight stops across three countries, in table order.
#[rustfmt::skip]
pub fn fixture_records() -> Vec<StopRecord> {
    vec![
        stop("2020-01-15 21:30:00", "Canada", "M", 22, "Asian", true, true, "6-15 min", true, "Speeding", "Arrest", "ABC123"),
        stop("2020-01-15 02:10:00", "Canada", "F", 30, "White", false, true, "16-30 min", true, "DUI", "Citation", "abc999"),
        stop("2020-02-01 10:00:00", "USA", "M", 45, "Black", false, false, "0-5 min", false, "Speeding", "Warning", "XYZ000"),
        stop("2021-03-10 22:45:00", "USA", "M", 65, "White", true, true, "30+ min", true, "DUI", "Arrest", "ABC123"),
        stop("2021-03-10 14:00:00", "India", "F", 19, "Asian", false, false, "6-15 min", false, "Seatbelt", "Warning", "IND111"),
        stop("2021-07-04 03:30:00", "USA", "F", 24, "Hispanic", true, false, "16-30 min", false, "Speeding", "Arrest", "USA222"),
        stop("2022-05-05 12:00:00", "India", "M", 50, "Asian", false, false, "0-5 min", false, "Signal", "Citation", "IND333"),
        stop("2022-05-05 23:15:00", "Canada", "M", 35, "White", false, true, "6-15 min", true, "Speeding", "Citation", "CAN444"),
    ]
}

/// In-memory database holding the fixture records.
pub fn fixture_database() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.insert_all(&fixture_records(), false).unwrap();
    db
}

/// The fixture records as loaded through the full-dataset statement.
pub fn fixture_dataset() -> Dataset {
    let result = fixture_database().execute(DATASET_QUERY).unwrap();
    Dataset::from_result(&result).unwrap()
}
