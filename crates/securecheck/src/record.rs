//! Traffic stop records and the in-memory dataset.

use serde::{Deserialize, Serialize};

use crate::access::{CachedExecutor, QueryExecutor, QueryResult, Value};
use crate::error::{Error, Result};

/// Statement that loads the full dataset.
pub const DATASET_QUERY: &str = "SELECT * FROM traffic_stops";

/// Stored column names, in table order.
pub const COLUMNS: [&str; 14] = [
    "stop_date",
    "stop_time",
    "country_name",
    "driver_gender",
    "driver_age",
    "driver_race",
    "is_arrested",
    "search_conducted",
    "search_type",
    "stop_duration",
    "drugs_related_stop",
    "violation",
    "stop_outcome",
    "vehicle_number",
];

/// One recorded traffic stop.
///
/// Every field may be absent in the source data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRecord {
    /// Calendar date of the stop.
    pub stop_date: Option<String>,
    /// Time of the stop, usually a full timestamp.
    pub stop_time: Option<String>,
    /// Country where the stop happened.
    pub country_name: Option<String>,
    /// Driver gender as recorded.
    pub driver_gender: Option<String>,
    /// Driver age in years.
    pub driver_age: Option<i64>,
    /// Driver race as recorded.
    pub driver_race: Option<String>,
    /// Whether the stop ended in arrest.
    pub is_arrested: Option<bool>,
    /// Whether a search was conducted.
    pub search_conducted: Option<bool>,
    /// Kind of search, if any.
    pub search_type: Option<String>,
    /// Duration bucket label, such as `6-15 min`.
    pub stop_duration: Option<String>,
    /// Whether the stop was drug related.
    pub drugs_related_stop: Option<bool>,
    /// Violation category.
    pub violation: Option<String>,
    /// Outcome of the stop.
    pub stop_outcome: Option<String>,
    /// Vehicle identifier.
    pub vehicle_number: Option<String>,
}

impl StopRecord {
    /// Check if the stop ended in arrest. Unknown counts as no.
    #[must_use]
    pub fn arrested(&self) -> bool {
        self.is_arrested == Some(true)
    }

    /// Check if the stop was drug related. Unknown counts as no.
    #[must_use]
    pub fn drug_related(&self) -> bool {
        self.drugs_related_stop == Some(true)
    }

    /// Check if a search was conducted. Unknown counts as no.
    #[must_use]
    pub fn searched(&self) -> bool {
        self.search_conducted == Some(true)
    }
}

/// Decode a stored flag.
///
/// Integer `1`, real `1.0`, and the text forms `True`, `Yes`, `yes` are true.
/// `NULL` is unknown. Anything else is false.
#[must_use]
pub fn decode_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(*i == 1),
        Value::Real(r) => Some((*r - 1.0).abs() < f64::EPSILON),
        Value::Text(s) => Some(matches!(s.as_str(), "True" | "Yes" | "yes")),
    }
}

/// Parse a user-supplied yes/no answer, case-insensitively.
///
/// Blank input reads as no. Returns `None` for anything unrecognized.
#[must_use]
pub fn parse_yes_no(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" | "" => Some(false),
        _ => None,
    }
}

static NULL: Value = Value::Null;

fn cell_at(row: &[Value], index: Option<usize>) -> &Value {
    index.and_then(|i| row.get(i)).unwrap_or(&NULL)
}

fn decode_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Parse an age written as an integer or a whole-number float such as `22.0`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn parse_whole_age(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(age) = raw.parse::<i64>() {
        return Some(age);
    }
    // Spreadsheet exports often write whole numbers as "22.0"
    match raw.parse::<f64>() {
        Ok(age) if age.is_finite() && age.fract() == 0.0 => Some(age as i64),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn decode_age(value: &Value, row: usize) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(i) => Ok(Some(*i)),
        Value::Real(r) if r.fract() == 0.0 && r.is_finite() => Ok(Some(*r as i64)),
        Value::Real(r) => Err(Error::record_decode(
            row,
            "driver_age",
            format!("{r} is not a whole number"),
        )),
        Value::Text(s) if s.trim().is_empty() => Ok(None),
        Value::Text(s) => match parse_whole_age(s) {
            Some(age) => Ok(Some(age)),
            None => Err(Error::record_decode(
                row,
                "driver_age",
                format!("'{s}' is not a whole number"),
            )),
        },
    }
}

/// The full set of stop records held for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<StopRecord>,
}

impl Dataset {
    /// Build a dataset from already decoded records.
    #[must_use]
    pub fn new(records: Vec<StopRecord>) -> Self {
        Self { records }
    }

    /// Load the full dataset through the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails or a row cannot be decoded.
    pub fn load<E: QueryExecutor>(cache: &CachedExecutor<E>) -> Result<Self> {
        let result = cache.fetch(DATASET_QUERY)?;
        Self::from_result(&result)
    }

    /// Decode a `SELECT *` result into records.
    ///
    /// Columns are matched by name; missing columns decode as absent fields
    /// and unknown columns are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordDecode`] if a driver age is not a whole number.
    pub fn from_result(result: &QueryResult) -> Result<Self> {
        let index: Vec<Option<usize>> = COLUMNS.iter().map(|c| result.column_index(c)).collect();
        let mut records = Vec::with_capacity(result.len());

        for (row_number, row) in result.rows.iter().enumerate() {
            let cell = |column: usize| cell_at(row, index[column]);
            records.push(StopRecord {
                stop_date: decode_text(cell(0)),
                stop_time: decode_text(cell(1)),
                country_name: decode_text(cell(2)),
                driver_gender: decode_text(cell(3)),
                driver_age: decode_age(cell(4), row_number)?,
                driver_race: decode_text(cell(5)),
                is_arrested: decode_flag(cell(6)),
                search_conducted: decode_flag(cell(7)),
                search_type: decode_text(cell(8)),
                stop_duration: decode_text(cell(9)),
                drugs_related_stop: decode_flag(cell(10)),
                violation: decode_text(cell(11)),
                stop_outcome: decode_text(cell(12)),
                vehicle_number: decode_text(cell(13)),
            });
        }

        Ok(Self { records })
    }

    /// All records in table order.
    #[must_use]
    pub fn records(&self) -> &[StopRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, StopRecord> {
        self.records.iter()
    }

    /// Distinct country names in order of first appearance.
    #[must_use]
    pub fn countries(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for country in self.iter().filter_map(|r| r.country_name.as_deref()) {
            if !seen.contains(&country) {
                seen.push(country);
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a StopRecord;
    type IntoIter = std::slice::Iter<'a, StopRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
