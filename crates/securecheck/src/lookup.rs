//! Vehicle lookup and stop summaries.
//!
//! A submitted form is parsed into a [`ManualEntry`], then the dataset is
//! searched for vehicles whose identifier contains the entered text. The
//! first match supplies the summary; with no match, the entry itself does.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{parse_yes_no, Dataset, StopRecord};

/// Placeholder for a field missing from a matched record.
pub const UNKNOWN: &str = "Unknown";

/// Youngest and oldest accepted driver ages.
pub const AGE_RANGE: std::ops::RangeInclusive<i64> = 16..=100;

const YES_NO: &str = "yes or no";

/// Raw form submission, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    /// Stop date.
    pub stop_date: String,
    /// Stop time, free text.
    pub stop_time: String,
    /// Country name.
    pub country_name: String,
    /// Driver gender.
    pub driver_gender: String,
    /// Driver age.
    pub driver_age: i64,
    /// Driver race.
    pub driver_race: String,
    /// Arrested, as yes/no text.
    pub is_arrested: String,
    /// Search conducted, as yes/no text.
    pub search_conducted: String,
    /// Kind of search.
    pub search_type: String,
    /// Stop duration.
    pub stop_duration: String,
    /// Drug related, as yes/no text.
    pub drugs_related_stop: String,
    /// Violation.
    pub violation: String,
    /// Stop outcome.
    pub stop_outcome: String,
    /// Full or partial vehicle identifier.
    pub vehicle_number: String,
}

/// A validated form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEntry {
    /// Stop date.
    pub stop_date: String,
    /// Stop time.
    pub stop_time: String,
    /// Country name.
    pub country_name: String,
    /// Driver gender.
    pub driver_gender: String,
    /// Driver age, within [`AGE_RANGE`].
    pub driver_age: i64,
    /// Driver race.
    pub driver_race: String,
    /// Whether the driver was arrested.
    pub is_arrested: bool,
    /// Whether a search was conducted.
    pub search_conducted: bool,
    /// Kind of search.
    pub search_type: String,
    /// Stop duration.
    pub stop_duration: String,
    /// Whether the stop was drug related.
    pub drugs_related_stop: bool,
    /// Violation.
    pub violation: String,
    /// Stop outcome.
    pub stop_outcome: String,
    /// Vehicle identifier substring to search for.
    pub vehicle_number: String,
}

fn yes_no(field: &'static str, raw: &str) -> Result<bool> {
    parse_yes_no(raw).ok_or_else(|| Error::invalid_field(field, raw, YES_NO))
}

impl ManualEntry {
    /// Validate a raw form submission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] for an unrecognized yes/no answer or an
    /// age outside [`AGE_RANGE`].
    pub fn parse(input: FormInput) -> Result<Self> {
        if !AGE_RANGE.contains(&input.driver_age) {
            return Err(Error::invalid_field(
                "driver_age",
                input.driver_age.to_string(),
                "between 16 and 100",
            ));
        }

        Ok(Self {
            is_arrested: yes_no("is_arrested", &input.is_arrested)?,
            search_conducted: yes_no("search_conducted", &input.search_conducted)?,
            drugs_related_stop: yes_no("drugs_related_stop", &input.drugs_related_stop)?,
            stop_date: input.stop_date,
            stop_time: input.stop_time,
            country_name: input.country_name,
            driver_gender: input.driver_gender,
            driver_age: input.driver_age,
            driver_race: input.driver_race,
            search_type: input.search_type,
            stop_duration: input.stop_duration,
            violation: input.violation,
            stop_outcome: input.stop_outcome,
            vehicle_number: input.vehicle_number,
        })
    }
}

impl TryFrom<FormInput> for ManualEntry {
    type Error = Error;

    fn try_from(input: FormInput) -> Result<Self> {
        Self::parse(input)
    }
}

/// Third-person pronoun derived from a recorded gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pronoun {
    /// "he"
    He,
    /// "she"
    She,
    /// "they"
    They,
}

impl Pronoun {
    /// Pick a pronoun; anything other than male or female reads as "they".
    #[must_use]
    pub fn for_gender(gender: &str) -> Self {
        match gender.trim().to_lowercase().as_str() {
            "male" | "m" => Self::He,
            "female" | "f" => Self::She,
            _ => Self::They,
        }
    }
}

impl fmt::Display for Pronoun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::He => "he",
            Self::She => "she",
            Self::They => "they",
        })
    }
}

/// Fields rendered into the summary sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Driver age.
    pub age: String,
    /// Driver gender.
    pub gender: String,
    /// Violation.
    pub violation: String,
    /// Stop time.
    pub stop_time: String,
    /// Whether a search was conducted.
    pub searched: bool,
    /// Stop outcome.
    pub outcome: String,
    /// Stop duration.
    pub duration: String,
    /// Whether the stop was drug related.
    pub drug_related: bool,
}

fn or_unknown(value: Option<&str>) -> String {
    value.unwrap_or(UNKNOWN).to_string()
}

impl Summary {
    /// Summary of a matched record; missing text reads as "Unknown" and
    /// missing flags as no.
    #[must_use]
    pub fn from_record(record: &StopRecord) -> Self {
        Self {
            age: record
                .driver_age
                .map_or_else(|| UNKNOWN.to_string(), |age| age.to_string()),
            gender: or_unknown(record.driver_gender.as_deref()),
            violation: or_unknown(record.violation.as_deref()),
            stop_time: or_unknown(record.stop_time.as_deref()),
            searched: record.searched(),
            outcome: or_unknown(record.stop_outcome.as_deref()),
            duration: or_unknown(record.stop_duration.as_deref()),
            drug_related: record.drug_related(),
        }
    }

    /// Summary built verbatim from a manual entry.
    #[must_use]
    pub fn from_entry(entry: &ManualEntry) -> Self {
        Self {
            age: entry.driver_age.to_string(),
            gender: entry.driver_gender.clone(),
            violation: entry.violation.clone(),
            stop_time: entry.stop_time.clone(),
            searched: entry.search_conducted,
            outcome: entry.stop_outcome.clone(),
            duration: entry.stop_duration.clone(),
            drug_related: entry.drugs_related_stop,
        }
    }

    /// Pronoun for the driver.
    #[must_use]
    pub fn pronoun(&self) -> Pronoun {
        Pronoun::for_gender(&self.gender)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let search = if self.searched {
            "A search was conducted"
        } else {
            "No search was conducted"
        };
        let drugs = if self.drug_related {
            "was drug-related"
        } else {
            "was not drug-related"
        };
        write!(
            f,
            "A {}-year-old {} driver was stopped for {} at {}. {search}, and {} received a {}. The stop lasted {} and {drugs}.",
            self.age,
            self.gender,
            self.violation,
            self.stop_time,
            self.pronoun(),
            self.outcome,
            self.duration,
        )
    }
}

/// Whether the lookup found the vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStatus {
    /// At least one record matched.
    Found {
        /// The identifier that was searched for.
        vehicle: String,
    },
    /// Nothing matched; the summary comes from the form.
    NotFound,
}

impl fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { vehicle } => write!(f, "Record found for vehicle number: {vehicle}"),
            Self::NotFound => {
                f.write_str("No matching records found in dataset. Showing based on your inputs.")
            }
        }
    }
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction<'a> {
    /// Hit or miss.
    pub status: LookupStatus,
    /// Summary fields.
    pub summary: Summary,
    /// Every matching record in dataset order; the first one drove the summary.
    pub matches: Vec<&'a StopRecord>,
}

/// Records whose vehicle identifier contains `needle`, ignoring case.
///
/// Records without an identifier never match. An empty needle matches
/// every record that has one.
#[must_use]
pub fn find_vehicle<'a>(dataset: &'a Dataset, needle: &str) -> Vec<&'a StopRecord> {
    let needle = needle.to_lowercase();
    dataset
        .iter()
        .filter(|r| {
            r.vehicle_number
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Look up the entry's vehicle and build the summary.
#[must_use]
pub fn lookup<'a>(dataset: &'a Dataset, entry: &ManualEntry) -> Prediction<'a> {
    let matches = find_vehicle(dataset, &entry.vehicle_number);
    debug!(
        "Vehicle lookup for '{}' matched {} records",
        entry.vehicle_number,
        matches.len()
    );

    match matches.first().copied() {
        Some(first) => Prediction {
            status: LookupStatus::Found {
                vehicle: entry.vehicle_number.clone(),
            },
            summary: Summary::from_record(first),
            matches,
        },
        None => Prediction {
            status: LookupStatus::NotFound,
            summary: Summary::from_entry(entry),
            matches,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_dataset;

    fn form(vehicle: &str) -> FormInput {
        FormInput {
            stop_date: "2025-10-27".to_string(),
            stop_time: "2:30 PM".to_string(),
            country_name: "India".to_string(),
            driver_gender: "Female".to_string(),
            driver_age: 29,
            driver_race: "Asian".to_string(),
            is_arrested: "No".to_string(),
            search_conducted: "Yes".to_string(),
            search_type: "Vehicle".to_string(),
            stop_duration: "6-15 min".to_string(),
            drugs_related_stop: "no".to_string(),
            violation: "Speeding".to_string(),
            stop_outcome: "Warning".to_string(),
            vehicle_number: vehicle.to_string(),
        }
    }

    #[test]
    fn test_parse_form() {
        let entry = ManualEntry::parse(form("TN01")).unwrap();
        assert!(!entry.is_arrested);
        assert!(entry.search_conducted);
        assert!(!entry.drugs_related_stop);
        assert_eq!(entry.stop_time, "2:30 PM");
    }

    #[test]
    fn test_parse_rejects_ambiguous_answer() {
        let mut input = form("TN01");
        input.search_conducted = "probably".to_string();

        let err = ManualEntry::parse(input).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: "search_conducted",
                ..
            }
        ));
        assert!(err.is_user_input());
    }

    #[test]
    fn test_parse_blank_answer_is_no() {
        let mut input = form("TN01");
        input.is_arrested = String::new();
        assert!(!ManualEntry::try_from(input).unwrap().is_arrested);
    }

    #[test]
    fn test_parse_rejects_age_out_of_range() {
        for age in [15, 101, -1] {
            let mut input = form("TN01");
            input.driver_age = age;
            assert!(ManualEntry::parse(input).is_err(), "age {age}");
        }
        for age in [16, 100] {
            let mut input = form("TN01");
            input.driver_age = age;
            assert!(ManualEntry::parse(input).is_ok(), "age {age}");
        }
    }

    #[test]
    fn test_pronoun() {
        assert_eq!(Pronoun::for_gender("Male"), Pronoun::He);
        assert_eq!(Pronoun::for_gender("M"), Pronoun::He);
        assert_eq!(Pronoun::for_gender("FEMALE"), Pronoun::She);
        assert_eq!(Pronoun::for_gender("f"), Pronoun::She);
        assert_eq!(Pronoun::for_gender("Other"), Pronoun::They);
        assert_eq!(Pronoun::for_gender(""), Pronoun::They);
        assert_eq!(Pronoun::They.to_string(), "they");
    }

    #[test]
    fn test_lookup_hit_uses_first_match() {
        let dataset = fixture_dataset();
        let entry = ManualEntry::parse(form("abc")).unwrap();

        let prediction = lookup(&dataset, &entry);

        assert_eq!(
            prediction.status,
            LookupStatus::Found {
                vehicle: "abc".to_string()
            }
        );
        assert_eq!(prediction.matches.len(), 3);
        assert!(std::ptr::eq(prediction.matches[0], &dataset.records()[0]));
        assert_eq!(
            prediction.summary.to_string(),
            "A 22-year-old M driver was stopped for Speeding at 2020-01-15 21:30:00. \
             A search was conducted, and he received a Arrest. \
             The stop lasted 6-15 min and was drug-related."
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive_substring() {
        let dataset = fixture_dataset();
        let matches = find_vehicle(&dataset, "C99");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].vehicle_number.as_deref(), Some("abc999"));
    }

    #[test]
    fn test_lookup_miss_uses_entry_verbatim() {
        let dataset = fixture_dataset();
        let entry = ManualEntry::parse(form("ZZZ")).unwrap();

        let prediction = lookup(&dataset, &entry);

        assert_eq!(prediction.status, LookupStatus::NotFound);
        assert!(prediction.matches.is_empty());
        let text = prediction.summary.to_string();
        assert_eq!(
            text,
            "A 29-year-old Female driver was stopped for Speeding at 2:30 PM. \
             A search was conducted, and she received a Warning. \
             The stop lasted 6-15 min and was not drug-related."
        );
        assert!(!text.contains(UNKNOWN));
    }

    #[test]
    fn test_summary_male_searched_not_drug_related() {
        let dataset = fixture_dataset();
        let mut input = form("ZZZ");
        input.driver_gender = "Male".to_string();
        input.driver_age = 35;
        input.search_conducted = "yes".to_string();
        input.drugs_related_stop = "no".to_string();
        let entry = ManualEntry::parse(input).unwrap();

        let prediction = lookup(&dataset, &entry);

        assert_eq!(prediction.status, LookupStatus::NotFound);
        assert_eq!(
            prediction.summary.to_string(),
            "A 35-year-old Male driver was stopped for Speeding at 2:30 PM. \
             A search was conducted, and he received a Warning. \
             The stop lasted 6-15 min and was not drug-related."
        );
    }

    #[test]
    fn test_missing_record_fields_read_unknown() {
        let dataset = Dataset::new(vec![StopRecord {
            vehicle_number: Some("GHOST1".to_string()),
            ..StopRecord::default()
        }]);
        let entry = ManualEntry::parse(form("ghost")).unwrap();

        let prediction = lookup(&dataset, &entry);

        assert_eq!(
            prediction.summary.to_string(),
            "A Unknown-year-old Unknown driver was stopped for Unknown at Unknown. \
             No search was conducted, and they received a Unknown. \
             The stop lasted Unknown and was not drug-related."
        );
    }

    #[test]
    fn test_empty_needle_matches_records_with_identifier() {
        let dataset = Dataset::new(vec![
            StopRecord::default(),
            StopRecord {
                vehicle_number: Some("A1".to_string()),
                ..StopRecord::default()
            },
        ]);
        let matches = find_vehicle(&dataset, "");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].vehicle_number.as_deref(), Some("A1"));
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            LookupStatus::Found {
                vehicle: "ABC".to_string()
            }
            .to_string(),
            "Record found for vehicle number: ABC"
        );
        assert_eq!(
            LookupStatus::NotFound.to_string(),
            "No matching records found in dataset. Showing based on your inputs."
        );
    }
}
