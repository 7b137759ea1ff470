//! Summary metrics and frequency distributions over stop records.
//!
//! Every function here works on borrowed records, so the same code serves
//! the full dataset and any country-filtered view of it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::record::{Dataset, StopRecord};

/// Headline counts for a set of stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Number of stops.
    pub total_stops: usize,
    /// Stops that ended in arrest.
    pub arrests: usize,
    /// Drug-related stops.
    pub drug_related: usize,
    /// Distinct known vehicle identifiers.
    pub unique_vehicles: usize,
}

impl Metrics {
    /// Compute metrics over a set of records.
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a StopRecord>) -> Self {
        let mut metrics = Self::default();
        let mut vehicles = HashSet::new();

        for record in records {
            metrics.total_stops += 1;
            if record.arrested() {
                metrics.arrests += 1;
            }
            if record.drug_related() {
                metrics.drug_related += 1;
            }
            if let Some(vehicle) = record.vehicle_number.as_deref() {
                vehicles.insert(vehicle);
            }
        }

        metrics.unique_vehicles = vehicles.len();
        metrics
    }
}

/// Count occurrences of each value.
///
/// Missing values are skipped. The result is ordered by count descending,
/// with ties kept in order of first appearance.
pub fn value_counts<'a, I>(values: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for value in values.into_iter().flatten() {
        if let Some(&i) = position.get(value) {
            counts[i].1 += 1;
        } else {
            position.insert(value, counts.len());
            counts.push((value, 1));
        }
    }

    // Stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Frequency of each violation.
pub fn violation_counts<'a>(
    records: impl IntoIterator<Item = &'a StopRecord>,
) -> Vec<(&'a str, usize)> {
    value_counts(records.into_iter().map(|r| r.violation.as_deref()))
}

/// The `n` vehicles appearing most often among drug-related stops.
pub fn top_drug_vehicles<'a>(
    records: impl IntoIterator<Item = &'a StopRecord>,
    n: usize,
) -> Vec<(&'a str, usize)> {
    let mut counts = value_counts(
        records
            .into_iter()
            .filter(|r| r.drug_related())
            .map(|r| r.vehicle_number.as_deref()),
    );
    counts.truncate(n);
    counts
}

/// Restricts a dataset to one country, or passes it through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CountryFilter {
    /// Every record.
    #[default]
    All,
    /// Records whose country matches exactly.
    Country(String),
}

impl CountryFilter {
    /// Label of the pass-through choice.
    pub const ALL_LABEL: &'static str = "All";

    /// Interpret a user selection; "All" (or nothing) selects every record.
    #[must_use]
    pub fn parse(selection: Option<&str>) -> Self {
        match selection.map(str::trim) {
            None | Some("" | Self::ALL_LABEL) => Self::All,
            Some(country) => Self::Country(country.to_string()),
        }
    }

    /// Check if a record passes the filter.
    #[must_use]
    pub fn matches(&self, record: &StopRecord) -> bool {
        match self {
            Self::All => true,
            Self::Country(name) => record.country_name.as_deref() == Some(name.as_str()),
        }
    }

    /// Borrow the matching records, in dataset order.
    #[must_use]
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a StopRecord> {
        dataset.iter().filter(|r| self.matches(r)).collect()
    }

    /// Filter choices for a dataset: "All" followed by each country.
    #[must_use]
    pub fn choices(dataset: &Dataset) -> Vec<&str> {
        std::iter::once(Self::ALL_LABEL)
            .chain(dataset.countries())
            .collect()
    }
}

impl fmt::Display for CountryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL_LABEL),
            Self::Country(name) => f.write_str(name),
        }
    }
}
