//! Catalog of canned analytical queries.
//!
//! Each entry pairs a display name with a fixed SQL statement over the
//! `traffic_stops` table. Grouping, ordering, and row limits are part of each
//! entry's contract. Derived buckets (driver age, time of day) are written
//! once as SQL fragments and mirrored by [`AgeBucket`] and [`TimeBucket`].

use std::fmt;

use crate::error::{Error, Result};

/// SQL `CASE` mapping `driver_age` to its bucket label.
macro_rules! age_group_case {
    () => {
        "CASE
                WHEN driver_age < 25 THEN 'Under 25'
                WHEN driver_age BETWEEN 25 AND 40 THEN '25-40'
                WHEN driver_age BETWEEN 41 AND 60 THEN '41-60'
                ELSE '60+'
            END"
    };
}

/// Hour of day (0-23) of `stop_time`.
macro_rules! stop_hour {
    () => {
        "CAST(strftime('%H', stop_time) AS INTEGER)"
    };
}

/// SQL `CASE` mapping the hour of `stop_time` to its bucket label.
macro_rules! time_period_case {
    () => {
        concat!(
            "CASE
                WHEN ",
            stop_hour!(),
            " BETWEEN 20 AND 23 THEN 'Night'
                WHEN ",
            stop_hour!(),
            " BETWEEN 0 AND 4 THEN 'Late Night'
                ELSE 'Daytime'
            END"
        )
    };
}

/// Arrested rows as 0/1, robust to NULL.
macro_rules! arrested_count {
    () => {
        "SUM(CASE WHEN is_arrested = TRUE THEN 1 ELSE 0 END)"
    };
}

/// Derived age bucket of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBucket {
    /// Younger than 25.
    Under25,
    /// 25 through 40 inclusive.
    From25To40,
    /// 41 through 60 inclusive.
    From41To60,
    /// Older than 60.
    Over60,
}

impl AgeBucket {
    /// All buckets, youngest first.
    pub const ALL: [Self; 4] = [
        Self::Under25,
        Self::From25To40,
        Self::From41To60,
        Self::Over60,
    ];

    /// Classify an age. Every integer maps to exactly one bucket.
    #[must_use]
    pub fn for_age(age: i64) -> Self {
        match age {
            ..=24 => Self::Under25,
            25..=40 => Self::From25To40,
            41..=60 => Self::From41To60,
            _ => Self::Over60,
        }
    }

    /// Label used in query results.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Under25 => "Under 25",
            Self::From25To40 => "25-40",
            Self::From41To60 => "41-60",
            Self::Over60 => "60+",
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived time-of-day bucket of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    /// 20:00 through 23:59.
    Night,
    /// 00:00 through 04:59.
    LateNight,
    /// Every other hour.
    Daytime,
}

impl TimeBucket {
    /// Classify an hour of day.
    #[must_use]
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            20..=23 => Self::Night,
            0..=4 => Self::LateNight,
            _ => Self::Daytime,
        }
    }

    /// Label used in query results.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Night => "Night",
            Self::LateNight => "Late Night",
            Self::Daytime => "Daytime",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named analytical query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedQuery {
    /// Display name; unique within the catalog.
    pub name: &'static str,
    /// One-line explanation shown in listings.
    pub description: &'static str,
    /// The complete SQL statement.
    pub sql: &'static str,
}

impl fmt::Display for NamedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Every catalog query, in display order.
pub static QUERIES: [NamedQuery; 18] = [
    NamedQuery {
        name: "Top 10 vehicle_Number involved in drug-related stops",
        description: "Vehicle numbers of the first ten drug-related stops",
        sql: r"
            SELECT vehicle_number
            FROM traffic_stops
            WHERE drugs_related_stop = TRUE
            LIMIT 10",
    },
    NamedQuery {
        name: "Vehicles most frequently searched",
        description: "Ten vehicle numbers with the most recorded stops",
        sql: r"
            SELECT vehicle_number, COUNT(*) AS stop_count
            FROM traffic_stops
            GROUP BY vehicle_number
            ORDER BY stop_count DESC
            LIMIT 10",
    },
    NamedQuery {
        name: "Driver age group with highest arrest rate",
        description: "Age bucket whose stops most often end in arrest",
        sql: concat!(
            r"
            SELECT age_group,
                   COUNT(*) AS total_stops,
                   SUM(is_arrested) AS total_arrests,
                   ROUND(SUM(is_arrested) * 100.0 / COUNT(*), 2) AS arrest_rate_percent
            FROM (
                SELECT *, ",
            age_group_case!(),
            r" AS age_group
                FROM traffic_stops
            ) AS age_groups
            GROUP BY age_group
            ORDER BY arrest_rate_percent DESC
            LIMIT 1"
        ),
    },
    NamedQuery {
        name: "Gender distribution by country",
        description: "Stops per driver gender within each country",
        sql: r"
            SELECT country_name, driver_gender, COUNT(*) AS total_stops
            FROM traffic_stops
            GROUP BY country_name, driver_gender
            ORDER BY country_name, total_stops DESC",
    },
    NamedQuery {
        name: "Race & gender with highest search rate",
        description: "Race and gender pair searched most often",
        sql: r"
            SELECT driver_race, driver_gender, COUNT(*) AS searches
            FROM traffic_stops
            WHERE search_conducted = TRUE
            GROUP BY driver_race, driver_gender
            ORDER BY searches DESC
            LIMIT 1",
    },
    NamedQuery {
        name: "Average stop duration by violation",
        description: "Mean of the leading minutes of each duration bucket",
        sql: r"
            SELECT violation,
                   AVG(CAST(stop_duration AS INTEGER)) AS avg_stop_duration,
                   COUNT(*) AS total_stops
            FROM traffic_stops
            GROUP BY violation
            ORDER BY avg_stop_duration DESC",
    },
    NamedQuery {
        name: "Stops during night vs arrests",
        description: "Arrest rate by time of day",
        sql: concat!(
            r"
            SELECT ",
            time_period_case!(),
            r" AS time_period,
                   COUNT(*) AS total_stops,
                   ",
            arrested_count!(),
            r" AS arrests,
                   ROUND(",
            arrested_count!(),
            r" * 100.0 / COUNT(*), 2) AS arrest_rate_percent
            FROM traffic_stops
            GROUP BY time_period
            ORDER BY arrest_rate_percent DESC"
        ),
    },
    NamedQuery {
        name: "Violations most associated with searches/arrests",
        description: "Three violations with the most searches or arrests",
        sql: r"
            SELECT violation, COUNT(*) AS search_or_arrest_count
            FROM traffic_stops
            WHERE search_conducted = TRUE OR is_arrested = TRUE
            GROUP BY violation
            ORDER BY search_or_arrest_count DESC
            LIMIT 3",
    },
    NamedQuery {
        name: "Violations common among younger drivers (<25)",
        description: "Most frequent violation among drivers under 25",
        sql: r"
            SELECT violation, COUNT(*) AS total_stops
            FROM traffic_stops
            WHERE driver_age < 25
            GROUP BY violation
            ORDER BY total_stops DESC
            LIMIT 1",
    },
    NamedQuery {
        name: "Rare violations with few searches/arrests",
        description: "Violation with the fewest (under ten) searches or arrests",
        sql: r"
            SELECT violation, COUNT(*) AS search_or_arrest_count
            FROM traffic_stops
            WHERE search_conducted = TRUE OR is_arrested = TRUE
            GROUP BY violation
            HAVING search_or_arrest_count < 10
            ORDER BY search_or_arrest_count
            LIMIT 1",
    },
    NamedQuery {
        name: "Top highest countries (drug-related stops)",
        description: "Five countries with the most drug-related stops",
        sql: r"
            SELECT country_name, COUNT(*) AS drug_stops
            FROM traffic_stops
            WHERE drugs_related_stop = TRUE
            GROUP BY country_name
            ORDER BY drug_stops DESC
            LIMIT 5",
    },
    NamedQuery {
        name: "Arrest rate by country & violation",
        description: "Five country and violation pairs with the highest arrest rate",
        sql: concat!(
            r"
            SELECT country_name, violation,
                   ",
            arrested_count!(),
            r" AS arrest_count,
                   COUNT(*) AS total_count,
                   ROUND(",
            arrested_count!(),
            r" * 100.0 / COUNT(*), 2) AS arrest_rate_percent
            FROM traffic_stops
            GROUP BY country_name, violation
            ORDER BY arrest_rate_percent DESC
            LIMIT 5"
        ),
    },
    NamedQuery {
        name: "Country with most searches",
        description: "Country where searches happen most often",
        sql: r"
            SELECT country_name, COUNT(*) AS searches
            FROM traffic_stops
            WHERE search_conducted = TRUE
            GROUP BY country_name
            ORDER BY searches DESC
            LIMIT 1",
    },
    NamedQuery {
        name: "Yearly breakdown of stops & arrests",
        description: "Stops and arrests per country per year",
        sql: r"
            SELECT country_name,
                   CAST(strftime('%Y', stop_time) AS INTEGER) AS year,
                   COUNT(*) AS total_stops,
                   SUM(is_arrested) AS total_arrests
            FROM traffic_stops
            GROUP BY country_name, year
            ORDER BY country_name, year",
    },
    NamedQuery {
        name: "Driver violation trends by age & race",
        description: "Violations per age bucket and race",
        sql: concat!(
            r"
            SELECT ",
            age_group_case!(),
            r" AS age_group,
                   driver_race, violation, COUNT(*) AS total
            FROM traffic_stops
            GROUP BY age_group, driver_race, violation
            ORDER BY age_group, driver_race, total DESC"
        ),
    },
    NamedQuery {
        name: "Stop pattern by year, month, hour",
        description: "Stops per calendar hour",
        sql: concat!(
            r"
            SELECT CAST(strftime('%Y', stop_time) AS INTEGER) AS year,
                   CAST(strftime('%m', stop_time) AS INTEGER) AS month,
                   ",
            stop_hour!(),
            r" AS hour,
                   COUNT(*) AS total_stops
            FROM traffic_stops
            GROUP BY year, month, hour
            ORDER BY year, month, hour"
        ),
    },
    NamedQuery {
        name: "Top 10 violations by arrest rate",
        description: "Ten violations ranked by arrest rate",
        sql: r"
            SELECT violation,
                   COUNT(*) AS total_stops,
                   SUM(is_arrested) AS total_arrests,
                   ROUND(100.0 * SUM(is_arrested) / COUNT(*), 2) AS arrest_rate
            FROM traffic_stops
            GROUP BY violation
            ORDER BY arrest_rate DESC
            LIMIT 10",
    },
    NamedQuery {
        name: "Driver demographics by country",
        description: "Average age and diversity of drivers per country",
        sql: r"
            SELECT country_name,
                   ROUND(AVG(driver_age), 1) AS avg_age,
                   COUNT(DISTINCT driver_gender) AS gender_diversity,
                   COUNT(DISTINCT driver_race) AS race_diversity,
                   COUNT(*) AS total_drivers
            FROM traffic_stops
            GROUP BY country_name
            ORDER BY total_drivers DESC",
    },
];

/// All catalog queries in display order.
#[must_use]
pub fn all() -> &'static [NamedQuery] {
    &QUERIES
}

/// Iterate over catalog queries in display order.
pub fn iter() -> std::slice::Iter<'static, NamedQuery> {
    QUERIES.iter()
}

/// Look up a query by its exact display name.
///
/// # Errors
///
/// Returns [`Error::UnknownQuery`] if no entry has that name.
pub fn get(name: &str) -> Result<&'static NamedQuery> {
    QUERIES
        .iter()
        .find(|q| q.name == name)
        .ok_or_else(|| Error::UnknownQuery {
            name: name.to_string(),
        })
}

/// Look up a query by exact name or by its 1-based position in the catalog.
///
/// # Errors
///
/// Returns [`Error::UnknownQuery`] if neither interpretation matches.
pub fn select(selector: &str) -> Result<&'static NamedQuery> {
    let selector = selector.trim();
    if let Ok(position) = selector.parse::<usize>() {
        if let Some(query) = position.checked_sub(1).and_then(|i| QUERIES.get(i)) {
            return Ok(query);
        }
    }
    get(selector)
}
