//! Rendered views.
//!
//! Each view reads through the session's [`CachedExecutor`] and writes text
//! to a writer. Failures of the interaction that caused them are returned to
//! the caller, except in the prediction view, which reports them inline.

use std::fmt;
use std::io::Write;

use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::Table;

use crate::access::{CachedExecutor, QueryExecutor, QueryResult};
use crate::catalog;
use crate::chart::{
    plot_query_result, Chart, ChartKind, ChartOutcome, ChartRenderer, TextChartRenderer,
};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lookup::{lookup, FormInput, LookupStatus, ManualEntry};
use crate::metrics::{top_drug_vehicles, violation_counts, CountryFilter, Metrics};
use crate::record::{Dataset, StopRecord, COLUMNS};
use crate::storage::Database;

/// Notice shown when a catalog query returns nothing.
pub const NO_RESULTS: &str = "No results found for this query.";

/// Hint shown after a failed prediction.
pub const PREDICTION_HINT: &str = "Please check your dataset columns and formats.";

const FORM_HINT: &str = "Answer yes/no fields with yes or no, and give an age between 16 and 100.";

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Something worked.
    Success,
    /// Neutral information.
    Info,
    /// Something the user should look at.
    Warning,
    /// Something failed.
    Error,
}

impl NoticeLevel {
    fn symbol(self) -> char {
        match self {
            Self::Success => '✔',
            Self::Info => 'ℹ',
            Self::Warning => '⚠',
            Self::Error => '✖',
        }
    }
}

/// A one-line status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
}

impl Notice {
    /// Create a notice.
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.symbol(), self.message)
    }
}

fn heading(out: &mut dyn Write, title: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "─".repeat(title.chars().count()))?;
    Ok(())
}

fn notice(out: &mut dyn Write, level: NoticeLevel, message: impl Into<String>) -> Result<()> {
    writeln!(out, "{}", Notice::new(level, message))?;
    Ok(())
}

fn rounded(builder: Builder) -> Table {
    let mut table = builder.build();
    table.with(Style::rounded());
    table
}

/// Labelled figures laid out side by side.
#[must_use]
pub fn metric_cards(cards: &[(&str, usize)]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(cards.iter().map(|(label, _)| (*label).to_string()));
    builder.push_record(cards.iter().map(|(_, value)| value.to_string()));
    rounded(builder)
}

/// A query result as a table.
#[must_use]
pub fn result_table(result: &QueryResult) -> Table {
    let mut builder = Builder::default();
    builder.push_record(result.columns.iter().cloned());
    for row in &result.rows {
        builder.push_record(row.iter().map(ToString::to_string));
    }
    rounded(builder)
}

/// Label counts as a two-column table.
#[must_use]
pub fn counts_table(label: &str, counts: &[(&str, usize)]) -> Table {
    let mut builder = Builder::default();
    builder.push_record([label.to_string(), "Count".to_string()]);
    for (value, count) in counts {
        builder.push_record([(*value).to_string(), count.to_string()]);
    }
    rounded(builder)
}

/// Stop records with every stored column.
#[must_use]
pub fn records_table(records: &[&StopRecord]) -> Table {
    fn text<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(String::new, |v| v.to_string())
    }

    let mut builder = Builder::default();
    builder.push_record(COLUMNS);
    for r in records {
        builder.push_record([
            text(r.stop_date.as_deref()),
            text(r.stop_time.as_deref()),
            text(r.country_name.as_deref()),
            text(r.driver_gender.as_deref()),
            text(r.driver_age),
            text(r.driver_race.as_deref()),
            text(r.is_arrested),
            text(r.search_conducted),
            text(r.search_type.as_deref()),
            text(r.stop_duration.as_deref()),
            text(r.drugs_related_stop),
            text(r.violation.as_deref()),
            text(r.stop_outcome.as_deref()),
            text(r.vehicle_number.as_deref()),
        ]);
    }
    rounded(builder)
}

fn plain_result(out: &mut dyn Write, result: &QueryResult) -> Result<()> {
    writeln!(out, "{}", result.columns.join(" | "))?;
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", cells.join(" | "))?;
    }
    Ok(())
}

fn draw(out: &mut dyn Write, config: &Config, chart: &Chart) -> Result<()> {
    if config.chart.enabled && !chart.is_empty() {
        TextChartRenderer::new(out, config.chart.width).render(chart)?;
    }
    Ok(())
}

/// Overview of the whole dataset.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or output fails.
pub fn dashboard<E: QueryExecutor>(
    cache: &CachedExecutor<E>,
    config: &Config,
    out: &mut dyn Write,
) -> Result<()> {
    let dataset = Dataset::load(cache)?;
    let metrics = Metrics::compute(&dataset);

    heading(out, "SecureCheck Dashboard")?;
    writeln!(out, "Insights into traffic stops and violations")?;
    writeln!(
        out,
        "{}",
        metric_cards(&[
            ("Total Stops", metrics.total_stops),
            ("Total Arrests", metrics.arrests),
            ("Drug-Related Stops", metrics.drug_related),
            ("Unique Vehicles", metrics.unique_vehicles),
        ])
    )?;

    heading(out, "Stops by Violation")?;
    let violations = violation_counts(&dataset);
    if config.chart.enabled {
        let chart = Chart::from_counts(ChartKind::Bar, "Count", &violations);
        draw(out, config, &chart)?;
    } else {
        writeln!(out, "{}", counts_table("Violation", &violations))?;
    }

    heading(out, "Top Vehicle Numbers (Drug-Related)")?;
    let vehicles = top_drug_vehicles(&dataset, config.dashboard.top_vehicles);
    writeln!(out, "{}", counts_table("Vehicle Number", &vehicles))?;
    Ok(())
}

/// Country-filtered metrics and violation shares.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or output fails.
pub fn traffic<E: QueryExecutor>(
    cache: &CachedExecutor<E>,
    config: &Config,
    country: Option<&str>,
    list_countries: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let dataset = Dataset::load(cache)?;

    if list_countries {
        for choice in CountryFilter::choices(&dataset) {
            writeln!(out, "{choice}")?;
        }
        return Ok(());
    }

    let filter = CountryFilter::parse(country);
    if let CountryFilter::Country(name) = &filter {
        if !dataset.countries().contains(&name.as_str()) {
            let message = format!("No stops recorded for country: {name}");
            notice(out, NoticeLevel::Warning, message)?;
        }
    }

    let records = filter.apply(&dataset);
    let metrics = Metrics::compute(records.iter().copied());

    heading(out, &format!("Traffic Violation Visualization ({filter})"))?;
    writeln!(
        out,
        "{}",
        metric_cards(&[
            ("Filtered Stops", metrics.total_stops),
            ("Filtered Arrests", metrics.arrests),
            ("Filtered Drug-Related", metrics.drug_related),
            ("Unique Vehicles", metrics.unique_vehicles),
        ])
    )?;

    heading(out, "Stops by Violation")?;
    let mut violations = violation_counts(records.iter().copied());
    draw(
        out,
        config,
        &Chart::from_counts(ChartKind::Pie, "Violation Distribution", &violations),
    )?;
    violations.truncate(config.dashboard.top_violations);
    writeln!(out, "{}", counts_table("Violation", &violations))?;
    Ok(())
}

/// Numbered catalog listing.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn list_queries(out: &mut dyn Write) -> Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["#", "Query", "Description"]);
    for (i, query) in catalog::iter().enumerate() {
        builder.push_record([
            (i + 1).to_string(),
            query.name.to_string(),
            query.description.to_string(),
        ]);
    }
    writeln!(out, "{}", rounded(builder))?;
    Ok(())
}

/// Run one catalog query and show its result.
///
/// # Errors
///
/// Returns an error if the query is unknown, fails, or output fails.
pub fn run_query<E: QueryExecutor>(
    cache: &CachedExecutor<E>,
    config: &Config,
    selector: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let query = catalog::select(selector)?;
    let result = cache.fetch(query.sql)?;

    if format == OutputFormat::Json {
        writeln!(out, "{}", serde_json::to_string_pretty(&*result)?)?;
        return Ok(());
    }

    heading(out, query.name)?;
    if result.is_empty() {
        return notice(out, NoticeLevel::Warning, NO_RESULTS);
    }

    match format {
        OutputFormat::Table => writeln!(out, "{}", result_table(&result))?,
        _ => plain_result(out, &result)?,
    }

    if config.chart.enabled {
        writeln!(out)?;
        let mut renderer = TextChartRenderer::new(&mut *out, config.chart.width);
        if let ChartOutcome::Skipped { notice: message } =
            plot_query_result(&result, query.name, &mut renderer)?
        {
            notice(out, NoticeLevel::Info, message)?;
        }
    }
    Ok(())
}

/// Look up a vehicle and summarize the stop.
///
/// Lookup failures are reported in the output and do not end the
/// interaction.
///
/// # Errors
///
/// Returns an error only if output fails.
pub fn predict<E: QueryExecutor>(
    cache: &CachedExecutor<E>,
    input: FormInput,
    out: &mut dyn Write,
) -> Result<()> {
    heading(out, "Search & Predict")?;

    let prepared = ManualEntry::parse(input).and_then(|entry| Ok((entry, Dataset::load(cache)?)));
    let (entry, dataset) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return prediction_failed(out, &e),
    };

    let prediction = lookup(&dataset, &entry);
    match &prediction.status {
        LookupStatus::Found { .. } => {
            writeln!(out, "Prediction Summary")?;
            writeln!(out, "{}", prediction.summary)?;
            writeln!(out)?;
            notice(out, NoticeLevel::Success, prediction.status.to_string())?;
            writeln!(out, "{}", records_table(&prediction.matches))?;
        }
        LookupStatus::NotFound => {
            notice(out, NoticeLevel::Warning, prediction.status.to_string())?;
            writeln!(out)?;
            writeln!(out, "Predicted Summary")?;
            writeln!(out, "{}", prediction.summary)?;
        }
    }
    Ok(())
}

fn prediction_failed(out: &mut dyn Write, error: &Error) -> Result<()> {
    tracing::warn!("Prediction failed: {}", error);
    let message = format!("Error in prediction: {error}");
    notice(out, NoticeLevel::Error, message)?;
    if error.is_user_input() {
        notice(out, NoticeLevel::Info, FORM_HINT)
    } else if error.is_data_access() {
        notice(out, NoticeLevel::Info, PREDICTION_HINT)
    } else {
        Ok(())
    }
}

/// Static application information.
///
/// # Errors
///
/// Returns an error if database statistics cannot be read or output fails.
pub fn about(db: &Database, out: &mut dyn Write) -> Result<()> {
    let stats = db.stats()?;

    heading(out, "About SecureCheck")?;
    writeln!(out, "Version:   {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "Purpose:   {}", env!("CARGO_PKG_DESCRIPTION"))?;
    writeln!(out, "Database:  {}", db.path().display())?;
    writeln!(out, "Stops:     {}", stats.total_stops)?;
    writeln!(out, "Countries: {}", stats.countries)?;
    writeln!(out, "Size:      {} bytes", stats.db_size_bytes)?;
    writeln!(out, "Queries:   {}", catalog::all().len())?;
    Ok(())
}
