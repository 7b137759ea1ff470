//! Terminal charts.
//!
//! Views describe what to draw as a [`Chart`] and hand it to a
//! [`ChartRenderer`]. The [`TextChartRenderer`] draws horizontal bars with
//! Unicode block characters.

use std::io::Write;

use crate::access::QueryResult;
use crate::error::Result;

/// Notice shown when a query result has nothing to plot.
pub const NO_NUMERIC_DATA: &str = "No numeric data to plot for this query.";

/// Partial-cell blocks, one eighth to eight eighths.
const EIGHTHS: [char; 8] = ['▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];
const FULL: char = '█';
const EMPTY: char = '░';

/// Chart shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Bars scaled against the largest value.
    Bar,
    /// Shares of the total.
    Pie,
}

/// One labelled value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Category label.
    pub label: String,
    /// Plotted value.
    pub value: f64,
}

/// A chart ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Chart shape.
    pub kind: ChartKind,
    /// Title drawn above the chart.
    pub title: String,
    /// Points in display order.
    pub points: Vec<ChartPoint>,
}

impl Chart {
    /// Build a chart from label counts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(
        kind: ChartKind,
        title: impl Into<String>,
        counts: &[(&str, usize)],
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            points: counts
                .iter()
                .map(|(label, count)| ChartPoint {
                    label: (*label).to_string(),
                    value: *count as f64,
                })
                .collect(),
        }
    }

    /// Check if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Something that can draw a chart.
pub trait ChartRenderer {
    /// Draw one chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn render(&mut self, chart: &Chart) -> Result<()>;
}

/// Draws charts as text to any writer.
#[derive(Debug)]
pub struct TextChartRenderer<W> {
    out: W,
    width: usize,
}

impl<W: Write> TextChartRenderer<W> {
    /// Create a renderer whose longest bar spans `width` cells.
    pub fn new(out: W, width: usize) -> Self {
        Self {
            out,
            width: width.max(1),
        }
    }

    /// Consume the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn label_width(chart: &Chart) -> usize {
        chart
            .points
            .iter()
            .map(|p| p.label.chars().count())
            .max()
            .unwrap_or(0)
    }
}

impl<W: Write> ChartRenderer for TextChartRenderer<W> {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        writeln!(self.out, "{}", chart.title)?;
        let label_width = Self::label_width(chart);

        match chart.kind {
            ChartKind::Bar => {
                let max = chart.points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
                for point in &chart.points {
                    let fraction = if max > 0.0 { point.value / max } else { 0.0 };
                    let bar = bar(fraction, self.width);
                    writeln!(
                        self.out,
                        "  {:<label_width$} │{bar} {}",
                        point.label,
                        format_value(point.value)
                    )?;
                }
            }
            ChartKind::Pie => {
                let total: f64 = chart.points.iter().map(|p| p.value.max(0.0)).sum();
                for point in &chart.points {
                    let share = if total > 0.0 {
                        point.value.max(0.0) / total
                    } else {
                        0.0
                    };
                    let bar = share_bar(share, self.width);
                    writeln!(
                        self.out,
                        "  {:<label_width$} │{bar} {:>5.1}%",
                        point.label,
                        share * 100.0
                    )?;
                }
            }
        }

        self.out.flush()?;
        Ok(())
    }
}

/// Horizontal bar of `fraction * width` cells with an eighth-block tail.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar(fraction: f64, width: usize) -> String {
    let eighths = (fraction.clamp(0.0, 1.0) * (width * 8) as f64).round() as usize;
    let full = eighths / 8;
    let rest = eighths % 8;

    let mut bar: String = std::iter::repeat_n(FULL, full).collect();
    if rest > 0 {
        bar.push(EIGHTHS[rest - 1]);
    }
    bar
}

/// Filled and empty cells showing a share of the whole.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn share_bar(share: f64, width: usize) -> String {
    let filled = (share.clamp(0.0, 1.0) * width as f64).round() as usize;
    std::iter::repeat_n(FULL, filled)
        .chain(std::iter::repeat_n(EMPTY, width - filled))
        .collect()
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Result of trying to chart a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    /// A chart was drawn.
    Rendered,
    /// Nothing was drawn.
    Skipped {
        /// Explanation for the user.
        notice: &'static str,
    },
}

/// Chart the first numeric column of a result against its first column.
///
/// The first column is the category axis and is never plotted itself. When
/// no other column is numeric, nothing is drawn and the renderer is not
/// called. Rows with a missing value are left out.
///
/// # Errors
///
/// Returns an error if the renderer fails.
pub fn plot_query_result(
    result: &QueryResult,
    title: &str,
    renderer: &mut dyn ChartRenderer,
) -> Result<ChartOutcome> {
    let Some(column) = result.numeric_columns().into_iter().find(|&i| i > 0) else {
        return Ok(ChartOutcome::Skipped {
            notice: NO_NUMERIC_DATA,
        });
    };

    let points = result
        .rows
        .iter()
        .filter_map(|row| {
            let value = row.get(column)?.as_f64()?;
            let label = row.first()?.to_string();
            Some(ChartPoint { label, value })
        })
        .collect();

    let chart = Chart {
        kind: ChartKind::Bar,
        title: format!("{title} ({})", result.columns[column]),
        points,
    };
    renderer.render(&chart)?;
    Ok(ChartOutcome::Rendered)
}
