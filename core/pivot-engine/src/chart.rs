//! FILENAME: core/pivot-engine/src/chart.rs
//! PURPOSE: Turns the active dataset into chart series.
//! CONTEXT: The drawing itself happens elsewhere; this module only selects,
//! counts and trims the points a chart is fed. Pie charts count categories,
//! the other chart types plot one point per row.

use crate::error::ChartError;
use engine::{FieldValue, Row};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Categories shown individually on a pie chart.
pub const PIE_TOP_CATEGORIES: usize = 10;

/// Points plotted on bar, line and scatter charts.
pub const MAX_XY_POINTS: usize = 50;

/// Pie slice names longer than this are cut and suffixed with "...".
pub const MAX_LABEL_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
}

impl Default for ChartType {
    fn default() -> Self {
        ChartType::Bar
    }
}

impl ChartType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
        }
    }

    pub fn needs_y_axis(self) -> bool {
        self != ChartType::Pie
    }
}

/// What the user asked to chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub chart_type: ChartType,
    pub x_axis: String,
    #[serde(default)]
    pub y_axis: String,
}

impl ChartRequest {
    pub fn new(chart_type: ChartType, x_axis: impl Into<String>, y_axis: impl Into<String>) -> Self {
        ChartRequest {
            chart_type,
            x_axis: x_axis.into(),
            y_axis: y_axis.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if self.x_axis.trim().is_empty() {
            return Err(ChartError::MissingXAxis);
        }
        if self.chart_type.needs_y_axis() && self.y_axis.trim().is_empty() {
            return Err(ChartError::MissingYAxis(self.chart_type.as_str().to_string()));
        }
        Ok(())
    }
}

/// One plotted point or pie slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
    /// Sum over all slices; pie charts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// Builds the series for `request` from the active dataset.
pub fn chart_series(rows: &[Row], request: &ChartRequest) -> Result<Vec<ChartPoint>, ChartError> {
    request.validate()?;
    if rows.is_empty() {
        return Err(ChartError::NoData);
    }

    Ok(match request.chart_type {
        ChartType::Pie => pie_series(rows, &request.x_axis),
        _ => xy_series(rows, &request.x_axis, &request.y_axis),
    })
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() > MAX_LABEL_CHARS {
        let cut: String = name.chars().take(MAX_LABEL_CHARS).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}

fn has_value(value: Option<&FieldValue>) -> bool {
    match value {
        None | Some(FieldValue::Null) => false,
        Some(FieldValue::Text(text)) => !text.is_empty(),
        Some(_) => true,
    }
}

/// Counts rows per x value; the top categories are kept and the rest fold
/// into one `Others (<n> categories)` slice.
fn pie_series(rows: &[Row], x_axis: &str) -> Vec<ChartPoint> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for row in rows {
        let value = row.get(x_axis);
        if !has_value(value) {
            continue;
        }
        let category = value.map(FieldValue::display_value).unwrap_or_default();
        match index.get(&category) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(category.clone(), counts.len());
                counts.push((category, 1));
            }
        }
    }

    let total: usize = counts.iter().map(|(_, count)| count).sum();
    // Stable: equal counts keep first-appearance order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let category_count = counts.len();
    let top: Vec<(String, usize)> = counts.into_iter().take(PIE_TOP_CATEGORIES).collect();
    let top_total: usize = top.iter().map(|(_, count)| count).sum();

    let mut series: Vec<ChartPoint> = top
        .into_iter()
        .map(|(name, count)| ChartPoint {
            name: truncate_label(&name),
            value: count as f64,
            total: Some(total as f64),
        })
        .collect();

    let others = total - top_total;
    if others > 0 {
        series.push(ChartPoint {
            name: format!("Others ({} categories)", category_count - PIE_TOP_CATEGORIES),
            value: others as f64,
            total: Some(total as f64),
        });
    }
    series
}

/// One point per row with both axes present; non-numeric y reads as 0 and
/// only positive values are plotted.
fn xy_series(rows: &[Row], x_axis: &str, y_axis: &str) -> Vec<ChartPoint> {
    rows.iter()
        .filter(|row| has_value(row.get(x_axis)) && has_value(row.get(y_axis)))
        .map(|row| ChartPoint {
            name: row.display(x_axis),
            value: row.get(y_axis).and_then(FieldValue::as_f64).unwrap_or(0.0),
            total: None,
        })
        .filter(|point| point.value > 0.0)
        .take(MAX_XY_POINTS)
        .collect()
}

/// Rows with a label and a positive numeric value, largest first, at most `n`.
pub fn top_n_by(rows: &[Row], label_field: &str, value_field: &str, n: usize) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = rows
        .iter()
        .filter(|row| row.has_value(label_field))
        .filter_map(|row| {
            let value = row.get(value_field).and_then(FieldValue::as_f64)?;
            (value > 0.0).then(|| ChartPoint {
                name: row.display(label_field),
                value,
                total: None,
            })
        })
        .collect();

    points.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    points.truncate(n);
    points
}
