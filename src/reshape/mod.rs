//! Wide provider table -> tidy observations.
//!
//! Steps:
//! 1. melt to `(country, date, label, value)`, one row per cell
//! 2. left-join labels against the indicator catalog
//! 3. coerce the date to an integer year, dropping rows that do not parse
//! 4. report labels that did not join to a topic
//!
//! The output never contains a (country, year) pair absent from the input.

use tracing::{debug, warn};

use crate::catalog;
use crate::domain::{Observation, TidyTable, WideTable};
use crate::error::Notice;

/// A melted cell before the join and the date coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub country: String,
    pub date: String,
    pub label: String,
    pub value: Option<f64>,
}

/// Wide -> long. Missing cells stay as `None`.
pub fn melt(table: &WideTable) -> Vec<LongRow> {
    let mut out = Vec::with_capacity(table.rows.len() * table.columns.len());
    // Column-major, like a dataframe melt: all rows of the first column first.
    for (col, label) in table.columns.iter().enumerate() {
        for row in &table.rows {
            out.push(LongRow {
                country: row.country.clone(),
                date: row.date.clone(),
                label: label.clone(),
                value: row.values.get(col).copied().flatten(),
            });
        }
    }
    out
}

/// Parse a provider date as a whole year. `"2020"` parses, `"2020Q1"` does not.
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    // Numeric dates sometimes arrive as floats ("2020.0").
    let f = trimmed.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

/// Run the full reshape pipeline.
pub fn tidy(table: &WideTable) -> TidyTable {
    let long = melt(table);
    let mut out = TidyTable::default();

    for row in long {
        let indicator = catalog::by_label(&row.label);
        if indicator.is_none() && !out.unmatched_labels.contains(&row.label) {
            out.unmatched_labels.push(row.label.clone());
        }

        let Some(year) = parse_year(&row.date) else {
            out.dropped_dates += 1;
            continue;
        };

        out.rows.push(Observation {
            country: row.country,
            year,
            label: row.label,
            indicator,
            value: row.value,
        });
    }

    if !out.unmatched_labels.is_empty() {
        warn!(labels = ?out.unmatched_labels, "indicators without a topic");
    }
    debug!(
        rows = out.rows.len(),
        dropped_dates = out.dropped_dates,
        "reshape complete"
    );
    out
}

/// User-facing notices for the non-fatal issues found while reshaping.
pub fn notices(tidy: &TidyTable) -> Vec<Notice> {
    let mut out = Vec::new();
    if !tidy.unmatched_labels.is_empty() {
        out.push(Notice::warning(format!(
            "The following indicators could not be grouped: {}",
            tidy.unmatched_labels.join(", ")
        )));
    }
    if tidy.dropped_dates > 0 {
        out.push(Notice::info(format!(
            "{} row(s) dropped because their date is not a year.",
            tidy.dropped_dates
        )));
    }
    out
}
