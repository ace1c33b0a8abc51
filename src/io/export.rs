//! Export analysis and projection results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use serde::Serialize;

use crate::domain::TidyTable;
use crate::error::AppError;
use crate::projections::{ProjectionKind, Projections};

#[derive(Serialize)]
struct TidyRecord<'a> {
    country: &'a str,
    year: i32,
    code: &'a str,
    indicator: &'a str,
    value: Option<f64>,
}

/// Write the tidy observation table to a CSV file (one row per observation).
pub fn write_tidy_csv(path: &Path, tidy: &TidyTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for obs in &tidy.rows {
        writer
            .serialize(TidyRecord {
                country: &obs.country,
                year: obs.year,
                code: obs.code().unwrap_or(""),
                indicator: &obs.label,
                value: obs.value,
            })
            .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::usage(format!("Failed to flush export CSV: {e}")))
}

/// Write the projection table: one row per period, one column per series.
pub fn write_projections_csv(path: &Path, projections: &Projections) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header = vec!["country".to_string(), "iso".to_string(), "year".to_string()];
    header.extend(ProjectionKind::ALL.iter().map(|k| k.key().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::usage(format!("Failed to write export CSV header: {e}")))?;

    for (year, cells) in projections.table() {
        let mut record = vec![projections.country.clone(), projections.iso.clone(), year.to_string()];
        record.extend(cells.into_iter().map(|c| c.map(|v| format!("{v:.6}")).unwrap_or_default()));
        writer
            .write_record(&record)
            .map_err(|e| AppError::usage(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::usage(format!("Failed to flush export CSV: {e}")))
}
