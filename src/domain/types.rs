//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during reshaping and charting
//! - exported to CSV
//! - used as exact-match cache keys

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::Serialize;

use crate::catalog::Indicator;
use crate::error::AppError;

/// First year offered by the year range selector.
pub const MIN_YEAR: i32 = 1960;

/// Calendar year of the local clock; upper bound of the year selector.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// A provider country (or aggregate) entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Country {
    /// Provider id, e.g. `FRA`.
    pub id: String,
    pub name: String,
}

/// Inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::usage(format!(
                "End year must be greater than or equal to start year (got {start}..{end})."
            )));
        }
        Ok(Self { start, end })
    }
}

/// The exact input tuple of an indicator fetch. Also the memoization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub codes: Vec<String>,
    pub countries: Vec<String>,
    pub start_year: String,
    pub end_year: String,
}

impl FetchRequest {
    pub fn new<C, I>(codes: C, countries: I, range: YearRange) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            countries: countries.into_iter().map(Into::into).collect(),
            start_year: range.start.to_string(),
            end_year: range.end.to_string(),
        }
    }
}

/// One row of a wide table: a (country, date) key plus one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub country: String,
    /// Provider date string, kept raw until the reshape step coerces it.
    pub date: String,
    pub values: Vec<Option<f64>>,
}

/// Rectangular provider result: rows = country x date, columns = indicator labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
    /// Indicators that failed to fetch and were skipped.
    pub warnings: Vec<String>,
    /// (country, date) -> position in `rows`.
    index: HashMap<(String, String), usize>,
}

impl WideTable {
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            warnings: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Number of cells holding a value.
    pub fn value_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.values.iter().filter(|v| v.is_some()).count())
            .sum()
    }

    /// Set a cell, creating the (country, date) row if needed.
    pub fn set(&mut self, country: &str, date: &str, column: usize, value: Option<f64>) {
        let width = self.columns.len();
        let key = (country.to_string(), date.to_string());
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.rows.push(WideRow {
                    country: key.0.clone(),
                    date: key.1.clone(),
                    values: vec![None; width],
                });
                let idx = self.rows.len() - 1;
                self.index.insert(key, idx);
                idx
            }
        };
        if let Some(cell) = self.rows[idx].values.get_mut(column) {
            *cell = value;
        }
    }
}

/// One tidy cell: (country, year, indicator, value).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub country: String,
    pub year: i32,
    /// Column label as served by the provider.
    pub label: String,
    /// Catalog entry the label joined to, if any.
    #[serde(skip)]
    pub indicator: Option<&'static Indicator>,
    pub value: Option<f64>,
}

impl Observation {
    pub fn code(&self) -> Option<&'static str> {
        self.indicator.map(|i| i.code)
    }
}

/// Output of the reshape pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTable {
    pub rows: Vec<Observation>,
    /// Distinct labels that did not join to a catalog topic (first-seen order).
    pub unmatched_labels: Vec<String>,
    /// Rows dropped because their date did not parse as a year.
    pub dropped_dates: usize,
}

impl TidyTable {
    pub fn for_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.rows.iter().filter(move |o| o.code() == Some(code))
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.for_code(code).next().is_some()
    }
}

/// A numeric series indexed by year (ascending, unique by construction).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearSeries(BTreeMap<i32, f64>);

impl YearSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, year: i32, value: f64) {
        self.0.insert(year, value);
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.0.get(&year).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().map(|(&y, &v)| (y, v))
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.0.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.0.keys().next_back().copied()
    }

    /// Apply `f` to every value; non-finite results are dropped.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.iter()
            .filter_map(|(y, v)| finite(f(v)).map(|v| (y, v)))
            .collect()
    }

    /// Combine two series on the years both define; non-finite results are dropped.
    pub fn zip_with(&self, other: &YearSeries, f: impl Fn(f64, f64) -> f64) -> Self {
        self.iter()
            .filter_map(|(y, a)| {
                let b = other.get(y)?;
                finite(f(a, b)).map(|v| (y, v))
            })
            .collect()
    }

    /// Chain percentage growth rates into an index: `base * prod(1 + g/100)`.
    pub fn growth_index(&self, base: f64) -> Self {
        let mut level = 1.0;
        let mut out = YearSeries::new();
        for (year, growth) in self.iter() {
            level *= 1.0 + growth / 100.0;
            out.insert(year, level * base);
        }
        out
    }
}

impl FromIterator<(i32, f64)> for YearSeries {
    fn from_iter<T: IntoIterator<Item = (i32, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn finite(v: f64) -> Option<f64> {
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_rejects_reversed_bounds() {
        assert!(YearRange::new(2000, 1999).is_err());
        let r = YearRange::new(2000, 2000).unwrap();
        assert_eq!((r.start, r.end), (2000, 2000));
    }

    #[test]
    fn fetch_request_is_an_exact_key() {
        let range = YearRange::new(2000, 2010).unwrap();
        let a = FetchRequest::new(["NY.GDP.MKTP.CD"], ["FRA", "USA"], range);
        let b = FetchRequest::new(["NY.GDP.MKTP.CD"], ["FRA", "USA"], range);
        let c = FetchRequest::new(["NY.GDP.MKTP.CD"], ["USA", "FRA"], range);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.start_year, "2000");
    }

    #[test]
    fn year_series_zip_uses_common_years_and_drops_non_finite() {
        let a: YearSeries = [(2020, 10.0), (2021, 20.0), (2022, 30.0)].into_iter().collect();
        let b: YearSeries = [(2021, 4.0), (2022, 0.0), (2023, 1.0)].into_iter().collect();
        let ratio = a.zip_with(&b, |x, y| x / y);
        assert_eq!(ratio.iter().collect::<Vec<_>>(), vec![(2021, 5.0)]);
    }

    #[test]
    fn growth_index_compounds() {
        let g: YearSeries = [(2020, 10.0), (2021, -10.0)].into_iter().collect();
        let idx = g.growth_index(100.0);
        assert!((idx.get(2020).unwrap() - 110.0).abs() < 1e-9);
        assert!((idx.get(2021).unwrap() - 99.0).abs() < 1e-9);
    }

    #[test]
    fn wide_table_set_creates_rows_once() {
        let mut t = WideTable::with_columns(vec!["A".into(), "B".into()]);
        t.set("France", "2020", 0, Some(1.0));
        t.set("France", "2020", 1, Some(2.0));
        t.set("Germany", "2020", 1, None);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].values, vec![Some(1.0), Some(2.0)]);
        assert_eq!(t.value_count(), 2);
    }

    #[test]
    fn wide_table_set_scales_to_a_full_fetch() {
        let labels: Vec<String> = (0..45).map(|i| format!("Indicator {i}")).collect();
        let mut t = WideTable::with_columns(labels);
        for column in 0..45 {
            for country in 0..150 {
                for year in 1960..2026 {
                    t.set(&format!("C{country}"), &year.to_string(), column, Some(1.0));
                }
            }
        }
        assert_eq!(t.rows.len(), 150 * 66);
        assert_eq!(t.value_count(), 150 * 66 * 45);
        t.set("C0", "1960", 0, None);
        assert_eq!(t.rows.len(), 150 * 66);
        assert_eq!(t.rows[0].values[0], None);
    }
}
