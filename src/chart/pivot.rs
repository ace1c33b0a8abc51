//! Long observations -> (year x country) grid.

use std::collections::{BTreeMap, HashMap};

use crate::domain::Observation;

/// Years ascending and unique; countries in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotGrid {
    pub years: Vec<i32>,
    pub countries: Vec<String>,
    /// `cells[year_idx][country_idx]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotGrid {
    /// Pivot `(country, year, value)` triples. A duplicated (year, country) keeps its first value.
    pub fn from_triples<'a, I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, i32, Option<f64>)>,
    {
        let mut countries: Vec<String> = Vec::new();
        let mut country_idx: HashMap<String, usize> = HashMap::new();
        let mut by_year: BTreeMap<i32, HashMap<usize, Option<f64>>> = BTreeMap::new();

        for (country, year, value) in triples {
            let idx = *country_idx.entry(country.to_string()).or_insert_with(|| {
                countries.push(country.to_string());
                countries.len() - 1
            });
            by_year.entry(year).or_default().entry(idx).or_insert(value);
        }

        let years: Vec<i32> = by_year.keys().copied().collect();
        let cells = by_year
            .values()
            .map(|row| (0..countries.len()).map(|c| row.get(&c).copied().flatten()).collect())
            .collect();

        Self {
            years,
            countries,
            cells,
        }
    }

    pub fn from_observations<'a, I>(observations: I) -> Self
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        Self::from_triples(
            observations
                .into_iter()
                .map(|o| (o.country.as_str(), o.year, o.value)),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() || self.years.is_empty()
    }

    pub fn get(&self, year: i32, country: &str) -> Option<f64> {
        let y = self.years.binary_search(&year).ok()?;
        let c = self.countries.iter().position(|n| n == country)?;
        self.cells[y][c]
    }

    /// Column values for one country, aligned with `years`.
    pub fn column(&self, country_idx: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|row| row[country_idx]).collect()
    }

    /// Countries whose column holds no value at all.
    pub fn empty_countries(&self) -> Vec<String> {
        (0..self.countries.len())
            .filter(|&c| self.cells.iter().all(|row| row[c].is_none()))
            .map(|c| self.countries[c].clone())
            .collect()
    }

    /// Remove the given country columns.
    pub fn drop_countries(&mut self, drop: &[String]) {
        let keep: Vec<usize> = (0..self.countries.len())
            .filter(|&c| !drop.contains(&self.countries[c]))
            .collect();
        self.countries = keep.iter().map(|&c| self.countries[c].clone()).collect();
        for row in &mut self.cells {
            *row = keep.iter().map(|&c| row[c]).collect();
        }
        if self.countries.is_empty() {
            self.years.clear();
            self.cells.clear();
        }
    }

    /// Drop entirely-missing country columns and return their names.
    pub fn drop_empty_countries(&mut self) -> Vec<String> {
        let empty = self.empty_countries();
        if !empty.is_empty() {
            self.drop_countries(&empty);
        }
        empty
    }

    /// Keep only years where at least one country has a value.
    pub fn retain_years_with_data(&mut self) {
        let mut years = Vec::with_capacity(self.years.len());
        let mut cells = Vec::with_capacity(self.cells.len());
        for (year, row) in self.years.iter().zip(self.cells.iter()) {
            if row.iter().any(Option::is_some) {
                years.push(*year);
                cells.push(row.clone());
            }
        }
        self.years = years;
        self.cells = cells;
    }

    /// First year with any value.
    pub fn earliest_year_with_data(&self) -> Option<i32> {
        self.years
            .iter()
            .zip(self.cells.iter())
            .find(|(_, row)| row.iter().any(Option::is_some))
            .map(|(y, _)| *y)
    }

    pub fn latest_year_with_data(&self) -> Option<i32> {
        self.years
            .iter()
            .zip(self.cells.iter())
            .rev()
            .find(|(_, row)| row.iter().any(Option::is_some))
            .map(|(y, _)| *y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WideTable;
    use crate::reshape;

    #[test]
    fn pivot_sorts_years_and_keeps_first_duplicate() {
        let grid = PivotGrid::from_triples([
            ("France", 2021, Some(2.0)),
            ("France", 2020, Some(1.0)),
            ("Germany", 2020, Some(5.0)),
            ("France", 2020, Some(99.0)),
        ]);
        assert_eq!(grid.years, vec![2020, 2021]);
        assert_eq!(grid.countries, vec!["France", "Germany"]);
        assert_eq!(grid.get(2020, "France"), Some(1.0));
        assert_eq!(grid.get(2021, "Germany"), None);
    }

    #[test]
    fn drops_countries_without_any_value() {
        let mut grid = PivotGrid::from_triples([
            ("France", 2020, Some(2.6e12)),
            ("Germany", 2020, None),
        ]);
        let dropped = grid.drop_empty_countries();
        assert_eq!(dropped, vec!["Germany".to_string()]);
        assert_eq!(grid.countries, vec!["France"]);
        assert_eq!(grid.cells, vec![vec![Some(2.6e12)]]);
    }

    #[test]
    fn dropping_every_country_empties_the_grid() {
        let mut grid = PivotGrid::from_triples([("Germany", 2020, None)]);
        grid.drop_empty_countries();
        assert!(grid.is_empty());
    }

    #[test]
    fn retain_years_with_data_prunes_blank_rows() {
        let mut grid = PivotGrid::from_triples([
            ("France", 2019, None),
            ("France", 2020, Some(1.0)),
            ("France", 2021, None),
            ("France", 2022, Some(3.0)),
        ]);
        assert_eq!(grid.earliest_year_with_data(), Some(2020));
        assert_eq!(grid.latest_year_with_data(), Some(2022));
        grid.retain_years_with_data();
        assert_eq!(grid.years, vec![2020, 2022]);
    }

    #[test]
    fn melt_then_pivot_restores_non_missing_cells() {
        let mut wide = WideTable::with_columns(vec!["GDP (current US$)".into(), "Gini index".into()]);
        wide.set("France", "2019", 0, Some(2.7e12));
        wide.set("France", "2020", 0, Some(2.6e12));
        wide.set("France", "2020", 1, Some(31.2));
        wide.set("Chile", "2019", 1, Some(44.4));
        wide.set("Chile", "2020", 0, None);

        let tidy = reshape::tidy(&wide);
        for (col, label) in wide.columns.iter().enumerate() {
            let grid = PivotGrid::from_observations(tidy.rows.iter().filter(|o| &o.label == label));
            for row in &wide.rows {
                let year: i32 = row.date.parse().unwrap();
                assert_eq!(grid.get(year, &row.country), row.values[col], "{label} {row:?}");
            }
        }
    }
}
