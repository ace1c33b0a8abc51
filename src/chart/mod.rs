//! Chart builder: tidy observations -> per-topic chart panels.
//!
//! For each topic (catalog order) and each of its indicators present in the
//! data, the observations are pivoted to a (year x country) grid, countries
//! without any value are dropped, and a chart shape is chosen:
//!
//! - rank indicators -> grouped bars (lower is better, values kept as-is)
//! - everything else -> one line per country
//! - population total + growth -> a single dual-axis bar/line chart

use serde::Serialize;
use tracing::debug;

use crate::catalog::{self, Indicator, POPULATION_GROWTH, POPULATION_TOTAL, Topic};
use crate::domain::{Observation, TidyTable};
use crate::error::Notice;

pub mod pivot;

pub use pivot::PivotGrid;

pub const POPULATION_TITLE: &str = "Total Population and Population Growth";

pub const POPULATION_DESCRIPTION: &str = "Total population is the number of inhabitants at a given time. It drives \
the size of the labor market, the demand for goods and services, and infrastructure planning.\n\
Population growth is the yearly rate at which the population rises or falls. Positive growth can signal economic \
expansion but also pressure on resources and public services; negative growth can point to an ageing population.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Line,
    Bar,
}

impl ChartKind {
    pub fn for_code(code: &str) -> Self {
        if catalog::is_rank(code) {
            ChartKind::Bar
        } else {
            ChartKind::Line
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
        }
    }
}

/// One country's values aligned with the chart's years (ascending, unique).
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    pub country: String,
    pub points: Vec<(i32, Option<f64>)>,
}

impl CountrySeries {
    /// Contiguous runs of present values, so gaps are not bridged by a line.
    pub fn segments(&self) -> Vec<Vec<(i32, f64)>> {
        let mut out = Vec::new();
        let mut current = Vec::new();
        for &(year, value) in &self.points {
            match value {
                Some(v) => current.push((year, v)),
                None if !current.is_empty() => out.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
        out
    }

    pub fn present(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.points.iter().filter_map(|&(y, v)| v.map(|v| (y, v)))
    }

    pub fn last_value(&self) -> Option<(i32, f64)> {
        self.present().last()
    }
}

fn series_from_grid(grid: &PivotGrid) -> Vec<CountrySeries> {
    grid.countries
        .iter()
        .enumerate()
        .map(|(c, country)| CountrySeries {
            country: country.clone(),
            points: grid.years.iter().copied().zip(grid.column(c)).collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorChart {
    pub kind: ChartKind,
    /// Years with at least one value (bar categories).
    pub years: Vec<i32>,
    pub series: Vec<CountrySeries>,
    /// `(earliest year with data, requested end year)`.
    pub x_range: (i32, i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationChart {
    pub years: Vec<i32>,
    /// Bars on the primary axis.
    pub totals: Vec<CountrySeries>,
    /// Lines on the secondary axis (annual %).
    pub growth: Vec<CountrySeries>,
    pub x_range: (i32, i32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    Chart(IndicatorChart),
    Population(PopulationChart),
    /// Nothing left to plot after excluding countries without data.
    NoData,
    /// The population chart needs a companion indicator that has no observations.
    MissingCompanion { missing: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub title: String,
    pub code: &'static str,
    pub body: PanelBody,
    /// Countries dropped because they have no value for this panel.
    pub excluded: Vec<String>,
    pub description: &'static str,
}

impl ChartPanel {
    pub fn notices(&self) -> Vec<Notice> {
        let mut out = Vec::new();
        if !self.excluded.is_empty() {
            out.push(Notice::info(format!(
                "For '{}', the following countries were excluded for lack of data: {}.",
                self.title,
                self.excluded.join(", ")
            )));
        }
        match &self.body {
            PanelBody::NoData => out.push(Notice::info(
                "No data available for the selected countries after excluding countries without data.",
            )),
            PanelBody::MissingCompanion { missing } => out.push(Notice::warning(format!(
                "The indicator '{missing}' is missing."
            ))),
            PanelBody::Chart(_) | PanelBody::Population(_) => {}
        }
        out
    }

    pub fn has_chart(&self) -> bool {
        matches!(self.body, PanelBody::Chart(_) | PanelBody::Population(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicSection {
    pub topic: Topic,
    /// Empty when the topic has no observations at all.
    pub panels: Vec<ChartPanel>,
}

/// Build every topic section, in catalog order.
pub fn build_sections(tidy: &TidyTable, end_year: i32) -> Vec<TopicSection> {
    let population_combined = tidy.has_code(POPULATION_TOTAL);

    Topic::ALL
        .iter()
        .map(|&topic| {
            let mut panels = Vec::new();
            for indicator in catalog::for_topic(topic) {
                if !tidy.has_code(indicator.code) {
                    continue;
                }
                if indicator.code == POPULATION_GROWTH && population_combined {
                    continue;
                }
                let panel = if indicator.code == POPULATION_TOTAL {
                    build_population_panel(tidy, indicator, end_year)
                } else {
                    build_indicator_panel(tidy, indicator, end_year)
                };
                panels.push(panel);
            }
            debug!(topic = %topic, panels = panels.len(), "topic built");
            TopicSection { topic, panels }
        })
        .collect()
}

/// Single-indicator panel: bar for rank indicators, line otherwise.
pub fn build_indicator_panel(tidy: &TidyTable, indicator: &'static Indicator, end_year: i32) -> ChartPanel {
    let mut grid = PivotGrid::from_observations(tidy.for_code(indicator.code));
    let excluded = grid.drop_empty_countries();

    let body = if grid.is_empty() {
        PanelBody::NoData
    } else {
        grid.retain_years_with_data();
        let earliest = grid.years.first().copied().unwrap_or(end_year);
        PanelBody::Chart(IndicatorChart {
            kind: ChartKind::for_code(indicator.code),
            years: grid.years.clone(),
            series: series_from_grid(&grid),
            x_range: (earliest, end_year.max(earliest)),
        })
    };

    ChartPanel {
        title: indicator.name.to_string(),
        code: indicator.code,
        body,
        excluded,
        description: indicator.description_or_default(),
    }
}

/// Dual-axis population panel (total as bars, growth % as lines).
///
/// Both indicators are inner-joined on (country, year); a country missing
/// entirely from either side is excluded from both.
pub fn build_population_panel(tidy: &TidyTable, total_ind: &'static Indicator, end_year: i32) -> ChartPanel {
    let growth_label = catalog::by_code(POPULATION_GROWTH)
        .map(|i| i.name)
        .unwrap_or("Population growth");

    let mut panel = ChartPanel {
        title: POPULATION_TITLE.to_string(),
        code: total_ind.code,
        body: PanelBody::NoData,
        excluded: Vec::new(),
        description: POPULATION_DESCRIPTION,
    };

    let growth_rows: Vec<&Observation> = tidy.for_code(POPULATION_GROWTH).collect();
    if growth_rows.is_empty() {
        panel.body = PanelBody::MissingCompanion { missing: growth_label };
        return panel;
    }

    let joined: Vec<(&str, i32, Option<f64>, Option<f64>)> = tidy
        .for_code(total_ind.code)
        .filter_map(|t| {
            growth_rows
                .iter()
                .find(|g| g.country == t.country && g.year == t.year)
                .map(|g| (t.country.as_str(), t.year, t.value, g.value))
        })
        .collect();

    let mut totals = PivotGrid::from_triples(joined.iter().map(|&(c, y, t, _)| (c, y, t)));
    let mut growth = PivotGrid::from_triples(joined.iter().map(|&(c, y, _, g)| (c, y, g)));

    let mut excluded = totals.empty_countries();
    for country in growth.empty_countries() {
        if !excluded.contains(&country) {
            excluded.push(country);
        }
    }
    totals.drop_countries(&excluded);
    growth.drop_countries(&excluded);
    panel.excluded = excluded;

    if totals.is_empty() && growth.is_empty() {
        return panel;
    }

    let earliest = [totals.earliest_year_with_data(), growth.earliest_year_with_data()]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(end_year);

    panel.body = PanelBody::Population(PopulationChart {
        years: totals.years.clone(),
        totals: series_from_grid(&totals),
        growth: series_from_grid(&growth),
        x_range: (earliest, end_year.max(earliest)),
    });
    panel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WideTable;
    use crate::reshape;

    fn tidy_from(cells: &[(&str, &str, &str, Option<f64>)]) -> TidyTable {
        let mut labels: Vec<String> = Vec::new();
        for (_, _, code, _) in cells {
            let label = catalog::by_code(code).unwrap().name.to_string();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        let mut wide = WideTable::with_columns(labels.clone());
        for (country, date, code, value) in cells {
            let label = catalog::by_code(code).unwrap().name;
            let col = labels.iter().position(|l| l == label).unwrap();
            wide.set(country, date, col, *value);
        }
        reshape::tidy(&wide)
    }

    fn only_chart(panel: &ChartPanel) -> &IndicatorChart {
        match &panel.body {
            PanelBody::Chart(c) => c,
            other => panic!("expected chart, got {other:?}"),
        }
    }

    #[test]
    fn rank_codes_select_bars_everything_else_lines() {
        for ind in catalog::all() {
            let expected = if catalog::RANK_INDICATORS.contains(&ind.code) {
                ChartKind::Bar
            } else {
                ChartKind::Line
            };
            assert_eq!(ChartKind::for_code(ind.code), expected, "{}", ind.code);
        }
        assert_eq!(ChartKind::for_code("NOT.A.CODE"), ChartKind::Line);
    }

    #[test]
    fn germany_without_gdp_is_dropped_from_the_chart() {
        let tidy = tidy_from(&[
            ("France", "2020", "NY.GDP.MKTP.CD", Some(2.6e12)),
            ("Germany", "2020", "NY.GDP.MKTP.CD", None),
        ]);
        let ind = catalog::by_code("NY.GDP.MKTP.CD").unwrap();
        let panel = build_indicator_panel(&tidy, ind, 2020);
        assert_eq!(panel.excluded, vec!["Germany".to_string()]);
        let chart = only_chart(&panel);
        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].country, "France");
        assert_eq!(chart.series[0].points, vec![(2020, Some(2.6e12))]);
        assert_eq!(panel.notices().len(), 1);
    }

    #[test]
    fn all_missing_indicator_yields_no_data() {
        let tidy = tidy_from(&[("France", "2020", "SI.POV.GINI", None)]);
        let panel = build_indicator_panel(&tidy, catalog::by_code("SI.POV.GINI").unwrap(), 2020);
        assert_eq!(panel.body, PanelBody::NoData);
        assert!(!panel.has_chart());
    }

    #[test]
    fn rank_panel_uses_years_with_data_and_raw_ranks() {
        let tidy = tidy_from(&[
            ("France", "2018", "IC.BUS.EASE.XQ", Some(32.0)),
            ("France", "2019", "IC.BUS.EASE.XQ", None),
            ("France", "2020", "IC.BUS.EASE.XQ", Some(31.0)),
            ("Chile", "2020", "IC.BUS.EASE.XQ", Some(59.0)),
        ]);
        let panel = build_indicator_panel(&tidy, catalog::by_code("IC.BUS.EASE.XQ").unwrap(), 2022);
        let chart = only_chart(&panel);
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.years, vec![2018, 2020]);
        assert_eq!(chart.x_range, (2018, 2022));
        assert_eq!(chart.series[1].points, vec![(2018, None), (2020, Some(59.0))]);
    }

    #[test]
    fn rendered_series_never_contain_all_missing_countries() {
        let tidy = tidy_from(&[
            ("France", "2019", "FP.CPI.TOTL.ZG", Some(1.1)),
            ("Peru", "2019", "FP.CPI.TOTL.ZG", None),
            ("Peru", "2020", "FP.CPI.TOTL.ZG", None),
            ("Chile", "2020", "FP.CPI.TOTL.ZG", Some(3.0)),
        ]);
        for section in build_sections(&tidy, 2020) {
            for panel in &section.panels {
                if let PanelBody::Chart(chart) = &panel.body {
                    for s in &chart.series {
                        assert!(s.present().next().is_some(), "{} has no values", s.country);
                    }
                    assert!(chart.series.iter().all(|s| s.country != "Peru"));
                }
            }
        }
    }

    #[test]
    fn population_pair_is_combined_and_growth_not_repeated() {
        let tidy = tidy_from(&[
            ("France", "2019", "SP.POP.TOTL", Some(67.0e6)),
            ("France", "2020", "SP.POP.TOTL", Some(67.3e6)),
            ("France", "2019", "SP.POP.GROW", Some(0.3)),
            ("France", "2020", "SP.POP.GROW", Some(0.25)),
            ("Chad", "2020", "SP.POP.TOTL", Some(16.0e6)),
            ("Chad", "2020", "SP.POP.GROW", None),
        ]);
        let sections = build_sections(&tidy, 2021);
        let social = sections.iter().find(|s| s.topic == Topic::Social).unwrap();
        assert_eq!(social.panels.len(), 1);

        let panel = &social.panels[0];
        assert_eq!(panel.title, POPULATION_TITLE);
        assert_eq!(panel.excluded, vec!["Chad".to_string()]);
        let PanelBody::Population(chart) = &panel.body else {
            panic!("expected population chart");
        };
        assert_eq!(chart.years, vec![2019, 2020]);
        assert_eq!(chart.totals.len(), 1);
        assert_eq!(chart.growth[0].points[1], (2020, Some(0.25)));
        assert_eq!(chart.x_range, (2019, 2021));
    }

    #[test]
    fn population_without_growth_warns() {
        let tidy = tidy_from(&[("France", "2020", "SP.POP.TOTL", Some(67.3e6))]);
        let panel = build_population_panel(&tidy, catalog::by_code(POPULATION_TOTAL).unwrap(), 2020);
        assert!(matches!(panel.body, PanelBody::MissingCompanion { .. }));
        assert!(panel.notices()[0].message.contains("Population growth"));
    }

    #[test]
    fn growth_alone_renders_as_a_line() {
        let tidy = tidy_from(&[("France", "2020", "SP.POP.GROW", Some(0.25))]);
        let sections = build_sections(&tidy, 2020);
        let social = sections.iter().find(|s| s.topic == Topic::Social).unwrap();
        assert_eq!(social.panels.len(), 1);
        assert_eq!(only_chart(&social.panels[0]).kind, ChartKind::Line);
    }

    #[test]
    fn topics_without_observations_have_no_panels() {
        let tidy = tidy_from(&[("France", "2020", "GE.EST", Some(1.2))]);
        let sections = build_sections(&tidy, 2020);
        assert_eq!(sections.len(), Topic::ALL.len());
        for s in &sections {
            let expected = usize::from(s.topic == Topic::Governance);
            assert_eq!(s.panels.len(), expected, "{}", s.topic);
        }
    }

    #[test]
    fn segments_split_on_gaps() {
        let s = CountrySeries {
            country: "France".into(),
            points: vec![(2018, Some(1.0)), (2019, None), (2020, Some(2.0)), (2021, Some(3.0))],
        };
        assert_eq!(s.segments(), vec![vec![(2018, 1.0)], vec![(2020, 2.0), (2021, 3.0)]]);
        assert_eq!(s.last_value(), Some((2021, 3.0)));
    }
}
