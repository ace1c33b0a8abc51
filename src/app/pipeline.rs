//! Shared pipelines used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflows:
//! - analysis: fetch -> reshape -> chart panels
//! - projections: release download -> load -> country record -> derived series
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use tracing::info;

use crate::catalog;
use crate::chart::{self, TopicSection};
use crate::data::IndicatorSource;
use crate::data::weo::{self, ReleaseDownloader, WeoDataset, WeoRelease};
use crate::domain::{Country, FetchRequest, TidyTable, YearRange};
use crate::error::{AppError, Notice};
use crate::projections::{self, Projections};
use crate::reshape;

/// Countries pre-selected when nothing else is requested.
pub const DEFAULT_COUNTRIES: [&str; 2] = ["France", "United States"];

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub range: YearRange,
    pub countries: Vec<Country>,
    pub tidy: TidyTable,
    pub sections: Vec<TopicSection>,
    pub notices: Vec<Notice>,
}

/// Fetch every catalog indicator for `countries` and build the chart panels.
pub fn run_analysis<S: IndicatorSource + ?Sized>(
    source: &S,
    countries: &[Country],
    range: YearRange,
) -> Result<AnalysisOutput, AppError> {
    if countries.is_empty() {
        return Err(AppError::usage("Select at least one country."));
    }

    let request = FetchRequest::new(
        catalog::codes(),
        countries.iter().map(|c| c.id.clone()),
        range,
    );
    let table = source.fetch(&request)?;

    let mut notices: Vec<Notice> = table
        .warnings
        .iter()
        .map(|w| Notice::warning(format!("Indicator skipped: {w}")))
        .collect();

    if table.is_empty() {
        return Err(AppError::data("No data found for the selected parameters."));
    }

    let tidy = reshape::tidy(&table);
    notices.extend(reshape::notices(&tidy));

    let sections = chart::build_sections(&tidy, range.end);
    info!(
        countries = countries.len(),
        observations = tidy.rows.len(),
        panels = sections.iter().map(|s| s.panels.len()).sum::<usize>(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        range,
        countries: countries.to_vec(),
        tidy,
        sections,
        notices,
    })
}

/// Resolve user tokens (provider ids or names, case-insensitive) against the provider list.
pub fn resolve_countries(all: &[Country], wanted: &[String]) -> Result<Vec<Country>, AppError> {
    let mut out: Vec<Country> = Vec::new();
    for token in wanted {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let found = all
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(token) || c.name.eq_ignore_ascii_case(token))
            .ok_or_else(|| AppError::usage(format!("Unknown country '{token}'.")))?;
        if !out.contains(found) {
            out.push(found.clone());
        }
    }
    Ok(out)
}

/// Indices of the default selection within `all`.
pub fn default_selection(all: &[Country]) -> Vec<usize> {
    DEFAULT_COUNTRIES
        .iter()
        .filter_map(|name| all.iter().position(|c| c.name == *name))
        .collect()
}

/// A downloaded and parsed WEO release.
#[derive(Debug, Clone)]
pub struct LoadedRelease {
    pub release: WeoRelease,
    pub dataset: WeoDataset,
    pub notices: Vec<Notice>,
}

/// Download the most recent release of `year` and parse it.
pub fn load_latest_release<D: ReleaseDownloader + ?Sized>(
    downloader: &D,
    year: i32,
    target_month: u32,
    dir: &Path,
) -> Result<LoadedRelease, AppError> {
    let search = weo::find_latest_release(downloader, year, target_month, dir)?;
    let dataset = WeoDataset::load(&search.release.path)?;
    let mut notices = search.notices;
    notices.push(Notice::info(format!(
        "WEO data downloaded: {} (release {}).",
        search.release.path.display(),
        search.release.release
    )));
    Ok(LoadedRelease {
        release: search.release,
        dataset,
        notices,
    })
}

/// Derived projections for a country given by display name or ISO code.
pub fn country_projections(dataset: &WeoDataset, country: &str) -> Result<Projections, AppError> {
    let iso = match dataset.iso_for(country) {
        Ok(iso) => iso,
        Err(err) => dataset
            .countries()
            .into_iter()
            .find(|c| c.iso.eq_ignore_ascii_case(country))
            .map(|c| c.iso)
            .ok_or(err)?,
    };
    let record = dataset.country(&iso)?;
    projections::compute(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WideTable;

    struct FixedSource(WideTable);

    impl IndicatorSource for FixedSource {
        fn fetch(&self, _request: &FetchRequest) -> Result<WideTable, AppError> {
            Ok(self.0.clone())
        }

        fn countries(&self) -> Result<Vec<Country>, AppError> {
            Ok(countries())
        }
    }

    fn countries() -> Vec<Country> {
        vec![
            Country {
                id: "FRA".into(),
                name: "France".into(),
            },
            Country {
                id: "DEU".into(),
                name: "Germany".into(),
            },
            Country {
                id: "USA".into(),
                name: "United States".into(),
            },
        ]
    }

    #[test]
    fn analysis_builds_sections_and_collects_notices() {
        let mut wide = WideTable::with_columns(vec!["GDP (current US$)".into()]);
        wide.set("France", "2020", 0, Some(2.6e12));
        wide.set("Germany", "2020", 0, None);
        wide.warnings.push("Gini index: status 502".into());

        let out = run_analysis(
            &FixedSource(wide),
            &countries()[..2],
            YearRange::new(2020, 2020).unwrap(),
        )
        .unwrap();
        assert_eq!(out.sections.len(), catalog::Topic::ALL.len());
        assert_eq!(out.notices.len(), 1);
        let perf = &out.sections[1];
        assert_eq!(perf.panels.len(), 1);
        assert_eq!(perf.panels[0].excluded, vec!["Germany".to_string()]);
    }

    #[test]
    fn analysis_requires_countries_and_data() {
        let range = YearRange::new(2020, 2020).unwrap();
        let err = run_analysis(&FixedSource(WideTable::default()), &[], range).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = run_analysis(&FixedSource(WideTable::default()), &countries(), range).unwrap_err();
        assert!(err.to_string().contains("No data"));
    }

    #[test]
    fn resolve_by_id_or_name() {
        let all = countries();
        let got = resolve_countries(&all, &["fra".into(), "United States".into(), "FRA".into()]).unwrap();
        assert_eq!(got.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), vec!["FRA", "USA"]);
        assert!(resolve_countries(&all, &["Atlantis".into()]).is_err());
    }

    #[test]
    fn default_selection_finds_france_and_us() {
        assert_eq!(default_selection(&countries()), vec![0, 2]);
    }
}
