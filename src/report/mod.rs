//! Formatted terminal output for the CLI.
//!
//! We keep formatting code in one place so:
//! - the fetching/reshaping code stays clean and testable
//! - output changes are localized (easy to snapshot-test)

use crate::app::pipeline::AnalysisOutput;
use crate::catalog::{self, Topic};
use crate::chart::{ChartPanel, PanelBody};
use crate::data::weo::WeoRelease;
use crate::domain::Country;
use crate::error::Notice;
use crate::plot::fmt_value;
use crate::projections::{ProjectionKind, Projections};

/// Format the analysis run: header, then one block per topic and panel.
pub fn format_analysis(output: &AnalysisOutput) -> String {
    let mut out = String::new();

    out.push_str("=== econ - Economic Dashboard ===\n");
    let countries: Vec<String> = output
        .countries
        .iter()
        .map(|c| format!("{} ({})", c.name, c.id))
        .collect();
    out.push_str(&format!("Countries: {}\n", countries.join(", ")));
    out.push_str(&format!("Years: {}-{}\n", output.range.start, output.range.end));
    out.push_str(&format!("Observations: n={}\n", output.tidy.rows.len()));

    for section in &output.sections {
        out.push_str(&format!("\n## {}\n", section.topic.label()));
        if section.panels.is_empty() {
            out.push_str("(no data for this topic)\n");
        }
        for panel in &section.panels {
            out.push_str(&format_panel(panel));
        }
    }

    out
}

/// Format a single chart panel (title line + latest value per country).
pub fn format_panel(panel: &ChartPanel) -> String {
    let mut out = String::new();
    let kind = match &panel.body {
        PanelBody::Chart(chart) => chart.kind.display_name(),
        PanelBody::Population(_) => "bar+line",
        PanelBody::NoData | PanelBody::MissingCompanion { .. } => "-",
    };
    out.push_str(&format!("\n{} [{}] ({kind})\n", panel.title, panel.code));

    match &panel.body {
        PanelBody::Chart(chart) => {
            out.push_str(&format!("  x: {}-{}\n", chart.x_range.0, chart.x_range.1));
            out.push_str(&latest_table(&chart.series, ""));
        }
        PanelBody::Population(chart) => {
            out.push_str(&format!("  x: {}-{}\n", chart.x_range.0, chart.x_range.1));
            out.push_str(&latest_table(&chart.totals, "total"));
            out.push_str(&latest_table(&chart.growth, "growth %"));
        }
        PanelBody::NoData | PanelBody::MissingCompanion { .. } => {}
    }

    for notice in panel.notices() {
        out.push_str(&format!("  {notice}\n"));
    }
    out
}

fn latest_table(series: &[crate::chart::CountrySeries], tag: &str) -> String {
    let mut out = String::new();
    for s in series {
        let Some((year, value)) = s.last_value() else {
            continue;
        };
        let line = format!(
            "  {:<28} {:>6} {:>12} {}",
            truncate(&s.country, 28),
            year,
            fmt_value(value),
            tag
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// One line per notice.
pub fn format_notices(notices: &[Notice]) -> String {
    notices.iter().map(|n| format!("{n}\n")).collect()
}

/// Format the projection table (one row per period).
pub fn format_projections(projections: &Projections, release: &WeoRelease) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== WEO projections: {} ({}) | release {} ===\n",
        projections.country,
        projections.iso,
        release.label()
    ));

    let mut header = format!("{:<6}", "year");
    let mut rule = format!("{:-<6}", "");
    for kind in ProjectionKind::ALL {
        header.push_str(&format!(" {:>10}", kind.key()));
        rule.push_str(&format!(" {:-<10}", ""));
    }
    out.push_str(&header);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for (year, cells) in projections.table() {
        let mut line = format!("{year:<6}");
        for cell in cells {
            let txt = cell.map(fmt_value).unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {txt:>10}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push('\n');
    for kind in ProjectionKind::ALL {
        out.push_str(&format!("{:<8} {}\n", kind.key(), kind.title()));
    }
    out
}

/// Format the indicator catalog grouped by topic.
pub fn format_catalog() -> String {
    let mut out = String::new();
    for topic in Topic::ALL {
        out.push_str(&format!("{}\n", topic.label()));
        for ind in catalog::for_topic(topic) {
            let rank = if catalog::is_rank(ind.code) { " (rank)" } else { "" };
            out.push_str(&format!("  {:<22} {}{rank}\n", ind.code, ind.name));
        }
    }
    out
}

/// Format the provider country list.
pub fn format_countries(countries: &[Country]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<6} {}\n", "id", "name"));
    out.push_str(&format!("{:-<6} {:-<40}\n", "", ""));
    for c in countries {
        out.push_str(&format!("{:<6} {}\n", c.id, truncate(&c.name, 60)));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
