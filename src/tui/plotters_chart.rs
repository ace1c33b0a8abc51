//! Plotters-powered chart widget for Ratatui.
//!
//! One widget covers every chart shape the dashboard needs:
//! - one line per country (gaps are not bridged)
//! - grouped bars per year
//! - bars on the left axis with lines on a right-hand secondary axis
//! - dashed reference lines (current year, zero)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::chart::{ChartKind, ChartPanel, CountrySeries, PanelBody};
use crate::domain::YearSeries;
use crate::projections::ProjectionKind;

/// Qualitative palette assigned to countries in order.
const PALETTE: [(u8, u8, u8); 10] = [
    (0x63, 0x6E, 0xFA),
    (0xEF, 0x55, 0x3B),
    (0x00, 0xCC, 0x96),
    (0xAB, 0x63, 0xFA),
    (0xFF, 0xA1, 0x5A),
    (0x19, 0xD3, 0xF3),
    (0xFF, 0x66, 0x92),
    (0xB6, 0xE8, 0x80),
    (0xFF, 0x97, 0xFF),
    (0xFE, 0xCB, 0x52),
];

const REFERENCE_COLOR: RGBColor = RGBColor(150, 150, 150);

fn palette(i: usize) -> (u8, u8, u8) {
    PALETTE[i % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLine {
    pub label: String,
    pub color: (u8, u8, u8),
    pub segments: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBars {
    pub label: String,
    pub color: (u8, u8, u8),
    pub points: Vec<(f64, f64)>,
}

/// Render-ready chart description; all bounds are computed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub lines: Vec<ChartLine>,
    pub bars: Vec<ChartBars>,
    /// Lines plotted against the right-hand axis.
    pub secondary: Vec<ChartLine>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y2_bounds: Option<[f64; 2]>,
    pub vline: Option<f64>,
    pub hline: Option<f64>,
}

impl ChartData {
    /// Chart for an analysis panel, or `None` when the panel has nothing to draw.
    pub fn from_panel(panel: &ChartPanel) -> Option<Self> {
        match &panel.body {
            PanelBody::Chart(chart) => {
                let x_bounds = year_bounds(chart.x_range, chart.kind == ChartKind::Bar);
                let values = chart.series.iter().flat_map(|s| s.present().map(|(_, v)| v));
                let (lines, bars) = match chart.kind {
                    ChartKind::Line => (lines_of(&chart.series), Vec::new()),
                    ChartKind::Bar => (Vec::new(), bars_of(&chart.series)),
                };
                Some(Self {
                    y_bounds: value_bounds(values, chart.kind == ChartKind::Bar),
                    lines,
                    bars,
                    secondary: Vec::new(),
                    x_bounds,
                    y2_bounds: None,
                    vline: None,
                    hline: None,
                })
            }
            PanelBody::Population(chart) => {
                let totals = chart.totals.iter().flat_map(|s| s.present().map(|(_, v)| v));
                let growth = chart.growth.iter().flat_map(|s| s.present().map(|(_, v)| v));
                Some(Self {
                    lines: Vec::new(),
                    bars: bars_of(&chart.totals),
                    secondary: lines_of(&chart.growth),
                    x_bounds: year_bounds(chart.x_range, true),
                    y_bounds: value_bounds(totals, true),
                    y2_bounds: Some(value_bounds(growth, true)),
                    vline: None,
                    hline: None,
                })
            }
            PanelBody::NoData | PanelBody::MissingCompanion { .. } => None,
        }
    }

    /// Single-series projection chart with the current-year and zero markers.
    pub fn from_projection(kind: ProjectionKind, series: &YearSeries, marker_year: i32) -> Self {
        let points: Vec<(f64, f64)> = series.iter().map(|(y, v)| (f64::from(y), v)).collect();
        let x_range = match (series.first_year(), series.last_year()) {
            (Some(a), Some(b)) => (a, b),
            _ => (marker_year, marker_year),
        };
        Self {
            y_bounds: value_bounds(points.iter().map(|p| p.1), false),
            lines: vec![ChartLine {
                label: kind.key().to_string(),
                color: kind.color(),
                segments: vec![points],
            }],
            bars: Vec::new(),
            secondary: Vec::new(),
            x_bounds: year_bounds(x_range, false),
            y2_bounds: None,
            vline: Some(f64::from(marker_year)),
            hline: Some(0.0),
        }
    }

    /// Colored legend entries (one per country or series).
    pub fn legend(&self) -> Line<'static> {
        let mut spans = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        let entries = self
            .bars
            .iter()
            .map(|b| (b.label.as_str(), b.color))
            .chain(self.lines.iter().chain(&self.secondary).map(|l| (l.label.as_str(), l.color)));
        for (label, (r, g, b)) in entries {
            if seen.contains(&label) {
                continue;
            }
            seen.push(label);
            spans.push(Span::styled("■ ", Style::default().fg(Color::Rgb(r, g, b))));
            spans.push(Span::raw(format!("{label}  ")));
        }
        Line::from(spans)
    }
}

fn lines_of(series: &[CountrySeries]) -> Vec<ChartLine> {
    series
        .iter()
        .enumerate()
        .map(|(i, s)| ChartLine {
            label: s.country.clone(),
            color: palette(i),
            segments: s
                .segments()
                .into_iter()
                .map(|seg| seg.into_iter().map(|(y, v)| (f64::from(y), v)).collect())
                .collect(),
        })
        .collect()
}

fn bars_of(series: &[CountrySeries]) -> Vec<ChartBars> {
    series
        .iter()
        .enumerate()
        .map(|(i, s)| ChartBars {
            label: s.country.clone(),
            color: palette(i),
            points: s.present().map(|(y, v)| (f64::from(y), v)).collect(),
        })
        .collect()
}

/// X bounds in years; bar charts get half a slot of room on each side.
fn year_bounds((lo, hi): (i32, i32), bars: bool) -> [f64; 2] {
    let (lo, hi) = (f64::from(lo), f64::from(hi));
    if bars || hi <= lo {
        [lo - 0.5, hi + 0.5]
    } else {
        [lo, hi]
    }
}

/// Padded value bounds, optionally forced to include zero (bar baselines).
fn value_bounds(values: impl Iterator<Item = f64>, include_zero: bool) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let pad = ((hi - lo) * 0.05).max(1e-12);
    [lo - pad, hi + pad]
}

/// Compact tick label: `1.2B`, `67.4M`, `3.5k`, `2.1`.
pub fn fmt_tick(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.1}")
    }
}

/// Every other piece of a segment split in `pieces` parts.
fn dashes(from: (f64, f64), to: (f64, f64), pieces: usize) -> Vec<[(f64, f64); 2]> {
    let at = |u: f64| (from.0 + (to.0 - from.0) * u, from.1 + (to.1 - from.1) * u);
    (0..pieces)
        .step_by(2)
        .map(|i| {
            let u0 = i as f64 / pieces as f64;
            let u1 = (i + 1) as f64 / pieces as f64;
            [at(u0), at(u1)]
        })
        .collect()
}

/// Grouped bar rectangles: each year slot is shared by `groups` bars.
fn bar_rects(points: &[(f64, f64)], group: usize, groups: usize, base: f64) -> Vec<[(f64, f64); 2]> {
    let width = 0.8 / groups.max(1) as f64;
    points
        .iter()
        .map(|&(x, v)| {
            let left = x - 0.4 + group as f64 * width;
            [(left, base), (left + width, v)]
        })
        .collect()
}

pub struct PanelChart<'a> {
    pub data: &'a ChartData,
}

impl Widget for PanelChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let data = self.data;
        let [x0, x1] = data.x_bounds;
        let [y0, y1] = data.y_bounds;
        let [s0, s1] = data.y2_bounds.unwrap_or(data.y_bounds);
        let finite = [x0, x1, y0, y1, s0, s1].iter().all(|v| v.is_finite());
        if !finite || x1 <= x0 || y1 <= y0 || s1 <= s0 {
            return;
        }
        let right_area = if data.y2_bounds.is_some() { 7 } else { 0 };

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .set_label_area_size(LabelAreaPosition::Right, right_area)
                .build_cartesian_2d(x0..x1, y0..y1)?
                .set_secondary_coord(x0..x1, s0..s1);

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| fmt_tick(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            if data.y2_bounds.is_some() {
                chart
                    .configure_secondary_axes()
                    .y_labels(5)
                    .y_label_formatter(&|v| fmt_tick(*v))
                    .label_style(("sans-serif", 10).into_font().color(&WHITE))
                    .axis_style(&WHITE)
                    .draw()?;
            }

            // Reference lines go first so data is drawn on top.
            if let Some(y) = data.hline.filter(|y| (y0..=y1).contains(y)) {
                chart.draw_series(
                    dashes((x0, y), (x1, y), 40)
                        .into_iter()
                        .map(|seg| PathElement::new(seg.to_vec(), &REFERENCE_COLOR)),
                )?;
            }
            if let Some(x) = data.vline.filter(|x| (x0..=x1).contains(x)) {
                chart.draw_series(
                    dashes((x, y0), (x, y1), 20)
                        .into_iter()
                        .map(|seg| PathElement::new(seg.to_vec(), &REFERENCE_COLOR)),
                )?;
            }

            let base = 0.0_f64.clamp(y0, y1);
            let groups = data.bars.len();
            for (group, bars) in data.bars.iter().enumerate() {
                let color = RGBColor(bars.color.0, bars.color.1, bars.color.2);
                chart.draw_series(
                    bar_rects(&bars.points, group, groups, base)
                        .into_iter()
                        .map(|corners| Rectangle::new(corners, color.filled())),
                )?;
            }

            for line in &data.lines {
                let color = RGBColor(line.color.0, line.color.1, line.color.2);
                for segment in &line.segments {
                    if let [only] = segment.as_slice() {
                        chart.draw_series(std::iter::once(Pixel::new(*only, color)))?;
                    } else {
                        chart.draw_series(LineSeries::new(segment.iter().copied(), &color))?;
                    }
                }
            }

            for line in &data.secondary {
                let color = RGBColor(line.color.0, line.color.1, line.color.2);
                for segment in &line.segments {
                    if let [only] = segment.as_slice() {
                        chart.draw_secondary_series(std::iter::once(Pixel::new(*only, color)))?;
                    } else {
                        chart.draw_secondary_series(LineSeries::new(segment.iter().copied(), &color))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{IndicatorChart, PopulationChart};

    fn series(country: &str, points: &[(i32, Option<f64>)]) -> CountrySeries {
        CountrySeries {
            country: country.to_string(),
            points: points.to_vec(),
        }
    }

    fn panel(body: PanelBody) -> ChartPanel {
        ChartPanel {
            title: "t".to_string(),
            code: "X",
            body,
            excluded: Vec::new(),
            description: "",
        }
    }

    #[test]
    fn line_panel_keeps_gaps_and_requested_end() {
        let p = panel(PanelBody::Chart(IndicatorChart {
            kind: ChartKind::Line,
            years: vec![2000, 2002],
            series: vec![series("France", &[(2000, Some(1.0)), (2001, None), (2002, Some(3.0))])],
            x_range: (2000, 2005),
        }));
        let data = ChartData::from_panel(&p).unwrap();
        assert_eq!(data.x_bounds, [2000.0, 2005.0]);
        assert_eq!(data.lines[0].segments.len(), 2);
        assert!(data.bars.is_empty());
        assert!(data.y_bounds[0] < 1.0 && data.y_bounds[1] > 3.0);
    }

    #[test]
    fn bar_panel_includes_zero_baseline() {
        let p = panel(PanelBody::Chart(IndicatorChart {
            kind: ChartKind::Bar,
            years: vec![2019],
            series: vec![
                series("France", &[(2019, Some(32.0))]),
                series("Chile", &[(2019, Some(59.0))]),
            ],
            x_range: (2019, 2019),
        }));
        let data = ChartData::from_panel(&p).unwrap();
        assert_eq!(data.bars.len(), 2);
        assert!(data.y_bounds[0] <= 0.0);
        assert_eq!(data.x_bounds, [2018.5, 2019.5]);
        assert_ne!(data.bars[0].color, data.bars[1].color);
    }

    #[test]
    fn population_panel_uses_secondary_axis() {
        let p = panel(PanelBody::Population(PopulationChart {
            years: vec![2020],
            totals: vec![series("France", &[(2020, Some(67.0e6))])],
            growth: vec![series("France", &[(2020, Some(0.3))])],
            x_range: (2020, 2021),
        }));
        let data = ChartData::from_panel(&p).unwrap();
        assert_eq!(data.bars.len(), 1);
        assert_eq!(data.secondary.len(), 1);
        assert!(data.y2_bounds.is_some_and(|[lo, hi]| lo <= 0.0 && hi > 0.3));
        // Same country, same color, listed once.
        assert_eq!(data.legend().spans.len(), 2);
    }

    #[test]
    fn bar_and_secondary_charts_render_into_a_buffer() {
        let p = panel(PanelBody::Population(PopulationChart {
            years: vec![2019, 2020],
            totals: vec![
                series("France", &[(2019, Some(66.8e6)), (2020, Some(67.0e6))]),
                series("Chile", &[(2019, Some(19.0e6)), (2020, Some(19.3e6))]),
            ],
            growth: vec![series("France", &[(2019, Some(0.2)), (2020, Some(0.3))])],
            x_range: (2019, 2020),
        }));
        let data = ChartData::from_panel(&p).unwrap();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        PanelChart { data: &data }.render(area, &mut buf);
        assert!(buf.content().iter().any(|cell| cell.symbol() != " "));

        let tiny = Rect::new(0, 0, 10, 3);
        let mut small = Buffer::empty(tiny);
        PanelChart { data: &data }.render(tiny, &mut small);
        assert_eq!(small.cell((0, 0)).map(|c| c.symbol()), Some("C"));
    }

    #[test]
    fn empty_panels_have_no_chart() {
        assert!(ChartData::from_panel(&panel(PanelBody::NoData)).is_none());
    }

    #[test]
    fn projection_chart_marks_current_year() {
        let s: YearSeries = [(2020, 1.0), (2030, 2.0)].into_iter().collect();
        let data = ChartData::from_projection(ProjectionKind::Cpi, &s, 2026);
        assert_eq!(data.vline, Some(2026.0));
        assert_eq!(data.hline, Some(0.0));
        assert_eq!(data.x_bounds, [2020.0, 2030.0]);
        assert_eq!(data.lines[0].color, ProjectionKind::Cpi.color());
    }

    #[test]
    fn grouped_bars_share_the_year_slot() {
        let a = bar_rects(&[(2000.0, 5.0)], 0, 2, 0.0);
        let b = bar_rects(&[(2000.0, 7.0)], 1, 2, 0.0);
        assert!((a[0][0].0 - 1999.6).abs() < 1e-9);
        assert!((a[0][1].0 - b[0][0].0).abs() < 1e-9);
        assert!((b[0][1].0 - 2000.4).abs() < 1e-9);
    }

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(fmt_tick(67_400_000.0), "67.4M");
        assert_eq!(fmt_tick(1.2e9), "1.2B");
        assert_eq!(fmt_tick(-2.5), "-2.5");
        assert_eq!(dashes((0.0, 0.0), (1.0, 0.0), 4).len(), 2);
    }
}
