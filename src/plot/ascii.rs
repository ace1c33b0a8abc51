//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each series gets its own glyph; gaps in a series are not bridged.
//! Optional dashed reference lines are drawn underneath the series.

/// Glyphs assigned to series in order.
const GLYPHS: [char; 8] = ['*', 'o', '+', 'x', '#', '@', '%', '&'];

/// One plotted series: contiguous runs of `(x, y)` points.
#[derive(Debug, Clone)]
pub struct PlotSeries<'a> {
    pub label: &'a str,
    pub segments: Vec<Vec<(f64, f64)>>,
}

/// Reference lines: vertical at `x`, horizontal at `y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceLines {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Render several series on one grid, with a legend.
pub fn render_series_plot(
    series: &[PlotSeries<'_>],
    x_range: Option<(f64, f64)>,
    refs: ReferenceLines,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range
        .filter(|(a, b)| a.is_finite() && b.is_finite() && b > a)
        .or_else(|| x_range_of(series))
        .unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range_of(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (idx, s) in series.iter().enumerate() {
        let glyph = GLYPHS[idx % GLYPHS.len()];
        for segment in &s.segments {
            draw_segment(&mut grid, segment, (x_min, x_max), (y_min, y_max), glyph);
        }
    }

    if let Some(y) = refs.y.filter(|y| (y_min..=y_max).contains(y)) {
        let row = map_y(y, y_min, y_max, height);
        draw_line(&mut grid, 0, row, width - 1, row, '.');
    }
    if let Some(x) = refs.x.filter(|x| (x_min..=x_max).contains(x)) {
        let col = map_x(x, x_min, x_max, width);
        draw_line(&mut grid, col, 0, col, height - 1, ':');
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.0}, {x_max:.0}] | y=[{}, {}]\n",
        fmt_value(y_min),
        fmt_value(y_max)
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let legend: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(idx, s)| format!("{} {}", GLYPHS[idx % GLYPHS.len()], s.label))
        .collect();
    if !legend.is_empty() {
        out.push_str(&format!("Legend: {}\n", legend.join("  ")));
    }

    out
}

/// Compact number formatting for axis ranges (`1.2e12`, `3.45`).
pub fn fmt_value(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(1e-2..1e6).contains(&a) {
        format!("{v:.2e}")
    } else {
        format!("{v:.2}")
    }
}

fn x_range_of(series: &[PlotSeries<'_>]) -> Option<(f64, f64)> {
    bounds(series.iter().flat_map(|s| s.segments.iter().flatten().map(|p| p.0)))
}

fn y_range_of(series: &[PlotSeries<'_>]) -> Option<(f64, f64)> {
    bounds(series.iter().flat_map(|s| s.segments.iter().flatten().map(|p| p.1)))
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some((min, max))
    } else {
        // A flat series still needs a non-empty range.
        Some((min - 0.5, max + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_segment(
    grid: &mut [Vec<char>],
    segment: &[(f64, f64)],
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
    glyph: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in segment {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, glyph),
            None => {
                if grid[row][col] == ' ' {
                    grid[row][col] = glyph;
                }
            }
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
