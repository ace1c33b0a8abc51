//! Ratatui-based terminal UI.
//!
//! Two tabs:
//! - Analysis: pick countries and a year range, fetch every catalog indicator,
//!   then page through the chart panels topic by topic.
//! - Projections: download the latest WEO release on first visit, pick a country,
//!   and show its derived series in a 3x3 grid.
//!
//! Network calls are blocking. A key that triggers one only queues an `Action`;
//! the event loop redraws (so the status line shows what is happening) and then
//! runs it.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Tabs, Wrap},
};
use tracing::{info, warn};

use crate::app::pipeline::{self, AnalysisOutput, LoadedRelease};
use crate::catalog::Topic;
use crate::chart::ChartPanel;
use crate::config::Settings;
use crate::data::weo::HttpWeoDownloader;
use crate::data::{CachedSource, IndicatorSource, WorldBankClient};
use crate::domain::{Country, MIN_YEAR, YearRange, current_year};
use crate::error::{AppError, Notice, NoticeLevel};
use crate::plot::fmt_value;
use crate::projections::{GRID_COLS, GRID_ROWS, ProjectionKind, Projections};

mod picker;
mod plotters_chart;

use picker::Picker;
use plotters_chart::{ChartData, PanelChart};

/// Start the TUI.
pub fn run(settings: Settings, range: YearRange) -> Result<(), AppError> {
    let mut app = App::new(settings, range)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::data(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::data(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::data(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Analysis,
    Projections,
}

/// Blocking work queued by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    LoadCountries,
    RunAnalysis,
    LoadWeo,
    ComputeProjections,
}

struct AnalysisTab {
    countries: Vec<Country>,
    picker: Picker,
    start: i32,
    end: i32,
    output: Option<AnalysisOutput>,
    /// Index into the flattened panel list.
    panel: usize,
    notices: Vec<Notice>,
}

struct ProjectionsTab {
    picker: Picker,
    loaded: Option<LoadedRelease>,
    attempted: bool,
    projections: Option<Projections>,
    notices: Vec<Notice>,
}

struct App {
    tab: Tab,
    analysis: AnalysisTab,
    weo: ProjectionsTab,
    source: CachedSource<WorldBankClient>,
    downloader: HttpWeoDownloader,
    settings: Settings,
    max_year: i32,
    status: String,
    pending: Option<Action>,
}

impl App {
    fn new(settings: Settings, range: YearRange) -> Result<Self, AppError> {
        let source = CachedSource::new(WorldBankClient::from_settings(&settings)?);
        let downloader = HttpWeoDownloader::from_settings(&settings)?;
        let max_year = current_year();

        Ok(Self {
            tab: Tab::Analysis,
            analysis: AnalysisTab {
                countries: Vec::new(),
                picker: Picker::default(),
                start: range.start.clamp(MIN_YEAR, max_year),
                end: range.end.clamp(MIN_YEAR, max_year),
                output: None,
                panel: 0,
                notices: Vec::new(),
            },
            weo: ProjectionsTab {
                picker: Picker::default(),
                loaded: None,
                attempted: false,
                projections: None,
                notices: Vec::new(),
            },
            source,
            downloader,
            settings,
            max_year,
            status: "Loading country list...".to_string(),
            pending: Some(Action::LoadCountries),
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::data(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            // The status frame is on screen; now do the slow part.
            if let Some(action) = self.pending.take() {
                self.perform(action);
                needs_redraw = true;
                continue;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::data(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::data(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn active_picker(&mut self) -> &mut Picker {
        match self.tab {
            Tab::Analysis => &mut self.analysis.picker,
            Tab::Projections => &mut self.weo.picker,
        }
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.active_picker().editing {
            self.active_picker().handle_filter_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => self.switch_tab(),
            KeyCode::Up => self.active_picker().move_cursor(-1),
            KeyCode::Down => self.active_picker().move_cursor(1),
            KeyCode::Char('/') => self.active_picker().editing = true,
            _ => match self.tab {
                Tab::Analysis => self.handle_analysis_key(code),
                Tab::Projections => self.handle_projections_key(code),
            },
        }
        false
    }

    fn switch_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Analysis => Tab::Projections,
            Tab::Projections => Tab::Analysis,
        };
        if self.tab == Tab::Projections && !self.weo.attempted {
            self.status = "Downloading WEO data...".to_string();
            self.pending = Some(Action::LoadWeo);
        }
    }

    fn handle_analysis_key(&mut self, code: KeyCode) {
        let a = &mut self.analysis;
        match code {
            KeyCode::Char(' ') => a.picker.toggle_current(),
            KeyCode::Left => a.start = (a.start - 1).max(MIN_YEAR),
            KeyCode::Right => a.start = (a.start + 1).min(self.max_year),
            KeyCode::Char('-') => a.end = (a.end - 1).max(MIN_YEAR),
            KeyCode::Char('+') | KeyCode::Char('=') => a.end = (a.end + 1).min(self.max_year),
            KeyCode::PageDown | KeyCode::Char(']') => self.step_panel(1),
            KeyCode::PageUp | KeyCode::Char('[') => self.step_panel(-1),
            KeyCode::Enter | KeyCode::Char('o') => self.request_analysis(),
            _ => {}
        }
        if matches!(
            code,
            KeyCode::Left | KeyCode::Right | KeyCode::Char('-') | KeyCode::Char('+') | KeyCode::Char('=')
        ) {
            self.status = format!("Years: {}-{}", self.analysis.start, self.analysis.end);
        }
    }

    fn handle_projections_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                if self.weo.loaded.is_none() {
                    self.status = "No WEO data loaded. Press r to retry the download.".to_string();
                } else if self.weo.picker.current().is_some() {
                    self.status = "Computing projections...".to_string();
                    self.pending = Some(Action::ComputeProjections);
                }
            }
            KeyCode::Char('r') => {
                self.status = "Downloading WEO data...".to_string();
                self.pending = Some(Action::LoadWeo);
            }
            _ => {}
        }
    }

    fn request_analysis(&mut self) {
        if self.analysis.picker.chosen().is_empty() {
            self.status = "Please select at least one country.".to_string();
            return;
        }
        if self.analysis.end < self.analysis.start {
            self.status = "End year must be greater than or equal to start year.".to_string();
            return;
        }
        self.status = "Fetching indicators from the World Bank...".to_string();
        self.pending = Some(Action::RunAnalysis);
    }

    fn step_panel(&mut self, delta: isize) {
        let n = self.panel_count();
        if n == 0 {
            return;
        }
        self.analysis.panel = self.analysis.panel.saturating_add_signed(delta).min(n - 1);
    }

    fn panel_count(&self) -> usize {
        self.analysis.output.as_ref().map(|o| pages(o).len()).unwrap_or(0)
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::LoadCountries => self.load_countries(),
            Action::RunAnalysis => self.run_analysis(),
            Action::LoadWeo => self.load_weo(),
            Action::ComputeProjections => self.compute_projections(),
        }
    }

    fn load_countries(&mut self) {
        match self.source.countries() {
            Ok(countries) => {
                let labels = countries.iter().map(|c| c.name.clone()).collect();
                let mut picker = Picker::multi(labels);
                picker.select(&pipeline::default_selection(&countries));
                self.status = format!("{} countries loaded.", countries.len());
                self.analysis.picker = picker;
                self.analysis.countries = countries;
            }
            Err(err) => {
                warn!(error = %err, "country list unavailable");
                self.status = format!("Country list unavailable: {err}");
                self.analysis.notices = vec![Notice::error(err.to_string())];
            }
        }
    }

    fn run_analysis(&mut self) {
        let countries: Vec<Country> = self
            .analysis
            .picker
            .chosen()
            .into_iter()
            .filter_map(|i| self.analysis.countries.get(i).cloned())
            .collect();

        let result = YearRange::new(self.analysis.start, self.analysis.end)
            .and_then(|range| pipeline::run_analysis(&self.source, &countries, range));

        match result {
            Ok(output) => {
                let panels = output.sections.iter().map(|s| s.panels.len()).sum::<usize>();
                self.status = format!("Analysis ready: {panels} charts ([ and ] to browse).");
                self.analysis.notices = output.notices.clone();
                self.analysis.output = Some(output);
                self.analysis.panel = 0;
            }
            Err(err) => {
                self.status = err.to_string();
                self.analysis.notices = vec![Notice::error(err.to_string())];
                self.analysis.output = None;
            }
        }
    }

    fn load_weo(&mut self) {
        self.weo.attempted = true;
        let result = pipeline::load_latest_release(
            &self.downloader,
            current_year(),
            self.settings.weo_target_month,
            &self.settings.data_dir,
        );
        match result {
            Ok(loaded) => {
                let labels = loaded.dataset.countries().into_iter().map(|c| c.name).collect();
                info!(release = %loaded.release.label(), "WEO release ready");
                self.status = format!("WEO release {} loaded.", loaded.release.label());
                self.weo.picker = Picker::single(labels);
                self.weo.notices = loaded.notices.clone();
                self.weo.loaded = Some(loaded);
                self.weo.projections = None;
            }
            Err(err) => {
                self.status = err.to_string();
                let mut notices = err.notices().to_vec();
                notices.push(Notice::error(err.to_string()));
                self.weo.notices = notices;
            }
        }
    }

    fn compute_projections(&mut self) {
        let (Some(loaded), Some(country)) = (&self.weo.loaded, self.weo.picker.current_label()) else {
            return;
        };
        match pipeline::country_projections(&loaded.dataset, country) {
            Ok(projections) => {
                self.status = format!("Projections for {}.", projections.country);
                self.weo.projections = Some(projections);
            }
            Err(err) => {
                self.status = err.to_string();
                self.weo.projections = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Analysis => self.draw_analysis(frame, chunks[1]),
            Tab::Projections => self.draw_projections(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let selected = match self.tab {
            Tab::Analysis => 0,
            Tab::Projections => 1,
        };
        let tabs = Tabs::new(["Analysis", "Projections"])
            .select(selected)
            .block(Block::default().borders(Borders::ALL).title("econ"))
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_analysis(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(4), Constraint::Length(8)])
            .split(cols[0]);

        self.analysis.picker.render(frame, left[0], "Countries", true);

        let years = Paragraph::new(vec![
            Line::from(format!("Start: {}  (←/→)", self.analysis.start)),
            Line::from(format!("End:   {}  (-/+)", self.analysis.end)),
        ])
        .block(Block::default().title("Years").borders(Borders::ALL));
        frame.render_widget(years, left[1]);

        draw_notices(frame, left[2], &self.analysis.notices);
        self.draw_panel(frame, cols[1]);
    }

    fn draw_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(output) = &self.analysis.output else {
            let msg = Paragraph::new("Select countries (Space) and press Enter to run the analysis.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("Charts").borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let pages = pages(output);
        let idx = self.analysis.panel.min(pages.len().saturating_sub(1));
        let Some(&(topic, page)) = pages.get(idx) else {
            let msg = Paragraph::new("No panels to display.")
                .block(Block::default().title("Charts").borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };
        let position = format!("({}/{})", idx + 1, pages.len());

        let Some(panel) = page else {
            let msg = Paragraph::new("No data for this topic.")
                .style(Style::default().fg(Color::Yellow))
                .block(
                    Block::default()
                        .title(format!(" {} {position} ", topic.label()))
                        .borders(Borders::ALL),
                );
            frame.render_widget(msg, area);
            return;
        };

        let title = format!(" {} | {} {position} ", topic.label(), panel.title);
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(6)])
            .split(inner);

        match ChartData::from_panel(panel) {
            Some(data) => {
                frame.render_widget(PanelChart { data: &data }, rows[0]);
                frame.render_widget(Paragraph::new(data.legend()), rows[1]);
            }
            None => {
                let lines: Vec<Line> = panel.notices().iter().map(notice_line).collect();
                frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[0]);
            }
        }

        let mut text: Vec<Line> = panel.description.lines().map(Line::from).collect();
        if panel.has_chart() {
            text.extend(panel.notices().iter().map(notice_line));
        }
        let description = Paragraph::new(Text::from(text))
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true });
        frame.render_widget(description, rows[2]);
    }

    fn draw_projections(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(10)])
            .split(cols[0]);

        let title = self
            .weo
            .loaded
            .as_ref()
            .map(|l| format!("WEO {}", l.release.label()))
            .unwrap_or_else(|| "WEO".to_string());
        self.weo.picker.render(frame, left[0], &title, true);
        draw_notices(frame, left[1], &self.weo.notices);

        let Some(projections) = &self.weo.projections else {
            let hint = if self.weo.loaded.is_some() {
                "Pick a country and press Enter."
            } else {
                "WEO data not loaded yet."
            };
            let msg = Paragraph::new(hint)
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("Projections").borders(Borders::ALL));
            frame.render_widget(msg, cols[1]);
            return;
        };

        let block = Block::default()
            .title(format!(" {} ({}) ", projections.country, projections.iso))
            .borders(Borders::ALL);
        let inner = block.inner(cols[1]);
        frame.render_widget(block, cols[1]);

        let row_rects = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, GRID_ROWS as u32); GRID_ROWS])
            .split(inner);
        let cells: Vec<_> = row_rects
            .iter()
            .map(|row| {
                Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Ratio(1, GRID_COLS as u32); GRID_COLS])
                    .split(*row)
            })
            .collect();

        for kind in ProjectionKind::ALL {
            let (r, c) = kind.grid_cell();
            let cell = cells[r][c];
            let block = Block::default().title(kind.title()).borders(Borders::ALL);
            let chart_area = block.inner(cell);
            frame.render_widget(block, cell);
            let data = ChartData::from_projection(kind, projections.get(kind), self.max_year);
            frame.render_widget(PanelChart { data: &data }, chart_area);
        }

        // The last row has two free cells after NDEBT; the table spans both.
        let (r, c) = ProjectionKind::NetDebt.grid_cell();
        if c + 1 < GRID_COLS {
            let first = cells[r][c + 1];
            let last = cells[r][GRID_COLS - 1];
            let table_area = Rect {
                width: last.x + last.width - first.x,
                ..first
            };
            draw_projection_table(frame, table_area, projections, self.max_year);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.tab {
            Tab::Analysis => "Tab switch  ↑/↓ move  Space toggle  / filter  ←/→ start  -/+ end  Enter run  [/] panel  q quit",
            Tab::Projections => "Tab switch  ↑/↓ move  / filter  Enter show  r reload  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Period x series table, starting two years before `from_year`.
fn draw_projection_table(frame: &mut ratatui::Frame<'_>, area: Rect, projections: &Projections, from_year: i32) {
    let header = Row::new(
        std::iter::once("year".to_string()).chain(ProjectionKind::ALL.iter().map(|k| k.key().to_string())),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = projections
        .table()
        .into_iter()
        .filter(|(year, _)| *year >= from_year - 2)
        .map(|(year, cells)| {
            let values = cells
                .into_iter()
                .map(|c| c.map(fmt_value).unwrap_or_else(|| "-".to_string()));
            Row::new(std::iter::once(year.to_string()).chain(values))
        })
        .collect();

    let mut widths = vec![Constraint::Length(5)];
    widths.extend([Constraint::Length(9); ProjectionKind::ALL.len()]);
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title("Table").borders(Borders::ALL));
    frame.render_widget(table, area);
}

/// One page per panel; a topic without data still gets a page.
fn pages(output: &AnalysisOutput) -> Vec<(Topic, Option<&ChartPanel>)> {
    output
        .sections
        .iter()
        .flat_map(|s| {
            let panels: Vec<Option<&ChartPanel>> = if s.panels.is_empty() {
                vec![None]
            } else {
                s.panels.iter().map(Some).collect()
            };
            panels.into_iter().map(move |p| (s.topic, p))
        })
        .collect()
}

fn notice_line(notice: &Notice) -> Line<'static> {
    let color = match notice.level {
        NoticeLevel::Info => Color::Gray,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };
    Line::from(Span::styled(notice.message.clone(), Style::default().fg(color)))
}

fn draw_notices(frame: &mut ratatui::Frame<'_>, area: Rect, notices: &[Notice]) {
    let lines: Vec<Line> = notices.iter().map(notice_line).collect();
    let p = Paragraph::new(lines)
        .block(Block::default().title("Notices").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let range = YearRange::new(2000, current_year()).unwrap();
        let mut app = App::new(Settings::default(), range).unwrap();
        app.pending = None;
        app
    }

    fn with_countries(app: &mut App) {
        let countries = vec![
            Country {
                id: "FRA".to_string(),
                name: "France".to_string(),
            },
            Country {
                id: "USA".to_string(),
                name: "United States".to_string(),
            },
        ];
        app.analysis.picker = Picker::multi(countries.iter().map(|c| c.name.clone()).collect());
        app.analysis.countries = countries;
    }

    #[test]
    fn starts_by_loading_countries() {
        let range = YearRange::new(2000, 2001).unwrap();
        let app = App::new(Settings::default(), range).unwrap();
        assert_eq!(app.pending, Some(Action::LoadCountries));
        assert_eq!(app.tab, Tab::Analysis);
    }

    #[test]
    fn run_without_selection_is_refused() {
        let mut app = app();
        with_countries(&mut app);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.pending, None);
        assert_eq!(app.status, "Please select at least one country.");
    }

    #[test]
    fn inverted_range_is_refused() {
        let mut app = app();
        with_countries(&mut app);
        app.handle_key(KeyCode::Char(' '));
        app.analysis.start = 2010;
        app.analysis.end = 2005;
        app.handle_key(KeyCode::Char('o'));
        assert_eq!(app.pending, None);
        assert!(app.status.starts_with("End year must be"));

        app.analysis.end = 2010;
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.pending, Some(Action::RunAnalysis));
    }

    #[test]
    fn years_stay_within_bounds() {
        let mut app = app();
        app.analysis.start = MIN_YEAR;
        app.handle_key(KeyCode::Left);
        assert_eq!(app.analysis.start, MIN_YEAR);

        app.analysis.end = app.max_year;
        app.handle_key(KeyCode::Char('+'));
        assert_eq!(app.analysis.end, app.max_year);
        app.handle_key(KeyCode::Char('-'));
        assert_eq!(app.analysis.end, app.max_year - 1);
    }

    #[test]
    fn first_visit_to_projections_queues_download() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::Projections);
        assert_eq!(app.pending, Some(Action::LoadWeo));

        app.pending = None;
        app.weo.attempted = true;
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.pending, None);
    }

    #[test]
    fn failed_weo_load_lists_each_month_before_the_error() {
        let server = httpmock::MockServer::start();
        let any = server.mock(|when, then| {
            when.method(httpmock::Method::GET).path_contains("/weo/");
            then.status(404);
        });
        let dir = tempfile::tempdir().unwrap();

        let mut app = app();
        app.settings.weo_target_month = 2;
        app.settings.data_dir = dir.path().to_path_buf();
        app.downloader = HttpWeoDownloader::new(
            reqwest::blocking::Client::new(),
            format!("{}/weo/{{year}}/{{release}}.tsv", server.base_url()),
        );
        app.perform(Action::LoadWeo);

        any.assert_hits(2);
        let levels: Vec<_> = app.weo.notices.iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![NoticeLevel::Warning, NoticeLevel::Warning, NoticeLevel::Error]);
        assert!(app.weo.notices[0].message.starts_with("Download failed for Feb"));
        assert!(app.weo.loaded.is_none());
    }

    #[test]
    fn filter_mode_captures_quit_key() {
        let mut app = app();
        with_countries(&mut app);
        app.handle_key(KeyCode::Char('/'));
        assert!(!app.handle_key(KeyCode::Char('q')));
        assert_eq!(app.analysis.picker.filter(), "q");
        app.handle_key(KeyCode::Esc);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
