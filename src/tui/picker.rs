//! Filterable country list used by both tabs.

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// A list of labels with a type-to-filter box and optional multi-selection.
#[derive(Debug, Clone, Default)]
pub struct Picker {
    labels: Vec<String>,
    selected: Vec<bool>,
    multi: bool,
    /// Position within the filtered view.
    cursor: usize,
    filter: String,
    pub editing: bool,
}

impl Picker {
    pub fn multi(labels: Vec<String>) -> Self {
        let selected = vec![false; labels.len()];
        Self {
            labels,
            selected,
            multi: true,
            ..Self::default()
        }
    }

    pub fn single(labels: Vec<String>) -> Self {
        let selected = vec![false; labels.len()];
        Self {
            labels,
            selected,
            multi: false,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Indices of labels matching the filter (case-insensitive substring).
    pub fn visible(&self) -> Vec<usize> {
        let needle = self.filter.to_lowercase();
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| needle.is_empty() || l.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let n = self.visible().len();
        if n == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(n - 1);
    }

    /// Label index under the cursor.
    pub fn current(&self) -> Option<usize> {
        self.visible().get(self.cursor).copied()
    }

    pub fn current_label(&self) -> Option<&str> {
        self.current().map(|i| self.labels[i].as_str())
    }

    pub fn toggle_current(&mut self) {
        if !self.multi {
            return;
        }
        if let Some(i) = self.current() {
            self.selected[i] = !self.selected[i];
        }
    }

    pub fn select(&mut self, indices: &[usize]) {
        for &i in indices {
            if let Some(flag) = self.selected.get_mut(i) {
                *flag = true;
            }
        }
    }

    /// Selected label indices, in list order.
    pub fn chosen(&self) -> Vec<usize> {
        self.selected
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
            .collect()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn handle_filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.filter.clear();
                self.editing = false;
            }
            KeyCode::Enter => self.editing = false,
            KeyCode::Backspace => {
                self.filter.pop();
            }
            KeyCode::Char(c) => self.filter.push(c),
            _ => {}
        }
        self.move_cursor(0);
    }

    pub fn render(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, focused: bool) {
        let visible = self.visible();
        let items: Vec<ListItem> = visible
            .iter()
            .map(|&i| {
                let label = &self.labels[i];
                if self.multi {
                    let mark = if self.selected[i] { "[x]" } else { "[ ]" };
                    ListItem::new(format!("{mark} {label}"))
                } else {
                    ListItem::new(label.as_str())
                }
            })
            .collect();

        let title = if self.editing || !self.filter.is_empty() {
            format!("{title} (filter: {}{})", self.filter, if self.editing { "_" } else { "" })
        } else if self.multi {
            format!("{title} ({} selected)", self.chosen().len())
        } else {
            title.to_string()
        };

        let border = if focused { Color::Cyan } else { Color::Gray };
        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !visible.is_empty() {
            state.select(Some(self.cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker() -> Picker {
        Picker::multi(vec![
            "Chile".to_string(),
            "France".to_string(),
            "French Polynesia".to_string(),
            "United States".to_string(),
        ])
    }

    #[test]
    fn filter_narrows_and_clamps_cursor() {
        let mut p = picker();
        p.move_cursor(3);
        assert_eq!(p.current_label(), Some("United States"));

        p.editing = true;
        for c in "fr".chars() {
            p.handle_filter_key(KeyCode::Char(c));
        }
        assert_eq!(p.visible(), vec![1, 2]);
        assert_eq!(p.current_label(), Some("French Polynesia"));

        p.handle_filter_key(KeyCode::Esc);
        assert!(!p.editing);
        assert_eq!(p.visible().len(), 4);
    }

    #[test]
    fn toggle_tracks_selection_across_filters() {
        let mut p = picker();
        p.select(&[3]);
        p.move_cursor(1);
        p.toggle_current();
        assert_eq!(p.chosen(), vec![1, 3]);
        p.toggle_current();
        assert_eq!(p.chosen(), vec![3]);
    }

    #[test]
    fn single_picker_ignores_toggle() {
        let mut p = Picker::single(vec!["France".to_string()]);
        p.toggle_current();
        assert!(p.chosen().is_empty());
        assert_eq!(p.current(), Some(0));
    }

    #[test]
    fn cursor_never_goes_negative() {
        let mut p = picker();
        p.move_cursor(-5);
        assert_eq!(p.current(), Some(0));
        let mut empty = Picker::default();
        empty.move_cursor(1);
        assert_eq!(empty.current(), None);
    }
}
