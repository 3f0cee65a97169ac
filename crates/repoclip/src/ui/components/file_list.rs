//! Checkbox list of candidate files and its state.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::app::selection::DefaultInclusion;
use crate::domain::model::{FileEntry, Selection};

/// Candidates, their inclusion flags, and the filtered view over them.
#[derive(Debug, Default, Clone)]
pub struct FileListState {
    entries: Vec<FileEntry>,
    included: Vec<bool>,
    visible: Vec<usize>,
    selected: usize,
    filter: String,
    filter_active: bool,
}

impl FileListState {
    /// Start from `candidates` with inclusion seeded by `defaults`.
    pub fn new(candidates: &[FileEntry], defaults: DefaultInclusion) -> Self {
        let mut state = Self {
            entries: candidates.to_vec(),
            included: candidates.iter().map(|entry| defaults.includes(entry)).collect(),
            ..Self::default()
        };
        state.refresh_visible();
        state
    }

    pub fn candidate_count(&self) -> usize {
        self.entries.len()
    }

    pub fn included_count(&self) -> usize {
        self.included.iter().filter(|flag| **flag).count()
    }

    pub fn preselected_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.preselected).count()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Index of the highlighted row within the visible list.
    pub fn selected_index(&self) -> Option<usize> {
        if self.visible.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    /// Relative path of the highlighted row.
    #[cfg(test)]
    pub fn current_path(&self) -> Option<&str> {
        self.current_entry_index()
            .map(|idx| self.entries[idx].relative_path.as_str())
    }

    #[cfg(test)]
    pub fn is_included(&self, relative_path: &str) -> bool {
        self.entries
            .iter()
            .position(|entry| entry.relative_path == relative_path)
            .is_some_and(|idx| self.included[idx])
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Flip the highlighted row.
    pub fn toggle_current(&mut self) {
        if let Some(idx) = self.current_entry_index() {
            self.included[idx] = !self.included[idx];
        }
    }

    /// Include every visible row, or exclude them all when they already are.
    pub fn toggle_all_visible(&mut self) {
        let all_included = self.visible.iter().all(|idx| self.included[*idx]);
        for idx in &self.visible {
            self.included[*idx] = !all_included;
        }
    }

    pub fn begin_filter(&mut self) {
        self.filter_active = true;
    }

    pub fn end_filter(&mut self) {
        self.filter_active = false;
    }

    pub fn is_filter_active(&self) -> bool {
        self.filter_active
    }

    pub fn push_filter_char(&mut self, ch: char) {
        self.filter.push(ch);
        self.refresh_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
        self.refresh_visible();
    }

    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.filter.clear();
            self.refresh_visible();
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Included entries in candidate order. Hidden rows keep their flags.
    pub fn into_selection(self) -> Selection {
        let included = self.included;
        Selection::from_candidates(&self.entries, |idx, _| included[idx])
    }

    fn current_entry_index(&self) -> Option<usize> {
        self.visible.get(self.selected).copied()
    }

    fn refresh_visible(&mut self) {
        let needle = self.filter.to_lowercase();
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                needle.is_empty() || entry.relative_path.to_lowercase().contains(&needle)
            })
            .map(|(idx, _)| idx)
            .collect();

        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    fn iter_visible(&self) -> impl Iterator<Item = (usize, &FileEntry, bool)> {
        self.visible
            .iter()
            .enumerate()
            .map(|(row, idx)| (row, &self.entries[*idx], self.included[*idx]))
    }
}

/// Renders the candidate list with a filter line on top.
#[derive(Debug, Default)]
pub struct FileList;

impl FileList {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &FileListState) {
        let block = Block::default().borders(Borders::ALL).title(format!(
            "Files · {}/{} included",
            state.included_count(),
            state.candidate_count()
        ));
        frame.render_widget(block.clone(), area);

        let inner = block.inner(area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        let filter_text = if state.filter().is_empty() && !state.is_filter_active() {
            "filter (press /)".to_string()
        } else {
            format!("/{}", state.filter())
        };
        let mut filter_style = Style::default().fg(Color::Gray);
        if state.is_filter_active() {
            filter_style = filter_style.add_modifier(Modifier::BOLD).fg(Color::Cyan);
        }
        frame.render_widget(Paragraph::new(filter_text).style(filter_style), layout[0]);

        if state.visible_len() == 0 {
            let placeholder = Paragraph::new("No files match filter").style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(placeholder, layout[1]);
            return;
        }

        let items: Vec<ListItem> = state
            .iter_visible()
            .map(|(row, entry, included)| {
                let checkbox = if included { "[x] " } else { "[ ] " };
                let mut name_style = Style::default();
                if included {
                    name_style = name_style.fg(Color::Cyan);
                }
                let mut spans = vec![
                    Span::styled(checkbox, Style::default().fg(Color::Gray)),
                    Span::styled(entry.relative_path.clone(), name_style),
                ];
                if entry.preselected {
                    spans.push(Span::styled(" (changed)", Style::default().fg(Color::Yellow)));
                }
                let mut item = ListItem::new(Line::from(spans));
                if row % 2 == 1 {
                    item = item.style(Style::default().bg(Color::Rgb(24, 24, 24)));
                }
                item
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(state.selected_index());

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, layout[1], &mut list_state);
    }
}
