//! Interactive selector running in the terminal.

use std::io;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::{Frame, Terminal};

use crate::app::selection::{DefaultInclusion, SelectionOutcome, Selector};
use crate::domain::model::{FileEntry, Selection};
use crate::ui::components::file_list::{FileList, FileListState};
use crate::ui::components::summary::Summary;

/// [`Selector`] backed by a full-screen checkbox list.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSelector;

impl Selector for TerminalSelector {
    fn select(
        &mut self,
        candidates: &[FileEntry],
        defaults: DefaultInclusion,
    ) -> Result<SelectionOutcome> {
        if candidates.is_empty() {
            return Ok(SelectionOutcome::Confirmed(Selection::empty()));
        }

        let mut app = SelectorApp::new(candidates, defaults);
        let _guard = TerminalGuard::enter()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        app.event_loop(&mut terminal)?;
        Ok(app.finish())
    }
}

/// Leaves raw mode and the alternate screen when dropped, whatever path the UI exits by.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)
            .context("failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
        let _ = disable_raw_mode();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Confirm,
    Cancel,
}

struct SelectorApp {
    state: FileListState,
    list: FileList,
    summary: Summary,
    decision: Option<Decision>,
}

impl SelectorApp {
    fn new(candidates: &[FileEntry], defaults: DefaultInclusion) -> Self {
        Self {
            state: FileListState::new(candidates, defaults),
            list: FileList,
            summary: Summary,
            decision: None,
        }
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while self.decision.is_none() {
            terminal.draw(|frame| self.render(frame))?;
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(4)])
            .split(frame.size());
        self.list.render(frame, layout[0], &self.state);
        self.summary.render(frame, layout[1], &self.state);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        // Raw mode swallows SIGINT.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.decision = Some(Decision::Cancel);
            return;
        }
        if self.state.is_filter_active() {
            self.handle_filter_input(key);
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_previous(),
            KeyCode::Char(' ') => self.state.toggle_current(),
            KeyCode::Char('a') => self.state.toggle_all_visible(),
            KeyCode::Char('/') => self.state.begin_filter(),
            KeyCode::Enter => self.decision = Some(Decision::Confirm),
            KeyCode::Esc | KeyCode::Char('q') => self.decision = Some(Decision::Cancel),
            _ => {}
        }
    }

    fn handle_filter_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.clear_filter();
                self.state.end_filter();
            }
            KeyCode::Enter => self.state.end_filter(),
            KeyCode::Backspace => self.state.pop_filter_char(),
            KeyCode::Char(ch) => self.state.push_filter_char(ch),
            KeyCode::Down => self.state.select_next(),
            KeyCode::Up => self.state.select_previous(),
            _ => {}
        }
    }

    fn finish(self) -> SelectionOutcome {
        match self.decision {
            Some(Decision::Confirm) => SelectionOutcome::Confirmed(self.state.into_selection()),
            Some(Decision::Cancel) | None => SelectionOutcome::Cancelled,
        }
    }
}
