//! Selection summary and key hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::ui::components::file_list::FileListState;

/// Footer showing how much of the candidate list is included.
#[derive(Debug, Default)]
pub struct Summary;

impl Summary {
    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, state: &FileListState) {
        let block = Block::default().title("Selection").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let paragraph = Paragraph::new(vec![counts_line(state), hints_line(state)])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

fn counts_line(state: &FileListState) -> Line<'static> {
    let mut spans = vec![
        Span::styled("Included", Style::default().fg(Color::Gray)),
        Span::raw(": "),
        Span::styled(
            format!("{} of {}", state.included_count(), state.candidate_count()),
            Style::default().fg(Color::Cyan),
        ),
    ];
    let preselected = state.preselected_count();
    if preselected > 0 {
        spans.push(Span::raw(" · "));
        spans.push(Span::styled(
            format!("{preselected} changed in commit"),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

fn hints_line(state: &FileListState) -> Line<'static> {
    let key = |label: &'static str| Span::styled(label, Style::default().fg(Color::Cyan));
    let spans = if state.is_filter_active() {
        vec![
            Span::raw("type to filter · "),
            key("↵"),
            Span::raw(" keep · "),
            key("esc"),
            Span::raw(" clear"),
        ]
    } else {
        vec![
            key("j/k"),
            Span::raw(" move · "),
            key("space"),
            Span::raw(" toggle · "),
            key("a"),
            Span::raw(" all · "),
            key("/"),
            Span::raw(" filter · "),
            key("↵"),
            Span::raw(" copy · "),
            key("esc/q"),
            Span::raw(" cancel"),
        ]
    };
    Line::from(spans).style(Style::default().fg(Color::Gray))
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::app::selection::DefaultInclusion;
    use crate::domain::model::FileEntry;

    fn screen(state: &FileListState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 4)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.size();
                Summary.render(frame, area, state);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn shows_counts_and_commit_changes() {
        let mut changed = FileEntry::new("x.py", "/r/x.py");
        changed.preselected = true;
        let candidates = vec![FileEntry::new("a.py", "/r/a.py"), changed];
        let state = FileListState::new(&candidates, DefaultInclusion::PreselectedOnly);

        let text = screen(&state);
        assert!(text.contains("Included: 1 of 2"));
        assert!(text.contains("1 changed in commit"));
        assert!(text.contains("space toggle"));
    }

    #[test]
    fn filter_mode_swaps_hints() {
        let mut state = FileListState::new(
            &[FileEntry::new("a.py", "/r/a.py")],
            DefaultInclusion::All,
        );
        state.begin_filter();
        let text = screen(&state);
        assert!(text.contains("type to filter"));
        assert!(!text.contains("changed in commit"));
    }
}
