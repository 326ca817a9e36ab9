//! Frame rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use perspicacity_core::SessionPhase;

use crate::tui::app::App;
use crate::tui::components::{render_popup, render_status_bar, render_toasts};
use crate::tui::transcript::{layout, RenderContext};

impl App {
    pub fn ui(&mut self, f: &mut Frame) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Transcript
                Constraint::Length(3), // Input
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        self.render_transcript(f, chunks[0]);
        self.render_input(f, chunks[1]);

        // An idle controller reports how the last session ended
        let phase = match self.conversation.phase() {
            SessionPhase::Idle => self
                .conversation
                .last_outcome()
                .unwrap_or(SessionPhase::Idle),
            phase => phase,
        };
        render_status_bar(
            f,
            chunks[2],
            &self.theme,
            self.conversation.mode(),
            phase,
            self.spinner(),
        );

        render_popup(f, self.popup, &self.theme, self.conversation.credentials());
        render_toasts(f.buffer_mut(), area, &self.toasts, &self.theme);
    }

    fn render_transcript(&mut self, f: &mut Frame, area: Rect) {
        let ctx = RenderContext {
            theme: &self.theme,
            markup: self.conversation.markup().as_ref(),
            width: area.width as usize,
            selected: self.selected,
            spinner: self.spinner(),
        };
        let rendered = layout(self.conversation.transcript(), &ctx);

        self.viewport_height = area.height as usize;
        if let Some(turn) = self.pending_turn.take() {
            if let Some(&line) = rendered.offsets.get(&turn) {
                self.scroll.request_scroll_to_line(line);
            }
        }
        self.scroll.update(rendered.lines.len(), self.viewport_height);

        let visible: Vec<Line<'static>> = rendered
            .lines
            .into_iter()
            .skip(self.scroll.offset)
            .take(self.viewport_height)
            .collect();
        f.render_widget(Paragraph::new(visible), area);
    }

    fn render_input(&mut self, f: &mut Frame, area: Rect) {
        let (title, color) = match self.editing {
            Some(turn) => (format!(" Editing {turn} "), self.theme.warning_color),
            None => (
                format!(" {} ", self.conversation.mode().label()),
                self.theme.accent_color,
            ),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .title(Span::styled(title, Style::default().fg(color)));
        let inner = block.inner(area);

        // Keep the cursor in view on long input
        let cursor = self.input.cursor_column();
        let skip = cursor.saturating_sub(inner.width.saturating_sub(1) as usize);
        let content: Line = if self.input.is_empty() && self.editing.is_none() {
            let hint = if self.conversation.is_generating() {
                "Enter or Esc to stop"
            } else {
                "Ask a question"
            };
            Line::from(Span::styled(hint, Style::default().fg(self.theme.dim_color)))
        } else {
            Line::from(Span::styled(
                self.input.content().to_string(),
                Style::default().fg(self.theme.text_color),
            ))
        };

        f.render_widget(
            Paragraph::new(content)
                .block(block)
                .scroll((0, skip as u16)),
            area,
        );
        f.set_cursor_position(Position::new(
            inner.x + (cursor - skip) as u16,
            inner.y,
        ));
    }
}
