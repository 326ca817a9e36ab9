//! Status bar component - bottom bar with mode, session phase and shortcuts

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use perspicacity_core::{Mode, SessionPhase};

use crate::tui::theme::Theme;

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    mode: Mode,
    phase: SessionPhase,
    spinner: &str,
) {
    let bg = Paragraph::new("").style(Style::default().bg(theme.status_bar_bg_color));
    f.render_widget(bg, area);

    let (phase_text, phase_color) = match phase {
        SessionPhase::Idle => ("ready".to_string(), theme.dim_color),
        SessionPhase::Sending => (format!("{spinner} connecting"), theme.warning_color),
        SessionPhase::Streaming => (format!("{spinner} answering"), theme.accent_color),
        SessionPhase::Completed => ("done".to_string(), theme.success_color),
        SessionPhase::Failed => ("failed".to_string(), theme.error_color),
        SessionPhase::Stopped => ("stopped".to_string(), theme.dim_color),
    };

    let left_spans = vec![
        Span::raw(" "),
        Span::styled(
            mode.label(),
            Style::default()
                .fg(theme.accent_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(theme.dim_color)),
        Span::styled(phase_text.clone(), Style::default().fg(phase_color)),
    ];
    let left_width = 1 + mode.label().width() as u16 + 3 + phase_text.width() as u16;

    let hints = if matches!(phase, SessionPhase::Sending | SessionPhase::Streaming) {
        "Esc stop · Ctrl+C quit "
    } else {
        "Tab mode · Ctrl+N new · /help · Ctrl+C quit "
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(left_width), Constraint::Min(0)])
        .split(area);

    f.render_widget(Paragraph::new(Line::from(left_spans)), chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(theme.dim_color)))
            .alignment(Alignment::Right),
        chunks[1],
    );
}
