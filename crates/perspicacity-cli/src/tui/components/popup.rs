//! Settings and help popups

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use perspicacity_core::{paths, CredentialKey, CredentialStore};

use crate::tui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Settings,
    Help,
}

const KEY_HELP: &[(&str, &str)] = &[
    ("Enter", "send, stop, or confirm an edit"),
    ("Esc", "stop or cancel an edit"),
    ("Tab", "switch between Search and Research"),
    ("Ctrl+↑/↓", "select a turn"),
    ("Ctrl+←/→", "switch answer tab"),
    ("Ctrl+E", "edit the selected question"),
    ("Ctrl+R", "regenerate in the same mode"),
    ("Alt+R", "regenerate in the other mode"),
    ("Ctrl+Y", "copy the selected turn"),
    ("Ctrl+O", "ask a human expert"),
    ("Ctrl+X", "show more sources"),
    ("Ctrl+N", "new conversation"),
    ("PgUp/PgDn", "scroll"),
    ("Ctrl+C", "quit"),
];

/// Calculate centered popup area with fixed size
pub fn center_rect(width: u16, height: u16, area: Rect) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(x, y, popup_width, popup_height)
}

fn popup_block(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_color))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme.accent_color)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg_color))
}

pub fn render_popup(f: &mut Frame, popup: Popup, theme: &Theme, credentials: &CredentialStore) {
    let (title, lines, width) = match popup {
        Popup::None => return,
        Popup::Settings => ("Settings", settings_lines(theme, credentials), 64),
        Popup::Help => ("Keys", help_lines(theme), 56),
    };

    let height = lines.len() as u16 + 2;
    let area = center_rect(width, height, f.area());
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(popup_block(title, theme)),
        area,
    );
}

fn settings_lines(theme: &Theme, credentials: &CredentialStore) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    for key in CredentialKey::ALL {
        let (mark, state, color) = if credentials.get(key).is_some() {
            ("✓", "configured", theme.success_color)
        } else {
            ("✗", "missing", theme.error_color)
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(mark, Style::default().fg(color)),
            Span::raw(format!(" {} API key  ", key.display_name())),
            Span::styled(state, Style::default().fg(color)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Run `perspicacity auth` to set the keys.",
        Style::default().fg(theme.text_color),
    )));
    lines.push(Line::from(Span::styled(
        format!("  Stored in {}", paths::credentials_file().display()),
        Style::default().fg(theme.dim_color),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Esc to close",
        Style::default().fg(theme.dim_color),
    )));
    lines
}

fn help_lines(theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    for (key, action) in KEY_HELP {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {key:<11}"),
                Style::default().fg(theme.accent_color),
            ),
            Span::styled(action.to_string(), Style::default().fg(theme.text_color)),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  /new /search /research /settings /quit",
        Style::default().fg(theme.dim_color),
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = center_rect(64, 20, area);
        assert_eq!(rect, Rect::new(2, 1, 36, 8));
    }

    #[test]
    fn test_settings_reports_missing_key() {
        let mut store = CredentialStore::default();
        store.set(CredentialKey::Gemini, "g");
        let text: Vec<String> = settings_lines(&Theme::default(), &store)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l.contains("Gemini API key  configured")));
        assert!(text.iter().any(|l| l.contains("Google API key  missing")));
    }
}
