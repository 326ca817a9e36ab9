//! Color theme

use ratatui::style::Color;

/// Colors used across the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg_color: Color,
    pub text_color: Color,
    pub dim_color: Color,
    pub accent_color: Color,
    pub user_color: Color,
    pub link_color: Color,
    pub border_color: Color,
    pub status_bar_bg_color: Color,
    pub success_color: Color,
    pub error_color: Color,
    pub warning_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg_color: Color::Reset,
            text_color: Color::Reset,
            dim_color: Color::DarkGray,
            accent_color: Color::Rgb(94, 175, 160),
            user_color: Color::Rgb(120, 160, 230),
            link_color: Color::Rgb(110, 170, 240),
            border_color: Color::DarkGray,
            status_bar_bg_color: Color::Rgb(30, 32, 38),
            success_color: Color::Green,
            error_color: Color::Red,
            warning_color: Color::Yellow,
        }
    }
}
