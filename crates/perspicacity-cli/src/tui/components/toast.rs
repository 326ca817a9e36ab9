//! Toast notifications
//!
//! Short notices in the top-right corner: copied, stopped, missing keys.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthChar;

use perspicacity_core::NoticeLevel;

use crate::tui::theme::Theme;
use crate::tui::utils::truncate_ellipsis;

/// Maximum number of visible toasts
const MAX_VISIBLE_TOASTS: usize = 3;

const DEFAULT_DURATION: Duration = Duration::from_secs(4);

/// Errors stay longer
const ERROR_DURATION: Duration = Duration::from_secs(7);

const TOAST_WIDTH: u16 = 48;

/// Toast height (including borders)
const TOAST_HEIGHT: u16 = 3;

const TOAST_GAP: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Info,
    Error,
}

impl ToastType {
    fn color(&self, theme: &Theme) -> Color {
        match self {
            ToastType::Success => theme.success_color,
            ToastType::Info => theme.accent_color,
            ToastType::Error => theme.error_color,
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            ToastType::Success => "✓",
            ToastType::Info => "•",
            ToastType::Error => "✗",
        }
    }
}

impl From<NoticeLevel> for ToastType {
    fn from(level: NoticeLevel) -> Self {
        match level {
            NoticeLevel::Success => ToastType::Success,
            NoticeLevel::Info => ToastType::Info,
            NoticeLevel::Error => ToastType::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub toast_type: ToastType,
    pub duration: Duration,
    pub created_at: Instant,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Error)
    }

    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        let duration = match toast_type {
            ToastType::Error => ERROR_DURATION,
            _ => DEFAULT_DURATION,
        };
        Self {
            message: message.into(),
            toast_type,
            duration,
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    /// Remaining lifetime (1.0 to 0.0) for the progress bar
    pub fn progress(&self) -> f32 {
        let elapsed = self.created_at.elapsed().as_secs_f32();
        let total = self.duration.as_secs_f32().max(f32::EPSILON);
        (1.0 - (elapsed / total)).max(0.0)
    }
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self { toasts: Vec::new() }
    }

    pub fn push(&mut self, toast: Toast) {
        // Same message already showing
        if self.toasts.iter().any(|t| t.message == toast.message) {
            return;
        }

        while self.toasts.len() >= MAX_VISIBLE_TOASTS {
            self.toasts.remove(0);
        }
        self.toasts.push(toast);
    }

    /// Remove expired toasts, returns true if any were removed
    pub fn tick(&mut self) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.is_expired());
        self.toasts.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Visible toasts, most recent first
    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().rev().take(MAX_VISIBLE_TOASTS)
    }
}

/// Render toasts in the top-right corner
pub fn render_toasts(buf: &mut Buffer, area: Rect, queue: &ToastQueue, theme: &Theme) {
    if queue.is_empty() || area.width < TOAST_WIDTH + 2 {
        return;
    }

    let start_x = area.x + area.width - (TOAST_WIDTH + 2);

    for (i, toast) in queue.visible().enumerate() {
        let y = area.y + 1 + (i as u16 * (TOAST_HEIGHT + TOAST_GAP));

        if y + TOAST_HEIGHT > area.y + area.height {
            break;
        }

        let toast_area = Rect::new(start_x, y, TOAST_WIDTH, TOAST_HEIGHT);
        render_toast(buf, toast_area, toast, theme);
    }
}

fn render_toast(buf: &mut Buffer, area: Rect, toast: &Toast, theme: &Theme) {
    let color = toast.toast_type.color(theme);
    let border_style = Style::default().fg(color);
    let right = area.x + area.width - 1;
    let bottom = area.y + area.height - 1;

    let content_y = area.y + 1;
    for x in (area.x + 1)..right {
        if let Some(cell) = buf.cell_mut((x, content_y)) {
            cell.set_char(' ');
            cell.set_bg(theme.bg_color);
        }
    }

    for (pos, ch) in [
        ((area.x, area.y), '╭'),
        ((right, area.y), '╮'),
        ((area.x, bottom), '╰'),
        ((right, bottom), '╯'),
    ] {
        if let Some(cell) = buf.cell_mut(pos) {
            cell.set_char(ch).set_style(border_style);
        }
    }
    for x in (area.x + 1)..right {
        if let Some(cell) = buf.cell_mut((x, area.y)) {
            cell.set_char('─').set_style(border_style);
        }
    }
    for y in (area.y + 1)..bottom {
        for x in [area.x, right] {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char('│').set_style(border_style);
            }
        }
    }

    // Bottom border doubles as the lifetime bar
    let progress_width = ((area.width - 2) as f32 * toast.progress()) as u16;
    for (i, x) in ((area.x + 1)..right).enumerate() {
        if let Some(cell) = buf.cell_mut((x, bottom)) {
            if (i as u16) < progress_width {
                cell.set_char('━').set_fg(color);
            } else {
                cell.set_char('─').set_fg(theme.dim_color);
            }
        }
    }

    let mut cx = area.x + 2;
    for ch in toast.toast_type.icon().chars() {
        if let Some(cell) = buf.cell_mut((cx, content_y)) {
            cell.set_char(ch).set_fg(color).set_bg(theme.bg_color);
        }
        cx += UnicodeWidthChar::width(ch).unwrap_or(1) as u16;
    }
    cx += 1;

    let message = truncate_ellipsis(&toast.message, (area.width - 6) as usize);
    for ch in message.chars() {
        if cx >= right - 1 {
            break;
        }
        if let Some(cell) = buf.cell_mut((cx, content_y)) {
            cell.set_char(ch)
                .set_fg(theme.text_color)
                .set_bg(theme.bg_color);
        }
        cx += UnicodeWidthChar::width(ch).unwrap_or(1) as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_dropped() {
        let mut queue = ToastQueue::new();
        queue.push(Toast::success("Copied"));
        queue.push(Toast::success("Copied"));
        assert_eq!(queue.visible().count(), 1);
    }

    #[test]
    fn test_oldest_is_evicted_at_capacity() {
        let mut queue = ToastQueue::new();
        for i in 0..5 {
            queue.push(Toast::success(format!("toast {i}")));
        }
        let messages: Vec<_> = queue.visible().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["toast 4", "toast 3", "toast 2"]);
    }

    #[test]
    fn test_expired_toasts_are_removed() {
        let mut queue = ToastQueue::new();
        let mut toast = Toast::new("Generation stopped", NoticeLevel::Info.into());
        toast.duration = Duration::ZERO;
        queue.push(toast);
        assert!(queue.tick());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_renders_message_inside_border() {
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        let mut queue = ToastQueue::new();
        queue.push(Toast::error("Please set your Gemini API key in settings"));
        render_toasts(&mut buf, area, &queue, &Theme::default());

        let row: String = (0..60)
            .map(|x| buf.cell((x, 2)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect();
        assert!(row.contains("Please set your Gemini"));
    }
}
