//! Scroll State - viewport over the rendered transcript
//!
//! Offsets count rendered lines from the top of the transcript.

/// Manages scroll state for the transcript area
#[derive(Debug, Default)]
pub struct ScrollState {
    /// Current scroll offset (0 = top, max = bottom)
    pub offset: usize,
    /// Maximum scroll offset for bounds checking
    pub max_scroll: usize,
    /// Jump to the bottom on the next render
    pub scroll_to_bottom: bool,
    /// Line to bring to the top on the next render
    pub scroll_to_line: Option<usize>,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.offset = self.offset.saturating_add(amount).min(self.max_scroll);
    }

    /// Request a jump to the bottom on the next render
    pub fn request_scroll_to_bottom(&mut self) {
        self.scroll_to_bottom = true;
    }

    /// Request that `line` becomes visible on the next render
    pub fn request_scroll_to_line(&mut self, line: usize) {
        self.scroll_to_line = Some(line);
    }

    /// Recompute bounds for a new layout and apply pending requests
    pub fn update(&mut self, total_lines: usize, viewport_height: usize) {
        self.max_scroll = total_lines.saturating_sub(viewport_height);

        if let Some(line) = self.scroll_to_line.take() {
            self.offset = line;
        }
        if std::mem::take(&mut self.scroll_to_bottom) {
            self.offset = self.max_scroll;
        }
        self.offset = self.offset.min(self.max_scroll);
    }

    /// Lines between the bottom of the viewport and the end of the transcript
    pub fn distance_from_bottom(&self) -> usize {
        self.max_scroll.saturating_sub(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_is_clamped() {
        let mut scroll = ScrollState::new();
        scroll.update(50, 20);
        assert_eq!(scroll.max_scroll, 30);

        scroll.scroll_down(100);
        assert_eq!(scroll.offset, 30);
        assert_eq!(scroll.distance_from_bottom(), 0);

        scroll.scroll_up(12);
        assert_eq!(scroll.distance_from_bottom(), 12);
    }

    #[test]
    fn test_pending_requests_apply_on_update() {
        let mut scroll = ScrollState::new();
        scroll.request_scroll_to_line(10);
        scroll.update(100, 20);
        assert_eq!(scroll.offset, 10);

        scroll.request_scroll_to_bottom();
        scroll.update(120, 20);
        assert_eq!(scroll.offset, 100);
    }

    #[test]
    fn test_shrinking_content_pulls_offset_back() {
        let mut scroll = ScrollState::new();
        scroll.update(100, 20);
        scroll.scroll_down(80);
        scroll.update(30, 20);
        assert_eq!(scroll.offset, 10);
    }
}
