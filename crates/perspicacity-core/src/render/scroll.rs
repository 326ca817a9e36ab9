//! Scroll-follow policy
//!
//! Follow requests during a reveal are honored only while the reader is
//! near the bottom of the transcript.

use crate::constants::render::SCROLL_THRESHOLD;

/// Tracks whether the reader has scrolled away from the newest content
#[derive(Debug, Clone)]
pub struct ScrollFollow {
    /// Distance from the bottom beyond which follows are suppressed
    threshold: usize,
    /// Set once the reader scrolls further than `threshold` from the bottom
    scrolled_away: bool,
}

impl ScrollFollow {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            scrolled_away: false,
        }
    }

    /// Record a reader-initiated scroll ending `distance_from_bottom` away
    pub fn on_user_scroll(&mut self, distance_from_bottom: usize) {
        self.scrolled_away = distance_from_bottom > self.threshold;
    }

    /// Whether a follow request should move the view
    pub fn should_follow(&self) -> bool {
        !self.scrolled_away
    }

    pub fn is_scrolled_away(&self) -> bool {
        self.scrolled_away
    }

    /// New submissions and regenerations start following again
    pub fn reset(&mut self) {
        self.scrolled_away = false;
    }
}

impl Default for ScrollFollow {
    fn default() -> Self {
        Self::new(SCROLL_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_until_scrolled_past_threshold() {
        let mut follow = ScrollFollow::new(100);
        assert!(follow.should_follow());

        follow.on_user_scroll(100);
        assert!(follow.should_follow());

        follow.on_user_scroll(101);
        assert!(!follow.should_follow());

        follow.on_user_scroll(3);
        assert!(follow.should_follow());
    }

    #[test]
    fn test_reset_restores_following() {
        let mut follow = ScrollFollow::default();
        follow.on_user_scroll(10_000);
        assert!(follow.is_scrolled_away());
        follow.reset();
        assert!(follow.should_follow());
    }
}
