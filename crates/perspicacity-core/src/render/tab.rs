use serde::{Deserialize, Serialize};

use crate::api::Mode;

/// View tab of an assistant turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tab {
    Answer,
    Research,
    Sources,
    Articles,
    Books,
    Steps,
}

impl Tab {
    /// Tab that carries the answer text for `mode`
    pub fn primary(mode: Mode) -> Tab {
        match mode {
            Mode::Search => Tab::Answer,
            Mode::Research => Tab::Research,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Answer => "Answer",
            Tab::Research => "Research",
            Tab::Sources => "Sources",
            Tab::Articles => "Articles",
            Tab::Books => "Books",
            Tab::Steps => "Steps",
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Tab::Answer | Tab::Research)
    }
}
