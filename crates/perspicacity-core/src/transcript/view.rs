//! Answer area state of an assistant turn

use std::collections::HashSet;

use crate::api::{Mode, SourceItem};
use crate::render::{clean_step, copy_text, PreparedAnswer, Tab};

/// One line of the live research indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchStep {
    pub text: String,
    pub completed: bool,
}

/// Actions offered under a finished answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBar {
    /// Clipboard payload for the copy action
    pub copy_text: String,
    /// Offer the ask-a-human-expert link
    pub ask_expert: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerView {
    /// Single-line progress shown in search mode
    pub status: Option<String>,
    /// Live research indicator, newest last
    pub steps: Vec<ResearchStep>,
    /// Raw research statuses for the Steps tab
    pub step_log: Vec<String>,
    /// Primary tab markup. `None` until the answer area exists.
    pub answer: Option<String>,
    pub markdown: String,
    pub sources: Vec<SourceItem>,
    pub articles: Vec<SourceItem>,
    pub books: Vec<SourceItem>,
    pub tabs: Vec<Tab>,
    pub active_tab: Option<Tab>,
    pub ask_expert: bool,
    pub actions: Option<ActionBar>,
    /// List tabs showing every card instead of the first few
    pub expanded: HashSet<Tab>,
}

impl AnswerView {
    /// Reflect a progress status
    pub fn show_status(&mut self, mode: Mode, status: &str) {
        match mode {
            Mode::Search => self.status = Some(status.to_string()),
            Mode::Research => {
                if let Some(last) = self.steps.last_mut() {
                    last.completed = true;
                }
                let text = clean_step(status);
                if !text.is_empty() {
                    self.steps.push(ResearchStep {
                        text,
                        completed: false,
                    });
                }
                self.step_log.push(status.to_string());
            }
        }
    }

    /// Remove the status line and research indicator
    pub fn clear_indicator(&mut self) {
        self.status = None;
        self.steps.clear();
    }

    /// Create the tabbed answer area for a prepared answer, text still empty
    pub fn install(&mut self, prepared: &PreparedAnswer) {
        self.clear_indicator();
        self.answer = Some(String::new());
        self.markdown = prepared.markdown.clone();
        self.sources = prepared.sources.clone();
        self.articles = prepared.articles.clone();
        self.books = prepared.books.clone();
        self.step_log = prepared.steps.clone();
        self.tabs = prepared.tabs.clone();
        self.active_tab = self.tabs.first().copied();
        self.ask_expert = prepared.ask_expert;
        self.expanded.clear();
    }

    /// Append revealed markup to the primary tab
    pub fn append(&mut self, unit: &str) {
        self.answer.get_or_insert_with(String::new).push_str(unit);
    }

    pub fn has_answer_area(&self) -> bool {
        self.answer.is_some()
    }

    pub fn is_answer_empty(&self) -> bool {
        self.answer.as_deref().map_or(true, |a| a.trim().is_empty())
    }

    /// Put `markup` in the answer area if nothing was revealed yet.
    ///
    /// Creates a single primary tab when the area does not exist.
    pub fn install_placeholder(&mut self, mode: Mode, markup: String, text: &str) {
        self.clear_indicator();
        if !self.has_answer_area() {
            self.tabs = vec![Tab::primary(mode)];
            self.active_tab = Some(Tab::primary(mode));
        }
        if self.is_answer_empty() {
            self.answer = Some(markup);
            self.markdown = text.to_string();
        }
    }

    /// Attach the action bar once. Returns false if it already exists.
    pub fn attach_actions(&mut self, query: &str) -> bool {
        if self.actions.is_some() {
            return false;
        }
        self.actions = Some(ActionBar {
            copy_text: copy_text(query, &self.markdown, &self.sources),
            ask_expert: self.ask_expert,
        });
        true
    }

    pub fn select_tab(&mut self, tab: Tab) -> bool {
        if self.tabs.contains(&tab) {
            self.active_tab = Some(tab);
            true
        } else {
            false
        }
    }

    /// Move the active tab by `delta`, wrapping around
    pub fn cycle_tab(&mut self, delta: isize) -> Option<Tab> {
        if self.tabs.is_empty() {
            return None;
        }
        let len = self.tabs.len() as isize;
        let current = self
            .active_tab
            .and_then(|t| self.tabs.iter().position(|x| *x == t))
            .unwrap_or(0) as isize;
        let next = self.tabs[(current + delta).rem_euclid(len) as usize];
        self.active_tab = Some(next);
        Some(next)
    }

    pub fn toggle_expanded(&mut self, tab: Tab) {
        if !self.expanded.remove(&tab) {
            self.expanded.insert(tab);
        }
    }

    pub fn list(&self, tab: Tab) -> &[SourceItem] {
        match tab {
            Tab::Sources => &self.sources,
            Tab::Articles => &self.articles,
            Tab::Books => &self.books,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AnswerPayload;
    use crate::render::{HtmlMarkup, Renderer};
    use std::sync::Arc;

    #[test]
    fn test_research_status_completes_previous_step() {
        let mut view = AnswerView::default();
        view.show_status(Mode::Research, "**Searching** sources");
        view.show_status(Mode::Research, "1. Reading [2]");

        assert_eq!(view.steps.len(), 2);
        assert!(view.steps[0].completed);
        assert!(!view.steps[1].completed);
        assert_eq!(view.steps[1].text, "Reading");
        assert_eq!(view.step_log.len(), 2);
        assert!(view.status.is_none());
    }

    #[test]
    fn test_search_status_replaces_line() {
        let mut view = AnswerView::default();
        view.show_status(Mode::Search, "a");
        view.show_status(Mode::Search, "b");
        assert_eq!(view.status.as_deref(), Some("b"));
        assert!(view.steps.is_empty());
    }

    #[test]
    fn test_install_removes_indicator() {
        let renderer = Renderer::new(Arc::new(HtmlMarkup));
        let prepared = renderer.prepare(AnswerPayload::text_only("x"), Mode::Search, Vec::new());
        let mut view = AnswerView::default();
        view.show_status(Mode::Search, "working");
        view.install(&prepared);

        assert!(view.status.is_none());
        assert_eq!(view.answer.as_deref(), Some(""));
        assert_eq!(view.active_tab, Some(Tab::Answer));
    }

    #[test]
    fn test_placeholder_only_fills_empty_area() {
        let mut view = AnswerView::default();
        view.install_placeholder(Mode::Research, "<p>stopped</p>".into(), "stopped");
        assert_eq!(view.tabs, vec![Tab::Research]);
        assert_eq!(view.answer.as_deref(), Some("<p>stopped</p>"));

        let mut view = AnswerView::default();
        view.append("partial ");
        view.install_placeholder(Mode::Search, "<p>stopped</p>".into(), "stopped");
        assert_eq!(view.answer.as_deref(), Some("partial "));
    }

    #[test]
    fn test_actions_attach_once() {
        let mut view = AnswerView::default();
        view.markdown = "first".into();
        assert!(view.attach_actions("q"));
        view.markdown = "second".into();
        assert!(!view.attach_actions("q"));
        assert_eq!(
            view.actions.as_ref().map(|a| a.copy_text.as_str()),
            Some("q\n\nfirst\n\n")
        );
    }

    #[test]
    fn test_cycle_tab_wraps() {
        let mut view = AnswerView {
            tabs: vec![Tab::Answer, Tab::Sources],
            active_tab: Some(Tab::Answer),
            ..Default::default()
        };
        assert_eq!(view.cycle_tab(1), Some(Tab::Sources));
        assert_eq!(view.cycle_tab(1), Some(Tab::Answer));
        assert_eq!(view.cycle_tab(-1), Some(Tab::Sources));
        assert!(!view.select_tab(Tab::Books));
    }
}
