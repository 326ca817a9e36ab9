//! Paced reveal of a prepared answer

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::citations::CitationIndex;
use super::markup::Markup;
use super::tab::Tab;
use super::text::{copy_text, reveal_units, strip_boilerplate};
use crate::api::{AnswerPayload, Mode, SourceItem};
use crate::constants::render as defaults;

/// Everything the display needs to show one terminal answer
#[derive(Debug, Clone)]
pub struct PreparedAnswer {
    pub mode: Mode,
    /// Answer text after boilerplate stripping, kept for copying
    pub markdown: String,
    /// Formatted markup with citation links, revealed in units
    pub markup: String,
    pub citations: CitationIndex,
    pub sources: Vec<SourceItem>,
    pub articles: Vec<SourceItem>,
    pub books: Vec<SourceItem>,
    /// Research progress steps seen before the answer (raw)
    pub steps: Vec<String>,
    pub ask_expert: bool,
    pub tabs: Vec<Tab>,
}

impl PreparedAnswer {
    pub fn copy_text(&self, query: &str) -> String {
        copy_text(query, &self.markdown, &self.sources)
    }
}

/// How a reveal loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed { units: usize },
    Stopped { units: usize },
}

/// Receives revealed units as they are paced out
pub trait RevealSink: Send {
    /// Append one unit (a word plus its trailing space) to the answer
    fn append(&mut self, unit: &str);

    /// Ask the display to follow the newest content
    fn follow(&mut self);
}

/// Formats terminal payloads and paces them onto the display
pub struct Renderer {
    markup: Arc<dyn Markup>,
    delay: Duration,
    follow_every: usize,
}

impl Renderer {
    pub fn new(markup: Arc<dyn Markup>) -> Self {
        Self {
            markup,
            delay: defaults::REVEAL_DELAY,
            follow_every: defaults::FOLLOW_EVERY_WORDS,
        }
    }

    pub fn with_pacing(mut self, delay: Duration, follow_every: usize) -> Self {
        self.delay = delay;
        self.follow_every = follow_every.max(1);
        self
    }

    pub fn markup(&self) -> &Arc<dyn Markup> {
        &self.markup
    }

    /// Strip, format and link a payload.
    ///
    /// The citation index comes only from this payload's sources.
    pub fn prepare(&self, payload: AnswerPayload, mode: Mode, steps: Vec<String>) -> PreparedAnswer {
        let markdown = strip_boilerplate(&payload.answer);
        let citations = CitationIndex::from_sources(&payload.sources);
        let formatted = self.markup.format(&markdown);
        let markup = citations.link(&formatted, self.markup.as_ref());

        let mut tabs = vec![Tab::primary(mode)];
        if !payload.sources.is_empty() {
            tabs.push(Tab::Sources);
        }
        if !payload.articles.is_empty() {
            tabs.push(Tab::Articles);
        }
        if !payload.books.is_empty() {
            tabs.push(Tab::Books);
        }
        if mode == Mode::Research && !steps.is_empty() {
            tabs.push(Tab::Steps);
        }

        PreparedAnswer {
            mode,
            markdown,
            markup,
            citations,
            sources: payload.sources,
            articles: payload.articles,
            books: payload.books,
            steps,
            ask_expert: payload.ask_expert,
            tabs,
        }
    }

    /// Reveal `prepared` one unit per tick until done or `stop` fires.
    ///
    /// A stop leaves the already revealed prefix in place.
    pub async fn reveal(
        &self,
        prepared: &PreparedAnswer,
        sink: &mut dyn RevealSink,
        stop: &CancellationToken,
    ) -> RevealOutcome {
        let mut units = 0usize;
        for word in reveal_units(&prepared.markup) {
            if stop.is_cancelled() {
                debug!(units, "Reveal stopped");
                return RevealOutcome::Stopped { units };
            }

            let mut unit = String::with_capacity(word.len() + 1);
            unit.push_str(word);
            unit.push(' ');
            sink.append(&unit);
            units += 1;

            if units % self.follow_every == 0 {
                sink.follow();
            }

            tokio::select! {
                biased;
                _ = stop.cancelled() => {
                    debug!(units, "Reveal stopped");
                    return RevealOutcome::Stopped { units };
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
        RevealOutcome::Completed { units }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::markup::HtmlMarkup;

    #[derive(Default)]
    struct Recorder {
        text: String,
        units: usize,
        follows: usize,
    }

    impl RevealSink for Recorder {
        fn append(&mut self, unit: &str) {
            self.text.push_str(unit);
            self.units += 1;
        }

        fn follow(&mut self) {
            self.follows += 1;
        }
    }

    fn renderer() -> Renderer {
        Renderer::new(Arc::new(HtmlMarkup))
    }

    fn source(url: &str) -> SourceItem {
        SourceItem {
            url: url.into(),
            title: "T".into(),
            snippet: String::new(),
        }
    }

    #[test]
    fn test_prepare_tabs_follow_lists() {
        let payload = AnswerPayload {
            answer: "Hi [1]".into(),
            sources: vec![source("https://x")],
            books: vec![source("https://b")],
            ..Default::default()
        };
        let prepared = renderer().prepare(payload.clone(), Mode::Search, Vec::new());
        assert_eq!(prepared.tabs, vec![Tab::Answer, Tab::Sources, Tab::Books]);
        assert!(prepared.markup.contains(r#"href="https://x""#));

        let prepared = renderer().prepare(payload, Mode::Research, vec!["one".into()]);
        assert_eq!(
            prepared.tabs,
            vec![Tab::Research, Tab::Sources, Tab::Books, Tab::Steps]
        );
    }

    #[test]
    fn test_prepare_text_only_has_single_tab() {
        let prepared = renderer().prepare(AnswerPayload::text_only("Oops"), Mode::Search, Vec::new());
        assert_eq!(prepared.tabs, vec![Tab::Answer]);
        assert!(prepared.citations.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_paces_every_unit() {
        let renderer = renderer().with_pacing(Duration::from_millis(20), 2);
        let prepared = renderer.prepare(AnswerPayload::text_only("a b c d e"), Mode::Search, Vec::new());
        let mut sink = Recorder::default();
        let started = tokio::time::Instant::now();

        let outcome = renderer
            .reveal(&prepared, &mut sink, &CancellationToken::new())
            .await;

        let expected_units = prepared.markup.split(' ').count();
        assert_eq!(outcome, RevealOutcome::Completed { units: expected_units });
        assert_eq!(sink.units, expected_units);
        assert_eq!(sink.follows, expected_units / 2);
        assert_eq!(sink.text.trim_end(), prepared.markup.trim_end());
        assert!(started.elapsed() >= Duration::from_millis(20 * expected_units as u64));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_stops_without_touching_prefix() {
        let renderer = Arc::new(renderer());
        let long: Vec<String> = (0..200).map(|i| format!("w{i}")).collect();
        let prepared = renderer.prepare(AnswerPayload::text_only(long.join(" ")), Mode::Search, Vec::new());
        let stop = CancellationToken::new();

        let stopper = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(105)).await;
            stopper.cancel();
        });

        let mut sink = Recorder::default();
        let outcome = renderer.reveal(&prepared, &mut sink, &stop).await;

        let RevealOutcome::Stopped { units } = outcome else {
            panic!("expected a stopped reveal, got {outcome:?}");
        };
        assert!(units > 0 && units < 200);
        assert_eq!(sink.units, units);
        assert!(prepared.markup.starts_with(&sink.text));
    }

    #[tokio::test]
    async fn test_reveal_with_stop_already_signalled_writes_nothing() {
        let renderer = renderer();
        let prepared = renderer.prepare(AnswerPayload::text_only("a b"), Mode::Search, Vec::new());
        let stop = CancellationToken::new();
        stop.cancel();
        let mut sink = Recorder::default();
        assert_eq!(
            renderer.reveal(&prepared, &mut sink, &stop).await,
            RevealOutcome::Stopped { units: 0 }
        );
        assert!(sink.text.is_empty());
    }
}
