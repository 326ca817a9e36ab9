//! Per-answer citation lookup

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::markup::Markup;
use crate::api::SourceItem;

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("valid regex"));

/// 1-based citation number to source, built fresh for every answer.
#[derive(Debug, Clone, Default)]
pub struct CitationIndex {
    entries: BTreeMap<usize, SourceItem>,
}

impl CitationIndex {
    pub fn from_sources(sources: &[SourceItem]) -> Self {
        let entries = sources
            .iter()
            .enumerate()
            .map(|(index, source)| (index + 1, source.clone()))
            .collect();
        Self { entries }
    }

    pub fn resolve(&self, number: usize) -> Option<&SourceItem> {
        self.entries.get(&number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every resolvable `[n]` in `formatted` with a link.
    ///
    /// Markers without an entry stay literal text.
    pub fn link(&self, formatted: &str, markup: &dyn Markup) -> String {
        MARKER
            .replace_all(formatted, |caps: &Captures| {
                let resolved = caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|number| self.resolve(number).map(|source| (number, source)));
                match resolved {
                    Some((number, source)) => markup.citation_link(number, source),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
