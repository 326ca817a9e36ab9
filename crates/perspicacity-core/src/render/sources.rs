//! Source cards for the Sources, Articles and Books tabs

use url::Url;

use crate::api::SourceItem;
use crate::constants::render::{CARD_SNIPPET_CHARS, CARD_TITLE_CHARS, INITIAL_SOURCE_CARDS};

/// Display form of one source item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCard {
    /// 1-based position in its list
    pub number: usize,
    pub title: String,
    pub url: String,
    /// Host without a leading `www.`, or the raw URL when it does not parse
    pub domain: String,
    pub snippet: String,
}

impl SourceCard {
    pub fn new(number: usize, item: &SourceItem) -> Self {
        let title = if item.title.is_empty() {
            item.url.clone()
        } else {
            truncate(&item.title, CARD_TITLE_CHARS)
        };
        Self {
            number,
            title,
            url: item.url.clone(),
            domain: domain_of(&item.url),
            snippet: truncate(&item.snippet, CARD_SNIPPET_CHARS),
        }
    }
}

/// Cards for `items`, capped at the initial count unless `expanded`.
///
/// The second value is how many cards remain hidden.
pub fn cards(items: &[SourceItem], expanded: bool) -> (Vec<SourceCard>, usize) {
    let shown = if expanded {
        items.len()
    } else {
        items.len().min(INITIAL_SOURCE_CARDS)
    };
    let cards = items
        .iter()
        .take(shown)
        .enumerate()
        .map(|(index, item)| SourceCard::new(index + 1, item))
        .collect();
    (cards, items.len() - shown)
}

pub fn domain_of(raw: &str) -> String {
    match Url::parse(raw).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => host.strip_prefix("www.").unwrap_or(host.as_str()).to_string(),
        None => raw.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, title: &str, snippet: &str) -> SourceItem {
        SourceItem {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }

    #[test]
    fn test_domain_strips_www() {
        assert_eq!(domain_of("https://www.example.org/a?b"), "example.org");
        assert_eq!(domain_of("https://docs.rs/x"), "docs.rs");
        assert_eq!(domain_of("not a url"), "not a url");
    }

    #[test]
    fn test_card_truncates_long_fields() {
        let long_title = "t".repeat(120);
        let long_snippet = "s".repeat(151);
        let card = SourceCard::new(1, &item("https://x", &long_title, &long_snippet));
        assert_eq!(card.title.chars().count(), 103);
        assert!(card.title.ends_with("..."));
        assert_eq!(card.snippet.len(), 153);

        let exact = SourceCard::new(2, &item("https://x", &"t".repeat(100), "short"));
        assert_eq!(exact.title.len(), 100);
        assert_eq!(exact.snippet, "short");
    }

    #[test]
    fn test_cards_cap_until_expanded() {
        let items: Vec<SourceItem> = (0..8)
            .map(|i| item(&format!("https://s{i}.test"), "t", ""))
            .collect();
        let (shown, hidden) = cards(&items, false);
        assert_eq!(shown.len(), 5);
        assert_eq!(hidden, 3);
        assert_eq!(shown[4].number, 5);

        let (shown, hidden) = cards(&items, true);
        assert_eq!(shown.len(), 8);
        assert_eq!(hidden, 0);
    }
}
