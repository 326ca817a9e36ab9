//! Plain-text transforms applied around the markup engine

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::SourceItem;

static SOURCES_TRAILER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\n\nSources:\s*\[.*?\]\(.*?\).*$").expect("valid regex"));
static DISCLAIMER_RULED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\n\n---\n\*This answer is AI-generated.*$").expect("valid regex")
});
static DISCLAIMER_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)This answer is AI-generated.*$").expect("valid regex"));

static CITATION_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

// Applied in order when cleaning a research step
static STEP_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\*\*\*(.*?)\*\*\*", "$1"),
        (r"\*\*(.*?)\*\*", "$1"),
        (r"\*(.*?)\*", "$1"),
        (r"_(.*?)_", "$1"),
        (r"`(.*?)`", "$1"),
        (r#"["']"#, ""),
        (r"#+\s*", ""),
        (r"^\d+\.\s*", ""),
        (r"^[-*+]\s*", ""),
        (r"\[\d+\]", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
    .collect()
});

/// Remove trailing source listings and generated-content disclaimers.
///
/// Repeated until nothing changes, so `strip(strip(t)) == strip(t)`.
pub fn strip_boilerplate(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let text = SOURCES_TRAILER.replace(text, "");
    let text = DISCLAIMER_RULED.replace(&text, "");
    DISCLAIMER_BARE.replace(&text, "").into_owned()
}

/// Split formatted markup into reveal units on single spaces.
///
/// Units may cut through a tag; the display surface accepts partial markup.
pub fn reveal_units(markup: &str) -> impl Iterator<Item = &str> {
    markup.split(' ')
}

/// Drop `[n]` markers and collapse runs of whitespace
pub fn strip_citation_markers(text: &str) -> String {
    let without = CITATION_MARKER.replace_all(text, "");
    collapse_whitespace(&without)
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Strip emphasis, headings, list bullets, quotes and citation markers
/// from a research progress status.
pub fn clean_step(status: &str) -> String {
    let mut text = status.to_string();
    for (rule, replacement) in STEP_RULES.iter() {
        text = rule.replace_all(&text, *replacement).into_owned();
    }
    collapse_whitespace(&text)
}

/// Clipboard text: the query, the answer and a numbered citation list.
pub fn copy_text(query: &str, markdown: &str, sources: &[SourceItem]) -> String {
    let mut out = format!("{query}\n\n{}\n\n", markdown.trim());
    if !sources.is_empty() {
        out.push_str("Citations:\n");
        for (index, source) in sources.iter().enumerate() {
            out.push_str(&format!("[{}] {}\n", index + 1, source.url));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_sources_trailer() {
        let text = "Answer body.\n\nSources: [Site](https://x) and more";
        assert_eq!(strip_boilerplate(text), "Answer body.");
    }

    #[test]
    fn test_strip_removes_disclaimers() {
        let ruled = "Body\n\n---\n*This answer is AI-generated. Verify it.*";
        assert_eq!(strip_boilerplate(ruled), "Body");

        let bare = "Body. This answer is AI-generated and may be wrong.";
        assert_eq!(strip_boilerplate(bare), "Body. ");
    }

    #[test]
    fn test_strip_leaves_plain_text_alone() {
        let text = "Nothing to remove [1].\n\nSecond paragraph.";
        assert_eq!(strip_boilerplate(text), text);
    }

    #[test]
    fn test_strip_is_idempotent() {
        let samples = [
            "A\n\nSources: [a](b)\n\n---\n*This answer is AI-generated*",
            "A This answer is AI-generated\n\nSources: [x](y)",
            "\n\nSources: [only](trailer)",
            "",
            "plain",
        ];
        for sample in samples {
            let once = strip_boilerplate(sample);
            assert_eq!(strip_boilerplate(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn test_reveal_units_rejoin_to_original() {
        let markup = "<p>Hi <a href=\"u\">[1]</a></p>";
        let rejoined: Vec<&str> = reveal_units(markup).collect();
        assert_eq!(rejoined.join(" "), markup);
        assert_eq!(rejoined.len(), 3);
    }

    #[test]
    fn test_strip_citation_markers() {
        assert_eq!(
            strip_citation_markers("Paris [1] is   the capital [12].\n"),
            "Paris is the capital ."
        );
    }

    #[test]
    fn test_clean_step() {
        assert_eq!(clean_step("1. **Searching** for `tafsir` [2]"), "Searching for tafsir");
        assert_eq!(clean_step("- ## Reading \"sources\""), "Reading sources");
        assert_eq!(clean_step("***Bold*** and _soft_"), "Bold and soft");
    }

    #[test]
    fn test_copy_text_lists_citations() {
        let sources = vec![
            SourceItem {
                url: "https://a".into(),
                title: "A".into(),
                snippet: String::new(),
            },
            SourceItem {
                url: "https://b".into(),
                title: "B".into(),
                snippet: String::new(),
            },
        ];
        assert_eq!(
            copy_text("Q?", "Answer", &sources),
            "Q?\n\nAnswer\n\nCitations:\n[1] https://a\n[2] https://b\n"
        );
        assert_eq!(copy_text("Q?", "Answer", &[]), "Q?\n\nAnswer\n\n");
    }

    #[test]
    fn test_copy_text_trims_stripped_answer() {
        let body = strip_boilerplate("Body. This answer is AI-generated and may be wrong.");
        assert_eq!(copy_text("Q?", &body, &[]), "Q?\n\nBody.\n\n");
        assert_eq!(copy_text("Q?", "\n  Answer \n", &[]), "Q?\n\nAnswer\n\n");
    }
}
