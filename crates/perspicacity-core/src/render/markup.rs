//! Markup production and read-back
//!
//! Text-to-markup conversion is delegated to a markdown engine. The same
//! abstraction reads plain text back out of written markup, which is what
//! history reconstruction consumes.

use pulldown_cmark::{html, Options, Parser};
use scraper::Html;

use crate::api::SourceItem;

/// Formatting backend for the display surface
pub trait Markup: Send + Sync {
    /// Convert answer markdown to markup
    fn format(&self, markdown: &str) -> String;

    /// Clickable reference for citation `[number]`
    fn citation_link(&self, number: usize, source: &SourceItem) -> String;

    /// Neutral, non-error notice (e.g. "Generation stopped.")
    fn notice(&self, text: &str) -> String;

    /// Plain text a reader would see, the way a DOM reports `textContent`
    fn text_content(&self, markup: &str) -> String;
}

/// HTML markup produced with pulldown-cmark
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkup;

impl Markup for HtmlMarkup {
    fn format(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(markdown, options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    fn citation_link(&self, number: usize, source: &SourceItem) -> String {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener" class="inline-citation" title="{}">[{}]</a>"#,
            escape_attr(&source.url),
            escape_attr(&source.title),
            number
        )
    }

    fn notice(&self, text: &str) -> String {
        format!(r#"<p class="notice">{}</p>"#, escape_attr(text))
    }

    fn text_content(&self, markup: &str) -> String {
        let fragment = Html::parse_fragment(markup);
        fragment.root_element().text().collect()
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_keeps_citation_markers_literal() {
        let html = HtmlMarkup.format("Hi [1]");
        assert_eq!(html.trim(), "<p>Hi [1]</p>");
    }

    #[test]
    fn test_citation_link_escapes_attributes() {
        let source = SourceItem {
            url: "https://x/?a=1&b=2".into(),
            title: "Say \"hi\"".into(),
            snippet: String::new(),
        };
        let link = HtmlMarkup.citation_link(3, &source);
        assert!(link.contains(r#"href="https://x/?a=1&amp;b=2""#));
        assert!(link.contains(r#"title="Say &quot;hi&quot;""#));
        assert!(link.ends_with(">[3]</a>"));
    }

    #[test]
    fn test_text_content_reads_back_visible_text() {
        let html = "<h2>Title</h2><p>One &amp; <strong>two</strong> \
                    <a href=\"https://x\" class=\"inline-citation\">[1]</a></p>";
        assert_eq!(HtmlMarkup.text_content(html), "TitleOne & two [1]");
    }

    #[test]
    fn test_text_content_tolerates_partial_markup() {
        let partial = "<p>Hello <a href=\"https://x\" ";
        assert_eq!(HtmlMarkup.text_content(partial).trim(), "Hello");
    }
}
