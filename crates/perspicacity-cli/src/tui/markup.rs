//! Paint answer markup to styled terminal lines
//!
//! Answers arrive as the HTML produced by the core formatter. This walks the
//! fragment with `scraper`, maps the handful of elements the formatter emits
//! onto ratatui styles and word-wraps the result.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use scraper::{ElementRef, Html, Node};
use unicode_width::UnicodeWidthStr;

use crate::tui::theme::Theme;

/// Render an HTML fragment to lines at most `width` columns wide
pub fn paint(html: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let fragment = Html::parse_fragment(html);
    let mut painter = Painter::new(width.max(8), theme);
    painter.walk(fragment.root_element());
    painter.finish()
}

struct Painter<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    current_width: usize,
    styles: Vec<Style>,
    /// Left indent for lists and quotes
    indent: usize,
    /// Bullet waiting for the first line of a list item
    marker: Option<String>,
    /// Counters for enclosing lists; `None` for unordered
    lists: Vec<Option<usize>>,
    preformatted: bool,
    quote_depth: usize,
}

impl<'t> Painter<'t> {
    fn new(width: usize, theme: &'t Theme) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            current: Vec::new(),
            current_width: 0,
            styles: vec![Style::default().fg(theme.text_color)],
            indent: 0,
            marker: None,
            lists: Vec::new(),
            preformatted: false,
            quote_depth: 0,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                self.element(child_element);
            } else if let Node::Text(text) = child.value() {
                self.text(text);
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let value = element.value();
        let base = self.style();
        match value.name() {
            "p" => {
                self.block_start();
                let style = if value.classes().any(|c| c == "notice") {
                    base.fg(self.theme.dim_color).add_modifier(Modifier::ITALIC)
                } else {
                    base
                };
                self.styled(element, style);
                self.block_end();
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.block_start();
                let style = base
                    .fg(self.theme.accent_color)
                    .add_modifier(Modifier::BOLD);
                self.styled(element, style);
                self.block_end();
            }
            "strong" | "b" => self.styled(element, base.add_modifier(Modifier::BOLD)),
            "em" | "i" => self.styled(element, base.add_modifier(Modifier::ITALIC)),
            "del" | "s" => self.styled(element, base.add_modifier(Modifier::CROSSED_OUT)),
            "code" => self.styled(element, base.fg(self.theme.accent_color)),
            "a" => {
                let style = if value.classes().any(|c| c == "inline-citation") {
                    base.fg(self.theme.link_color)
                } else {
                    base.fg(self.theme.link_color)
                        .add_modifier(Modifier::UNDERLINED)
                };
                self.styled(element, style);
            }
            "br" => self.flush(),
            "hr" => {
                self.block_start();
                let rule = "─".repeat(self.width.saturating_sub(self.indent).min(40));
                self.push_word(&rule, base.fg(self.theme.dim_color));
                self.block_end();
            }
            "ul" | "ol" => {
                self.block_start();
                let start = value
                    .attr("start")
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(1);
                self.lists
                    .push((value.name() == "ol").then_some(start));
                self.indent += 2;
                self.walk(element);
                self.indent -= 2;
                self.lists.pop();
                self.block_end();
            }
            "li" => {
                self.flush();
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let bullet = format!("{n}. ");
                        *n += 1;
                        bullet
                    }
                    _ => "• ".to_string(),
                };
                self.marker = Some(bullet);
                self.walk(element);
                self.flush();
            }
            "blockquote" => {
                self.block_start();
                self.quote_depth += 1;
                self.styled(element, base.fg(self.theme.dim_color));
                self.quote_depth -= 1;
                self.block_end();
            }
            "pre" => {
                self.block_start();
                self.preformatted = true;
                self.styled(element, base.fg(self.theme.accent_color));
                self.preformatted = false;
                self.block_end();
            }
            "tr" => {
                self.flush();
                let mut first = true;
                for cell in element.children().filter_map(ElementRef::wrap) {
                    if !first {
                        self.push_word(" │ ", base.fg(self.theme.dim_color));
                    }
                    first = false;
                    let style = if cell.value().name() == "th" {
                        base.add_modifier(Modifier::BOLD)
                    } else {
                        base
                    };
                    self.styled(cell, style);
                }
                self.flush();
            }
            "table" => {
                self.block_start();
                self.walk(element);
                self.block_end();
            }
            _ => self.walk(element),
        }
    }

    fn styled(&mut self, element: ElementRef<'_>, style: Style) {
        self.styles.push(style);
        self.walk(element);
        self.styles.pop();
    }

    fn text(&mut self, text: &str) {
        let style = self.style();
        if self.preformatted {
            let mut parts = text.split('\n').peekable();
            while let Some(part) = parts.next() {
                if !part.is_empty() {
                    self.push_raw(part, style);
                }
                if parts.peek().is_some() {
                    self.flush();
                }
            }
            return;
        }

        if text.starts_with(char::is_whitespace) {
            self.space(style);
        }
        let mut words = text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            self.push_word(word, style);
            if words.peek().is_some() {
                self.space(style);
            }
        }
        if text.ends_with(char::is_whitespace) && !text.trim().is_empty() {
            self.space(style);
        }
    }

    fn line_start_width(&self) -> usize {
        self.indent + self.quote_depth * 2
    }

    fn open_line(&mut self) {
        if !self.current.is_empty() {
            return;
        }
        let mut prefix = " ".repeat(self.indent);
        if self.quote_depth > 0 {
            prefix.push_str(&"│ ".repeat(self.quote_depth));
        }
        let marker = self.marker.take();
        if let Some(marker) = &marker {
            // The bullet hangs in the indent
            let keep = prefix.chars().count().saturating_sub(marker.width());
            prefix = prefix.chars().take(keep).collect();
        }
        let prefix_style = Style::default().fg(self.theme.dim_color);
        if !prefix.is_empty() {
            self.current_width += prefix.width();
            self.current.push(Span::styled(prefix, prefix_style));
        }
        if let Some(marker) = marker {
            self.current_width += marker.width();
            self.current.push(Span::styled(marker, prefix_style));
        }
    }

    fn space(&mut self, style: Style) {
        // No leading spaces on a line
        if self.current_width <= self.line_start_width() || self.current.is_empty() {
            return;
        }
        if self
            .current
            .last()
            .is_some_and(|span| span.content.ends_with(' '))
        {
            return;
        }
        self.current_width += 1;
        self.current.push(Span::styled(" ", style));
    }

    fn push_word(&mut self, word: &str, style: Style) {
        let word_width = word.width();
        if !self.current.is_empty()
            && self.current_width > self.line_start_width()
            && self.current_width + word_width > self.width
        {
            // Drop the trailing space before wrapping
            if self
                .current
                .last()
                .is_some_and(|span| span.content.as_ref() == " ")
            {
                self.current.pop();
            }
            self.flush();
        }
        self.push_raw(word, style);
    }

    fn push_raw(&mut self, text: &str, style: Style) {
        self.open_line();
        self.current_width += text.width();
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        while self
            .current
            .last()
            .is_some_and(|span| span.content.as_ref() == " ")
        {
            self.current.pop();
        }
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
        self.current_width = 0;
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::from(""));
        }
    }

    fn block_start(&mut self) {
        self.flush();
        if self.lists.is_empty() {
            self.blank();
        }
    }

    fn block_end(&mut self) {
        self.flush();
        if self.lists.is_empty() {
            self.blank();
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_paragraphs_are_separated() {
        let lines = paint("<p>Hello <strong>world</strong></p>\n<p>Second</p>", 80, &Theme::default());
        assert_eq!(text_of(&lines), vec!["Hello world", "", "Second"]);
        assert!(lines[0].spans[2].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_long_paragraph_wraps() {
        let lines = paint("<p>alpha beta gamma delta</p>", 11, &Theme::default());
        assert_eq!(text_of(&lines), vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_lists_get_markers() {
        let lines = paint(
            "<ul><li>one</li><li>two</li></ul><ol start=\"3\"><li>three</li></ol>",
            80,
            &Theme::default(),
        );
        let text = text_of(&lines);
        assert_eq!(text[0], "• one");
        assert_eq!(text[1], "• two");
        assert!(text.contains(&"3. three".to_string()));
    }

    #[test]
    fn test_citation_links_keep_their_label() {
        let html = "<p>Fact <a href=\"https://a.example\" class=\"inline-citation\">[1]</a>.</p>";
        let lines = paint(html, 80, &Theme::default());
        assert_eq!(text_of(&lines), vec!["Fact [1]."]);
        let link = lines[0]
            .spans
            .iter()
            .find(|s| s.content.as_ref() == "[1]")
            .map(|s| s.style.fg);
        assert_eq!(link, Some(Some(Theme::default().link_color)));
    }

    #[test]
    fn test_partial_reveal_renders() {
        // Mid-reveal markup is cut at a word boundary
        let lines = paint("<p>The answer is <strong>still", 80, &Theme::default());
        assert_eq!(text_of(&lines), vec!["The answer is still"]);
    }

    #[test]
    fn test_preformatted_keeps_lines() {
        let lines = paint("<pre><code>a\n  b\n</code></pre>", 80, &Theme::default());
        assert_eq!(text_of(&lines), vec!["a", "  b"]);
    }
}
