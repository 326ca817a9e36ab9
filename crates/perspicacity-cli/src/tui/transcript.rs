//! Transcript layout
//!
//! Lays every turn out as styled lines and records where each turn starts,
//! so the app can scroll a turn into view and slice the visible window.

use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use perspicacity_core::render::sources::cards;
use perspicacity_core::render::{Markup, Tab};
use perspicacity_core::transcript::{AnswerView, AssistantTurn, UserTurn};
use perspicacity_core::{Entry, Transcript, TurnId};

use crate::tui::markup::paint;
use crate::tui::theme::Theme;
use crate::tui::utils::wrap_text;

/// Columns taken by the selection gutter
const GUTTER: usize = 2;

pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub markup: &'a dyn Markup,
    pub width: usize,
    pub selected: Option<TurnId>,
    pub spinner: &'a str,
}

#[derive(Default)]
pub struct TranscriptLines {
    pub lines: Vec<Line<'static>>,
    /// First line of each turn
    pub offsets: HashMap<TurnId, usize>,
}

pub fn layout(transcript: &Transcript, ctx: &RenderContext<'_>) -> TranscriptLines {
    let mut out = TranscriptLines::default();

    if transcript.turn_count() == 0 {
        out.lines = welcome(ctx);
        return out;
    }

    let inner = ctx.width.saturating_sub(GUTTER).max(10);
    for (index, entry) in transcript.entries().iter().enumerate() {
        let body = match entry {
            // The opening marker is implied
            Entry::ConversationStart if index == 0 => continue,
            Entry::ConversationStart => conversation_start(ctx),
            Entry::User(turn) => user_lines(turn, inner, ctx),
            Entry::Assistant(turn) => assistant_lines(turn, inner, ctx),
        };

        if let Some(id) = entry.id() {
            out.offsets.insert(id, out.lines.len());
        }
        let gutter = match entry.id() {
            Some(id) if ctx.selected == Some(id) => {
                Span::styled("▌ ", Style::default().fg(ctx.theme.accent_color))
            }
            _ => Span::raw("  "),
        };
        for line in body {
            let mut spans = vec![gutter.clone()];
            spans.extend(line.spans);
            out.lines.push(Line::from(spans));
        }
        out.lines.push(Line::from(""));
    }
    out
}

fn welcome(ctx: &RenderContext<'_>) -> Vec<Line<'static>> {
    let dim = Style::default().fg(ctx.theme.dim_color);
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Perspicacity",
            Style::default()
                .fg(ctx.theme.accent_color)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("  Ask a question and press Enter.", dim)),
        Line::from(Span::styled(
            "  Tab switches between Search and Research. /help lists the keys.",
            dim,
        )),
    ]
}

fn conversation_start(ctx: &RenderContext<'_>) -> Vec<Line<'static>> {
    let label = " New conversation ";
    let side = ctx.width.saturating_sub(label.len() + GUTTER) / 2;
    vec![Line::from(Span::styled(
        format!("{}{}{}", "─".repeat(side), label, "─".repeat(side)),
        Style::default().fg(ctx.theme.dim_color),
    ))]
}

fn header(name: &str, detail: &str, color: Color, ctx: &RenderContext<'_>) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            name.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" · {detail}"),
            Style::default().fg(ctx.theme.dim_color),
        ),
    ])
}

fn user_lines(turn: &UserTurn, width: usize, ctx: &RenderContext<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match &turn.draft {
        Some(draft) => {
            lines.push(header(
                "You",
                "editing: Enter confirms, Esc cancels",
                ctx.theme.warning_color,
                ctx,
            ));
            for line in wrap_text(draft, width) {
                lines.push(Line::from(Span::styled(
                    line,
                    Style::default().fg(ctx.theme.warning_color),
                )));
            }
        }
        None => {
            lines.push(header("You", turn.mode.label(), ctx.theme.user_color, ctx));
            for line in wrap_text(&turn.query, width) {
                lines.push(Line::from(Span::styled(
                    line,
                    Style::default().fg(ctx.theme.text_color),
                )));
            }
        }
    }
    lines
}

fn assistant_lines(
    turn: &AssistantTurn,
    width: usize,
    ctx: &RenderContext<'_>,
) -> Vec<Line<'static>> {
    let view = &turn.view;
    let mut lines = vec![header(
        "Perspicacity",
        turn.mode.label(),
        ctx.theme.accent_color,
        ctx,
    )];

    indicator_lines(view, width, ctx, &mut lines);

    if view.has_answer_area() {
        if view.tabs.len() > 1 {
            lines.push(tab_bar(view, ctx));
            lines.push(Line::from(""));
        }
        let active = view.active_tab.unwrap_or(Tab::primary(turn.mode));
        match active {
            Tab::Answer | Tab::Research => {
                lines.extend(paint(view.answer.as_deref().unwrap_or(""), width, ctx.theme));
            }
            Tab::Sources | Tab::Articles | Tab::Books => {
                card_lines(view, active, width, ctx, &mut lines);
            }
            Tab::Steps => {
                for (i, step) in view.step_log.iter().enumerate() {
                    let numbered = format!("{}. {}", i + 1, step.trim());
                    lines.extend(paint(&ctx.markup.format(&numbered), width, ctx.theme));
                }
            }
        }
    }

    if let Some(actions) = &view.actions {
        let mut hint = format!(
            "Ctrl+Y copy · Ctrl+R regenerate · Alt+R {}",
            turn.mode.toggled().label()
        );
        if actions.ask_expert {
            hint.push_str(" · Ctrl+O ask an expert");
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(ctx.theme.dim_color),
        )));
    }
    lines
}

fn indicator_lines(
    view: &AnswerView,
    width: usize,
    ctx: &RenderContext<'_>,
    lines: &mut Vec<Line<'static>>,
) {
    if let Some(status) = &view.status {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", ctx.spinner),
                Style::default().fg(ctx.theme.accent_color),
            ),
            Span::styled(
                status.clone(),
                Style::default()
                    .fg(ctx.theme.dim_color)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]));
    }
    for step in &view.steps {
        let (mark, color) = if step.completed {
            ("✓".to_string(), ctx.theme.success_color)
        } else {
            (ctx.spinner.to_string(), ctx.theme.accent_color)
        };
        for (i, text) in wrap_text(&step.text, width.saturating_sub(2)).into_iter().enumerate() {
            let lead = if i == 0 { format!("{mark} ") } else { "  ".to_string() };
            lines.push(Line::from(vec![
                Span::styled(lead, Style::default().fg(color)),
                Span::styled(text, Style::default().fg(ctx.theme.dim_color)),
            ]));
        }
    }
}

fn tab_bar(view: &AnswerView, ctx: &RenderContext<'_>) -> Line<'static> {
    let mut spans = Vec::new();
    for tab in &view.tabs {
        let count = match tab {
            Tab::Sources | Tab::Articles | Tab::Books => format!(" ({})", view.list(*tab).len()),
            _ => String::new(),
        };
        let label = format!(" {}{} ", tab.label(), count);
        let style = if view.active_tab == Some(*tab) {
            Style::default()
                .fg(ctx.theme.accent_color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(ctx.theme.dim_color)
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn card_lines(
    view: &AnswerView,
    tab: Tab,
    width: usize,
    ctx: &RenderContext<'_>,
    lines: &mut Vec<Line<'static>>,
) {
    let (shown, hidden) = cards(view.list(tab), view.expanded.contains(&tab));
    for card in shown {
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", card.number),
                Style::default().fg(ctx.theme.link_color),
            ),
            Span::styled(
                card.title,
                Style::default()
                    .fg(ctx.theme.text_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", card.domain),
            Style::default().fg(ctx.theme.link_color),
        )));
        for line in wrap_text(&card.snippet, width.saturating_sub(4)) {
            lines.push(Line::from(Span::styled(
                format!("    {line}"),
                Style::default().fg(ctx.theme.dim_color),
            )));
        }
        lines.push(Line::from(""));
    }
    if hidden > 0 {
        lines.push(Line::from(Span::styled(
            format!("+ {hidden} more (Ctrl+X)"),
            Style::default().fg(ctx.theme.accent_color),
        )));
    } else if view.expanded.contains(&tab) {
        lines.push(Line::from(Span::styled(
            "Show less (Ctrl+X)",
            Style::default().fg(ctx.theme.accent_color),
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perspicacity_core::api::SourceItem;
    use perspicacity_core::render::HtmlMarkup;
    use perspicacity_core::Mode;

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn context<'a>(theme: &'a Theme, markup: &'a HtmlMarkup) -> RenderContext<'a> {
        RenderContext {
            theme,
            markup,
            width: 60,
            selected: None,
            spinner: "*",
        }
    }

    #[test]
    fn test_empty_transcript_shows_welcome() {
        let (theme, markup) = (Theme::default(), HtmlMarkup);
        let out = layout(&Transcript::new(), &context(&theme, &markup));
        assert!(text_of(&out.lines).iter().any(|l| l.contains("Perspicacity")));
        assert!(out.offsets.is_empty());
    }

    #[test]
    fn test_offsets_point_at_turn_headers() {
        let (theme, markup) = (Theme::default(), HtmlMarkup);
        let mut transcript = Transcript::new();
        let (user, assistant) = transcript.push_exchange("What is tawhid?", Mode::Search);
        if let Some(turn) = transcript.assistant_mut(assistant) {
            turn.view.show_status(Mode::Search, "Searching");
        }

        let out = layout(&transcript, &context(&theme, &markup));
        let text = text_of(&out.lines);
        assert!(text[out.offsets[&user]].contains("You · Search"));
        assert!(text[out.offsets[&assistant]].contains("Perspicacity · Search"));
        assert!(text.iter().any(|l| l.contains("* Searching")));
    }

    #[test]
    fn test_sources_tab_caps_cards() {
        let (theme, markup) = (Theme::default(), HtmlMarkup);
        let mut transcript = Transcript::new();
        let (_, assistant) = transcript.push_exchange("q", Mode::Search);
        if let Some(turn) = transcript.assistant_mut(assistant) {
            turn.view.answer = Some("<p>answer</p>".into());
            turn.view.sources = (0..7)
                .map(|i| SourceItem {
                    url: format!("https://www.site{i}.example/page"),
                    title: format!("Title {i}"),
                    snippet: String::new(),
                })
                .collect();
            turn.view.tabs = vec![Tab::Answer, Tab::Sources];
            turn.view.active_tab = Some(Tab::Sources);
        }

        let out = layout(&transcript, &context(&theme, &markup));
        let text = text_of(&out.lines);
        assert!(text.iter().any(|l| l.contains("Sources (7)")));
        assert!(text.iter().any(|l| l.contains("[5] Title 4")));
        assert!(!text.iter().any(|l| l.contains("[6]")));
        assert!(text.iter().any(|l| l.contains("+ 2 more")));
        assert!(text.iter().any(|l| l.contains("site0.example")));
    }

    #[test]
    fn test_selected_turn_gets_gutter() {
        let (theme, markup) = (Theme::default(), HtmlMarkup);
        let mut transcript = Transcript::new();
        let (user, _) = transcript.push_exchange("q", Mode::Research);
        let mut ctx = context(&theme, &markup);
        ctx.selected = Some(user);

        let out = layout(&transcript, &ctx);
        assert!(text_of(&out.lines)[out.offsets[&user]].starts_with("▌ You"));
    }
}
