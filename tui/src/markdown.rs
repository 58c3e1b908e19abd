//! Minimal markdown rendering for bot replies.
//!
//! Bot text is rendered as styled lines: paragraphs, emphasis, inline code,
//! fenced code blocks, and list items. Anything fancier degrades to plain
//! text rather than failing.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme::Palette;

#[derive(Debug, Default, Clone, Copy)]
struct Emphasis {
    bold: bool,
    italic: bool,
    code: bool,
}

impl Emphasis {
    fn style(self, palette: &Palette) -> Style {
        let mut style = Style::default().fg(palette.text_primary);
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.code {
            style = Style::default().fg(palette.primary).bg(palette.bg_panel);
        }
        style
    }
}

/// Render markdown into owned lines ready for a `Paragraph`.
#[must_use]
pub fn render(text: &str, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut emphasis = Emphasis::default();
    let mut in_code_block = false;

    let mut flush = |current: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
        if !current.is_empty() {
            lines.push(Line::from(std::mem::take(current)));
        }
    };

    let parser = Parser::new_ext(text, Options::empty());
    for event in parser {
        match event {
            Event::Start(Tag::Strong) => emphasis.bold = true,
            Event::End(TagEnd::Strong) => emphasis.bold = false,
            Event::Start(Tag::Emphasis) => emphasis.italic = true,
            Event::End(TagEnd::Emphasis) => emphasis.italic = false,
            Event::Start(Tag::CodeBlock(_)) => {
                flush(&mut current, &mut lines);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                flush(&mut current, &mut lines);
                in_code_block = false;
            }
            Event::Start(Tag::Item) => {
                flush(&mut current, &mut lines);
                current.push(Span::styled(
                    "  - ".to_string(),
                    Style::default().fg(palette.text_muted),
                ));
            }
            Event::End(TagEnd::Item) => flush(&mut current, &mut lines),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_)) => {
                flush(&mut current, &mut lines);
                lines.push(Line::default());
            }
            Event::Code(code) => {
                let mut style = emphasis;
                style.code = true;
                current.push(Span::styled(code.into_string(), style.style(palette)));
            }
            Event::Text(chunk) => {
                if in_code_block {
                    for raw in chunk.lines() {
                        lines.push(Line::from(Span::styled(
                            format!("  {raw}"),
                            Style::default().fg(palette.primary),
                        )));
                    }
                } else {
                    current.push(Span::styled(
                        chunk.into_string(),
                        emphasis.style(palette),
                    ));
                }
            }
            Event::SoftBreak => current.push(Span::raw(" ")),
            Event::HardBreak => flush(&mut current, &mut lines),
            _ => {}
        }
    }
    flush(&mut current, &mut lines);

    // Trim the trailing paragraph spacer.
    while lines.last().is_some_and(|line| line.spans.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn paragraphs_become_separated_lines() {
        let palette = Palette::standard(false);
        let lines = render("first\n\nsecond", &palette);
        assert_eq!(flat(&lines), "first\n\nsecond");
    }

    #[test]
    fn list_items_get_markers() {
        let palette = Palette::standard(false);
        let lines = render("- one\n- two", &palette);
        assert!(flat(&lines).contains("  - one"));
        assert!(flat(&lines).contains("  - two"));
    }

    #[test]
    fn plain_text_survives_unchanged() {
        let palette = Palette::standard(false);
        let lines = render("Mitosis is cell division.", &palette);
        assert_eq!(flat(&lines), "Mitosis is cell division.");
    }
}
