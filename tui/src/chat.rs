//! Chat panes: the general transcript, a pipeline's conversation landing,
//! and an open conversation.

use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use hoos_core::App;
use hoos_types::{ChatEntry, Sender};

use crate::markdown;
use crate::theme::Palette;
use crate::{Focus, Ui};

pub fn draw_general(frame: &mut Frame, app: &App, ui: &Ui, area: Rect, palette: &Palette) {
    let [title, transcript, compose] = chat_layout(area);
    draw_title(frame, title, "General Chat", palette);
    draw_transcript(frame, app, ui, transcript, palette);
    draw_compose(frame, app, ui, compose, palette);
}

pub fn draw_browser_placeholder(frame: &mut Frame, area: Rect, palette: &Palette) {
    let lines = vec![
        Line::default(),
        Line::from(Span::styled("Pick a pipeline", palette.title())),
        Line::default(),
        Line::from(Span::styled(
            "Select a pipeline from the sidebar to chat over its documents,",
            palette.muted(),
        )),
        Line::from(Span::styled(
            "or open General Chat for a document-less conversation.",
            palette.muted(),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .centered()
            .style(Style::default().bg(palette.bg_dark)),
        area,
    );
}

pub fn draw_landing(frame: &mut Frame, app: &App, ui: &Ui, area: Rect, palette: &Palette) {
    let pipeline_name = app
        .view()
        .pipeline()
        .and_then(|id| app.stores().pipelines.get(id))
        .map_or_else(|| "Pipeline".to_string(), |p| p.name.clone());
    let [title, body, compose] = chat_layout(area);
    draw_title(frame, title, &pipeline_name, palette);

    let conversations = app.stores().conversations.items();
    if conversations.is_empty() {
        let lines = vec![
            Line::default(),
            Line::from(Span::styled("Start a new conversation", palette.title())),
            Line::default(),
            Line::from(Span::styled(
                "Type below and press Enter; a conversation is created with your first message.",
                palette.muted(),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).centered(), body);
    } else {
        let items: Vec<ListItem> = conversations
            .iter()
            .enumerate()
            .map(|(index, conversation)| {
                let selected = ui.focus == Focus::Main && index == ui.landing_cursor;
                let mut spans = vec![Span::styled(
                    format!(" {} ", short_date(conversation.last_message_at
                        .unwrap_or(conversation.created_at))),
                    palette.muted(),
                )];
                let preview = conversation.preview();
                spans.push(Span::styled(
                    if preview.is_empty() {
                        "(no messages yet)".to_string()
                    } else {
                        preview.to_string()
                    },
                    palette.text(),
                ));
                let mut item = ListItem::new(Line::from(spans));
                if selected {
                    item = item.style(palette.selected());
                }
                item
            })
            .collect();
        let block = Block::default()
            .borders(Borders::NONE)
            .title(Span::styled(" Conversations ", palette.muted()));
        frame.render_widget(List::new(items).block(block), body);
    }

    draw_compose(frame, app, ui, compose, palette);
}

pub fn draw_conversation(frame: &mut Frame, app: &App, ui: &Ui, area: Rect, palette: &Palette) {
    let pipeline_name = app
        .view()
        .pipeline()
        .and_then(|id| app.stores().pipelines.get(id))
        .map_or_else(|| "Conversation".to_string(), |p| p.name.clone());
    let [title, transcript, compose] = chat_layout(area);
    draw_title(frame, title, &pipeline_name, palette);
    draw_transcript(frame, app, ui, transcript, palette);
    draw_compose(frame, app, ui, compose, palette);
}

fn chat_layout(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(4),
    ])
    .areas(area)
}

fn draw_title(frame: &mut Frame, area: Rect, text: &str, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(palette.bg_border));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text.to_string(), palette.title()))),
        inner,
    );
}

fn draw_transcript(frame: &mut Frame, app: &App, ui: &Ui, area: Rect, palette: &Palette) {
    let user_name = app.user().display_name();
    let mut lines: Vec<Line<'static>> = Vec::new();
    for entry in app.stores().messages.entries() {
        lines.extend(entry_lines(entry, &user_name, palette));
        lines.push(Line::default());
    }
    if app.chat_in_flight() {
        lines.push(Line::from(Span::styled(
            "HoosBot is thinking…".to_string(),
            palette.muted().add_modifier(Modifier::ITALIC),
        )));
    }

    // Stick to the bottom, then apply the manual scroll offset upward.
    let height = area.height;
    let total = lines.len() as u16;
    let bottom = total.saturating_sub(height);
    let offset = bottom.saturating_sub(ui.scroll);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((offset, 0)),
        area,
    );
}

fn entry_lines(entry: &ChatEntry, user_name: &str, palette: &Palette) -> Vec<Line<'static>> {
    match entry.sender() {
        Sender::User => {
            let style = if entry.is_pending() {
                Style::default().fg(palette.pending)
            } else {
                palette.text()
            };
            let mut header = vec![Span::styled(
                user_name.to_string(),
                Style::default()
                    .fg(palette.primary)
                    .add_modifier(Modifier::BOLD),
            )];
            if entry.is_pending() {
                header.push(Span::styled("  (sending…)".to_string(), palette.muted()));
            }
            let mut lines = vec![Line::from(header)];
            for raw in entry.text().lines() {
                lines.push(Line::from(Span::styled(raw.to_string(), style)));
            }
            lines
        }
        Sender::Bot => {
            let mut lines = vec![Line::from(Span::styled(
                "HoosBot".to_string(),
                Style::default()
                    .fg(palette.bot)
                    .add_modifier(Modifier::BOLD),
            ))];
            lines.extend(markdown::render(entry.text(), palette));
            lines
        }
    }
}

fn draw_compose(frame: &mut Frame, app: &App, ui: &Ui, area: Rect, palette: &Palette) {
    let in_flight = app.chat_in_flight();
    let border = if in_flight {
        Style::default().fg(palette.text_muted)
    } else if ui.focus == Focus::Main {
        Style::default().fg(palette.primary)
    } else {
        Style::default().fg(palette.bg_border)
    };
    let title = if in_flight { " Sending… " } else { " Message " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(title, palette.muted()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let max_cols = usize::from(inner.width.saturating_mul(inner.height.max(1)));
    let content = if ui.compose.is_empty() && !in_flight {
        Span::styled("Enter text".to_string(), palette.muted())
    } else {
        Span::styled(fit_tail(&ui.compose, max_cols), palette.text())
    };
    frame.render_widget(Paragraph::new(Line::from(content)).wrap(Wrap { trim: false }), inner);
}

/// Keep the end of the buffer visible once it outgrows the box.
fn fit_tail(text: &str, max_cols: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let width: usize = text.chars().filter_map(UnicodeWidthChar::width).sum();
    if width <= max_cols {
        return text.to_string();
    }
    let mut taken = 0;
    let mut tail: Vec<char> = Vec::new();
    for c in text.chars().rev() {
        taken += c.width().unwrap_or(0);
        if taken > max_cols.saturating_sub(1) {
            break;
        }
        tail.push(c);
    }
    let mut out = String::from("…");
    out.extend(tail.iter().rev());
    out
}

fn short_date(at: DateTime<Utc>) -> String {
    at.format("%b %d").to_string()
}
