//! The files pane: document table plus the on-demand metadata detail.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use hoos_core::App;

use crate::theme::Palette;
use crate::{Focus, Ui};

pub fn draw(frame: &mut Frame, app: &App, ui: &Ui, area: Rect, palette: &Palette) {
    let [table_area, detail_area] =
        Layout::vertical([Constraint::Min(4), Constraint::Length(9)]).areas(area);

    draw_table(frame, app, ui, table_area, palette);
    draw_detail(frame, app, detail_area, palette);
}

fn draw_table(frame: &mut Frame, app: &App, ui: &Ui, area: Rect, palette: &Palette) {
    let pipeline_name = app
        .view()
        .pipeline()
        .and_then(|id| app.stores().pipelines.get(id))
        .map_or_else(String::new, |p| p.name.clone());
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(palette.bg_border))
        .title(Span::styled(
            format!(" Files — {pipeline_name} "),
            palette.title(),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let documents = app.stores().documents.items();
    if documents.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No documents yet. Press u to upload a PDF.",
                palette.muted(),
            )))
            .centered(),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = documents
        .iter()
        .enumerate()
        .map(|(index, document)| {
            let selected = ui.focus == Focus::Main && index == ui.files_cursor;
            let mut spans = vec![
                Span::styled(format!(" {}", document.file_name), palette.text()),
                Span::styled(format!("  .{}", document.file_type), palette.muted()),
                Span::styled(
                    format!("  {}", document.upload_date.format("%Y-%m-%d")),
                    palette.muted(),
                ),
            ];
            if !document.is_active {
                spans.push(Span::styled(
                    "  inactive",
                    Style::default().fg(palette.error),
                ));
            }
            let mut item = ListItem::new(Line::from(spans));
            if selected {
                item = item.style(palette.selected());
            }
            item
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(palette.bg_border))
        .title(Span::styled(" Details ", palette.muted()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(metadata) = app.metadata() else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Press Enter on a document to load its details.",
                palette.muted(),
            ))),
            inner,
        );
        return;
    };

    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:>10}  "), palette.muted()),
            Span::styled(value, palette.text()),
        ])
    };
    let mut lines = vec![
        field("size", metadata.size_label()),
        field(
            "pages",
            metadata
                .page_count
                .map_or_else(|| "unknown".into(), |n| n.to_string()),
        ),
        field(
            "words",
            metadata
                .word_count
                .map_or_else(|| "unknown".into(), |n| n.to_string()),
        ),
        field(
            "type",
            metadata.mime_type.clone().unwrap_or_else(|| "unknown".into()),
        ),
        field(
            "checksum",
            metadata.checksum.clone().unwrap_or_else(|| "unknown".into()),
        ),
    ];
    match app.download() {
        Some(resolved) => {
            let style = if resolved.is_live() {
                Style::default().fg(palette.success)
            } else {
                Style::default().fg(palette.error)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:>10}  ", "link"), palette.muted()),
                Span::styled(resolved.download_url.clone(), style),
            ]));
        }
        None => lines.push(Line::from(Span::styled(
            "Press r to resolve a download link.",
            palette.muted(),
        ))),
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
