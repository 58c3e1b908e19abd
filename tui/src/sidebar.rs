//! The navigation sidebar: user header, General Chat, and the pipeline
//! browser grouped by category.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use hoos_core::{App, group_by_category};
use hoos_types::PipelineId;

use crate::theme::{Palette, tag_color};
use crate::{Focus, Ui};

/// One selectable sidebar row. Rendering and key handling derive the same
/// flattened list, so the cursor can never point at something not on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    GeneralChat,
    NewPipeline,
    Category { name: String, expanded: bool },
    Pipeline(PipelineId),
}

/// Flatten the grouped pipeline browser into selectable rows.
#[must_use]
pub fn rows(app: &App) -> Vec<Row> {
    let mut rows = vec![Row::GeneralChat, Row::NewPipeline];
    for group in group_by_category(app.stores().pipelines.items()) {
        let expanded = app.is_category_expanded(group.name);
        rows.push(Row::Category {
            name: group.name.to_string(),
            expanded,
        });
        if expanded {
            for pipeline in &group.pipelines {
                rows.push(Row::Pipeline(pipeline.id));
            }
        }
    }
    rows
}

pub fn draw(frame: &mut Frame, app: &App, ui: &Ui, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(palette.bg_border))
        .style(Style::default().bg(palette.bg_panel));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [header, body] = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(inner);

    let user = app.user();
    let header_lines = vec![
        Line::from(Span::styled(user.display_name(), palette.title())),
        Line::from(Span::styled(user.email.clone(), palette.muted())),
    ];
    frame.render_widget(Paragraph::new(header_lines), header);

    let focused = ui.focus == Focus::Sidebar;
    let current_pipeline = app.view().pipeline();
    let items: Vec<ListItem> = rows(app)
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let selected = focused && index == ui.sidebar_cursor;
            let line = row_line(app, &row, current_pipeline, palette);
            let mut item = ListItem::new(line);
            if selected {
                item = item.style(palette.selected());
            }
            item
        })
        .collect();
    frame.render_widget(List::new(items), body);
}

fn row_line<'a>(
    app: &'a App,
    row: &Row,
    current: Option<PipelineId>,
    palette: &Palette,
) -> Line<'a> {
    match row {
        Row::GeneralChat => Line::from(Span::styled(
            " General Chat",
            Style::default().fg(palette.primary),
        )),
        Row::NewPipeline => Line::from(Span::styled(" + New pipeline", palette.muted())),
        Row::Category { name, expanded } => {
            let color = group_by_category(app.stores().pipelines.items())
                .into_iter()
                .find(|group| group.name == name)
                .and_then(|group| group.color.map(|hex| tag_color(hex, palette)))
                .unwrap_or(palette.text_muted);
            Line::from(vec![
                Span::styled(
                    format!(" {} ", palette.fold_glyph(*expanded)),
                    palette.muted(),
                ),
                Span::styled(
                    name.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ])
        }
        Row::Pipeline(id) => {
            let Some(pipeline) = app.stores().pipelines.get(*id) else {
                return Line::from(Span::styled("   ?", palette.muted()));
            };
            let mut spans = vec![Span::styled(
                format!("   {}", pipeline.name),
                if current == Some(*id) {
                    Style::default()
                        .fg(palette.text_primary)
                        .add_modifier(Modifier::BOLD)
                } else {
                    palette.text()
                },
            )];
            if let Some(count) = pipeline.number_of_documents {
                spans.push(Span::styled(format!(" ({count})"), palette.muted()));
            }
            for tag in pipeline.custom_tags() {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    palette.tag_glyph().to_string(),
                    Style::default().fg(tag_color(&tag.color, palette)),
                ));
            }
            Line::from(spans)
        }
    }
}
