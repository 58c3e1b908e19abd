//! Modal forms: pipeline create/edit, tag create, deletions, the one-time
//! name capture, and the upload path prompt.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use hoos_core::App;
use hoos_types::{ConversationId, DocumentId, PipelineId};

use crate::theme::{Palette, tag_color};

/// Color presets offered for custom tags.
pub const COLOR_PRESETS: [&str; 12] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
    "#6366F1", "#84CC16", "#06B6D4", "#A855F7",
];

/// A single-line text field; the cursor stays at the end.
#[derive(Debug, Default, Clone)]
pub struct TextField {
    pub value: String,
}

impl TextField {
    #[must_use]
    pub fn with(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }
}

#[derive(Debug, Clone)]
pub struct PipelineForm {
    /// `None` creates; `Some` edits.
    pub editing: Option<PipelineId>,
    pub name: TextField,
    pub description: TextField,
    /// Index into the system-tag taxonomy; `None` until a category is picked.
    pub category: Option<usize>,
    /// 0 = name, 1 = description, 2 = category picker.
    pub field: usize,
    pub error: Option<String>,
}

impl PipelineForm {
    #[must_use]
    pub fn create() -> Self {
        Self {
            editing: None,
            name: TextField::default(),
            description: TextField::default(),
            category: None,
            field: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn edit(app: &App, pipeline: PipelineId) -> Option<Self> {
        let existing = app.stores().pipelines.get(pipeline)?;
        let category = existing.system_tag().and_then(|tag| {
            app.stores()
                .taxonomy
                .iter()
                .position(|candidate| candidate.id == tag.id)
        });
        Some(Self {
            editing: Some(pipeline),
            name: TextField::with(existing.name.clone()),
            description: TextField::with(existing.description.clone()),
            category,
            field: 0,
            error: None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TagForm {
    pub pipeline: PipelineId,
    pub name: TextField,
    pub color: usize,
    /// 0 = name, 1 = color picker.
    pub field: usize,
    pub error: Option<String>,
}

impl TagForm {
    #[must_use]
    pub fn new(pipeline: PipelineId) -> Self {
        Self {
            pipeline,
            name: TextField::default(),
            color: 0,
            field: 0,
            error: None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct NameForm {
    pub first: TextField,
    pub last: TextField,
    /// 0 = first, 1 = last.
    pub field: usize,
}

/// Which modal is on top, if any.
#[derive(Debug, Default, Clone)]
pub enum Modal {
    #[default]
    None,
    NameCapture(NameForm),
    PipelineForm(PipelineForm),
    TagForm(TagForm),
    DeleteTagPicker { pipeline: PipelineId, cursor: usize },
    ConfirmDeletePipeline(PipelineId),
    ConfirmDeleteConversation(ConversationId),
    ConfirmDeleteDocument(PipelineId, DocumentId),
    UploadPrompt(TextField),
}

impl Modal {
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::None)
    }
}

pub fn draw(frame: &mut Frame, app: &App, modal: &Modal, palette: &Palette) {
    let area = frame.area();
    match modal {
        Modal::None => {}
        Modal::NameCapture(form) => {
            let lines = vec![
                Line::from(Span::styled(
                    "Welcome! What should we call you?",
                    palette.muted(),
                )),
                Line::default(),
                field_line("First name", &form.first.value, form.field == 0, palette),
                field_line("Last name", &form.last.value, form.field == 1, palette),
                Line::default(),
                hint_line("Tab next field · Enter save", palette),
            ];
            panel(frame, area, " Your name ", lines, palette);
        }
        Modal::PipelineForm(form) => {
            let title = if form.editing.is_some() {
                " Edit pipeline "
            } else {
                " New pipeline "
            };
            let category = form
                .category
                .and_then(|index| app.stores().taxonomy.get(index));
            let category_line = match category {
                Some(tag) => Line::from(vec![
                    Span::styled(format!("{:>12}  ", "Category"), palette.muted()),
                    Span::styled(
                        palette.tag_glyph().to_string(),
                        Style::default().fg(tag_color(&tag.color, palette)),
                    ),
                    Span::styled(format!(" {}", tag.name), active_style(form.field == 2, palette)),
                ]),
                None => Line::from(vec![
                    Span::styled(format!("{:>12}  ", "Category"), palette.muted()),
                    Span::styled("(pick with ←/→)", active_style(form.field == 2, palette)),
                ]),
            };
            let mut lines = vec![
                field_line("Name", &form.name.value, form.field == 0, palette),
                field_line("Description", &form.description.value, form.field == 1, palette),
                category_line,
                Line::default(),
                hint_line("Tab next field · ←/→ category · Enter save · Esc cancel", palette),
            ];
            if let Some(error) = &form.error {
                lines.push(Line::from(Span::styled(
                    error.clone(),
                    Style::default().fg(palette.error),
                )));
            }
            panel(frame, area, title, lines, palette);
        }
        Modal::TagForm(form) => {
            let swatches: Vec<Span<'static>> = COLOR_PRESETS
                .iter()
                .enumerate()
                .flat_map(|(index, hex)| {
                    let mut style = Style::default().fg(tag_color(hex, palette));
                    if index == form.color {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    [
                        Span::styled(palette.tag_glyph().to_string(), style),
                        Span::raw(" "),
                    ]
                })
                .collect();
            let mut lines = vec![
                field_line("Tag name", &form.name.value, form.field == 0, palette),
                Line::from(vec![
                    Span::styled(format!("{:>12}  ", "Color"), palette.muted()),
                ]),
                Line::from(swatches),
                Line::default(),
                hint_line("Tab next field · ←/→ color · Enter save · Esc cancel", palette),
            ];
            if let Some(error) = &form.error {
                lines.push(Line::from(Span::styled(
                    error.clone(),
                    Style::default().fg(palette.error),
                )));
            }
            panel(frame, area, " New tag ", lines, palette);
        }
        Modal::DeleteTagPicker { pipeline, cursor } => {
            let mut lines = vec![Line::from(Span::styled(
                "Select a tag to delete",
                palette.muted(),
            ))];
            let tags: Vec<_> = app
                .stores()
                .pipelines
                .get(*pipeline)
                .map(|p| p.custom_tags().collect())
                .unwrap_or_default();
            if tags.is_empty() {
                lines.push(Line::from(Span::styled(
                    "This pipeline has no custom tags.",
                    palette.muted(),
                )));
            }
            for (index, tag) in tags.iter().enumerate() {
                let style = if index == *cursor {
                    palette.selected()
                } else {
                    palette.text()
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {} ", palette.tag_glyph()),
                        Style::default().fg(tag_color(&tag.color, palette)),
                    ),
                    Span::styled(tag.name.clone(), style),
                ]));
            }
            lines.push(Line::default());
            lines.push(hint_line("↑/↓ select · Enter delete · Esc cancel", palette));
            panel(frame, area, " Delete tag ", lines, palette);
        }
        Modal::ConfirmDeletePipeline(pipeline) => {
            let (name, files) = app
                .stores()
                .pipelines
                .get(*pipeline)
                .map(|p| (p.name.clone(), p.number_of_documents.unwrap_or(0)))
                .unwrap_or_default();
            confirm(
                frame,
                area,
                " Delete pipeline ",
                vec![
                    Line::from(Span::styled(
                        format!("Delete \"{name}\"? This cannot be undone."),
                        palette.text(),
                    )),
                    Line::from(Span::styled(
                        format!("Files: {files}"),
                        palette.muted(),
                    )),
                ],
                palette,
            );
        }
        Modal::ConfirmDeleteConversation(_) => confirm(
            frame,
            area,
            " Delete conversation ",
            vec![Line::from(Span::styled(
                "Delete this conversation? This cannot be undone.",
                palette.text(),
            ))],
            palette,
        ),
        Modal::ConfirmDeleteDocument(_, _) => confirm(
            frame,
            area,
            " Remove document ",
            vec![Line::from(Span::styled(
                "Remove this document from the pipeline?",
                palette.text(),
            ))],
            palette,
        ),
        Modal::UploadPrompt(path) => panel(
            frame,
            area,
            " Upload PDF ",
            vec![
                field_line("Path", &path.value, true, palette),
                Line::default(),
                hint_line("Enter upload · Esc cancel", palette),
            ],
            palette,
        ),
    }
}

fn confirm(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    mut lines: Vec<Line<'static>>,
    palette: &Palette,
) {
    lines.push(Line::default());
    lines.push(hint_line("y confirm · n / Esc cancel", palette));
    panel(frame, area, title, lines, palette);
}

fn panel(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line<'static>>,
    palette: &Palette,
) {
    let height = (lines.len() as u16 + 2).min(area.height);
    let width = 56.min(area.width);
    let popup = centered(area, width, height);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.primary))
        .title(Span::styled(title.to_string(), palette.title()))
        .style(Style::default().bg(palette.bg_popup));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn field_line(label: &str, value: &str, active: bool, palette: &Palette) -> Line<'static> {
    let cursor = if active { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:>12}  "), palette.muted()),
        Span::styled(format!("{value}{cursor}"), active_style(active, palette)),
    ])
}

fn active_style(active: bool, palette: &Palette) -> Style {
    if active {
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.text_secondary)
    }
}

fn hint_line(hint: &str, palette: &Palette) -> Line<'static> {
    Line::from(Span::styled(hint.to_string(), palette.muted()))
}
