//! Key handling: crossterm events in, core [`Command`]s out.
//!
//! Modals capture keys first; otherwise routing follows the focused panel
//! and the current view. The input layer never mutates application state
//! directly beyond its own cursors and forms.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use hoos_core::{App, Command, Pane, View};
use hoos_types::{NonEmptyString, PipelineDraft, TagDraft};

use crate::modal::{COLOR_PRESETS, Modal, NameForm, PipelineForm, TagForm, TextField};
use crate::sidebar::{self, Row};
use crate::{Focus, Ui};

/// What a key press asks the caller to do.
#[derive(Debug)]
pub enum Outcome {
    None,
    Quit,
    Command(Command),
    /// Read this file and dispatch an upload with its bytes.
    Upload(PathBuf),
}

pub fn handle_key(ui: &mut Ui, app: &App, key: KeyEvent) -> Outcome {
    if key.kind != KeyEventKind::Press {
        return Outcome::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return Outcome::Quit;
    }

    if ui.modal.is_open() {
        return handle_modal_key(ui, app, key);
    }

    // A visible notification eats the first Esc.
    if key.code == KeyCode::Esc && app.notification().is_some() {
        return Outcome::Command(Command::DismissNotification);
    }

    if key.code == KeyCode::Tab {
        ui.focus = match ui.focus {
            Focus::Sidebar => Focus::Main,
            Focus::Main => Focus::Sidebar,
        };
        return Outcome::None;
    }

    match ui.focus {
        Focus::Sidebar => handle_sidebar_key(ui, app, key),
        Focus::Main => handle_main_key(ui, app, key),
    }
}

fn handle_sidebar_key(ui: &mut Ui, app: &App, key: KeyEvent) -> Outcome {
    let rows = sidebar::rows(app);
    match key.code {
        KeyCode::Up => {
            ui.sidebar_cursor = ui.sidebar_cursor.saturating_sub(1);
            Outcome::None
        }
        KeyCode::Down => {
            ui.sidebar_cursor = (ui.sidebar_cursor + 1).min(rows.len().saturating_sub(1));
            Outcome::None
        }
        KeyCode::Enter => match rows.get(ui.sidebar_cursor) {
            Some(Row::GeneralChat) => {
                ui.reset_panes();
                Outcome::Command(Command::SelectGeneralChat)
            }
            Some(Row::NewPipeline) => {
                ui.modal = Modal::PipelineForm(PipelineForm::create());
                Outcome::None
            }
            Some(Row::Category { name, .. }) => {
                Outcome::Command(Command::ToggleCategory(name.clone()))
            }
            Some(Row::Pipeline(id)) => {
                ui.focus = Focus::Main;
                ui.reset_panes();
                Outcome::Command(Command::SelectPipeline(*id))
            }
            None => Outcome::None,
        },
        KeyCode::Char('n') => {
            ui.modal = Modal::PipelineForm(PipelineForm::create());
            Outcome::None
        }
        KeyCode::Char('e') => {
            if let Some(Row::Pipeline(id)) = rows.get(ui.sidebar_cursor)
                && let Some(form) = PipelineForm::edit(app, *id)
            {
                ui.modal = Modal::PipelineForm(form);
            }
            Outcome::None
        }
        KeyCode::Char('d') => {
            if let Some(Row::Pipeline(id)) = rows.get(ui.sidebar_cursor) {
                ui.modal = Modal::ConfirmDeletePipeline(*id);
            }
            Outcome::None
        }
        KeyCode::Char('t') => {
            if let Some(Row::Pipeline(id)) = rows.get(ui.sidebar_cursor) {
                ui.modal = Modal::TagForm(TagForm::new(*id));
            }
            Outcome::None
        }
        KeyCode::Char('x') => {
            if let Some(Row::Pipeline(id)) = rows.get(ui.sidebar_cursor) {
                ui.modal = Modal::DeleteTagPicker {
                    pipeline: *id,
                    cursor: 0,
                };
            }
            Outcome::None
        }
        _ => Outcome::None,
    }
}

fn handle_main_key(ui: &mut Ui, app: &App, key: KeyEvent) -> Outcome {
    match app.view() {
        View::GeneralChat => match key.code {
            KeyCode::Esc => Outcome::Command(Command::OpenPipelineBrowser),
            _ => handle_compose_key(ui, app, key),
        },
        View::PipelineList => {
            // All browsing happens in the sidebar.
            ui.focus = Focus::Sidebar;
            Outcome::None
        }
        View::Detail { pipeline, pane } => match pane {
            Pane::ChatLanding => {
                let conversations = app.stores().conversations.items();
                match key.code {
                    KeyCode::Esc => Outcome::Command(Command::SelectGeneralChat),
                    KeyCode::Up if ui.compose.is_empty() => {
                        ui.landing_cursor = ui.landing_cursor.saturating_sub(1);
                        Outcome::None
                    }
                    KeyCode::Down if ui.compose.is_empty() => {
                        ui.landing_cursor =
                            (ui.landing_cursor + 1).min(conversations.len().saturating_sub(1));
                        Outcome::None
                    }
                    KeyCode::Enter if ui.compose.is_empty() => {
                        match conversations.get(ui.landing_cursor) {
                            Some(conversation) => {
                                ui.scroll = 0;
                                Outcome::Command(Command::SelectConversation(conversation.id))
                            }
                            None => Outcome::None,
                        }
                    }
                    KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        match conversations.get(ui.landing_cursor) {
                            Some(conversation) => {
                                ui.modal = Modal::ConfirmDeleteConversation(conversation.id);
                                Outcome::None
                            }
                            None => Outcome::None,
                        }
                    }
                    _ => detail_common_key(ui, key).unwrap_or_else(|| handle_compose_key(ui, app, key)),
                }
            }
            Pane::Conversation(conversation) => match key.code {
                KeyCode::Esc => Outcome::Command(Command::GoHome),
                KeyCode::PageUp => {
                    ui.scroll = ui.scroll.saturating_add(3);
                    Outcome::None
                }
                KeyCode::PageDown => {
                    ui.scroll = ui.scroll.saturating_sub(3);
                    Outcome::None
                }
                KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    ui.modal = Modal::ConfirmDeleteConversation(conversation);
                    Outcome::None
                }
                _ => detail_common_key(ui, key).unwrap_or_else(|| handle_compose_key(ui, app, key)),
            },
            Pane::Files { .. } => {
                let documents = app.stores().documents.items();
                match key.code {
                    KeyCode::Esc | KeyCode::Char('f') => {
                        Outcome::Command(Command::ToggleFiles)
                    }
                    KeyCode::Up => {
                        ui.files_cursor = ui.files_cursor.saturating_sub(1);
                        Outcome::None
                    }
                    KeyCode::Down => {
                        ui.files_cursor =
                            (ui.files_cursor + 1).min(documents.len().saturating_sub(1));
                        Outcome::None
                    }
                    KeyCode::Enter => match documents.get(ui.files_cursor) {
                        Some(document) => {
                            Outcome::Command(Command::LoadDocumentMetadata(document.id))
                        }
                        None => Outcome::None,
                    },
                    KeyCode::Char('d') => match documents.get(ui.files_cursor) {
                        Some(document) => {
                            ui.modal = Modal::ConfirmDeleteDocument(pipeline, document.id);
                            Outcome::None
                        }
                        None => Outcome::None,
                    },
                    KeyCode::Char('r') => Outcome::Command(Command::ResolveDownloadUrl),
                    KeyCode::Char('u') => {
                        ui.modal = Modal::UploadPrompt(TextField::default());
                        Outcome::None
                    }
                    _ => Outcome::None,
                }
            }
        },
    }
}

/// Keys shared by the chat panes of a pipeline detail.
fn detail_common_key(ui: &mut Ui, key: KeyEvent) -> Option<Outcome> {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char('f') => Some(Outcome::Command(Command::ToggleFiles)),
        KeyCode::Char('h') => {
            ui.scroll = 0;
            Some(Outcome::Command(Command::GoHome))
        }
        KeyCode::Char('u') => {
            ui.modal = Modal::UploadPrompt(TextField::default());
            Some(Outcome::None)
        }
        _ => None,
    }
}

/// Typing into the message box; Enter sends.
fn handle_compose_key(ui: &mut Ui, app: &App, key: KeyEvent) -> Outcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return Outcome::None;
    }
    match key.code {
        KeyCode::Char(c) => {
            ui.compose.push(c);
            Outcome::None
        }
        KeyCode::Backspace => {
            ui.compose.pop();
            Outcome::None
        }
        KeyCode::Enter => {
            if app.chat_in_flight() {
                return Outcome::None;
            }
            match NonEmptyString::new(ui.compose.clone()) {
                Ok(text) => {
                    ui.compose.clear();
                    ui.scroll = 0;
                    Outcome::Command(Command::SendMessage(text))
                }
                Err(_) => Outcome::None,
            }
        }
        _ => Outcome::None,
    }
}

fn handle_modal_key(ui: &mut Ui, app: &App, key: KeyEvent) -> Outcome {
    match std::mem::take(&mut ui.modal) {
        Modal::None => Outcome::None,
        Modal::NameCapture(mut form) => {
            let outcome = handle_name_form(&mut form, key);
            if matches!(outcome, Outcome::None) {
                ui.modal = Modal::NameCapture(form);
            }
            outcome
        }
        Modal::PipelineForm(mut form) => match handle_pipeline_form(&mut form, app, key) {
            FormResult::Open => {
                ui.modal = Modal::PipelineForm(form);
                Outcome::None
            }
            FormResult::Cancel => Outcome::None,
            FormResult::Submit(command) => Outcome::Command(command),
        },
        Modal::TagForm(mut form) => match handle_tag_form(&mut form, key) {
            FormResult::Open => {
                ui.modal = Modal::TagForm(form);
                Outcome::None
            }
            FormResult::Cancel => Outcome::None,
            FormResult::Submit(command) => Outcome::Command(command),
        },
        Modal::DeleteTagPicker { pipeline, cursor } => {
            let tags: Vec<_> = app
                .stores()
                .pipelines
                .get(pipeline)
                .map(|p| p.custom_tags().map(|t| t.id).collect())
                .unwrap_or_default();
            match key.code {
                KeyCode::Esc => Outcome::None,
                KeyCode::Up => {
                    ui.modal = Modal::DeleteTagPicker {
                        pipeline,
                        cursor: cursor.saturating_sub(1),
                    };
                    Outcome::None
                }
                KeyCode::Down => {
                    ui.modal = Modal::DeleteTagPicker {
                        pipeline,
                        cursor: (cursor + 1).min(tags.len().saturating_sub(1)),
                    };
                    Outcome::None
                }
                KeyCode::Enter => match tags.get(cursor) {
                    Some(tag) => Outcome::Command(Command::DeleteTag(pipeline, *tag)),
                    None => Outcome::None,
                },
                _ => {
                    ui.modal = Modal::DeleteTagPicker { pipeline, cursor };
                    Outcome::None
                }
            }
        }
        Modal::ConfirmDeletePipeline(pipeline) => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                Outcome::Command(Command::DeletePipeline(pipeline))
            }
            KeyCode::Char('n') | KeyCode::Esc => Outcome::None,
            _ => {
                ui.modal = Modal::ConfirmDeletePipeline(pipeline);
                Outcome::None
            }
        },
        Modal::ConfirmDeleteConversation(conversation) => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                Outcome::Command(Command::DeleteConversation(conversation))
            }
            KeyCode::Char('n') | KeyCode::Esc => Outcome::None,
            _ => {
                ui.modal = Modal::ConfirmDeleteConversation(conversation);
                Outcome::None
            }
        },
        Modal::ConfirmDeleteDocument(pipeline, document) => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                Outcome::Command(Command::DeleteDocument(pipeline, document))
            }
            KeyCode::Char('n') | KeyCode::Esc => Outcome::None,
            _ => {
                ui.modal = Modal::ConfirmDeleteDocument(pipeline, document);
                Outcome::None
            }
        },
        Modal::UploadPrompt(mut path) => match key.code {
            KeyCode::Esc => Outcome::None,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                path.push(c);
                ui.modal = Modal::UploadPrompt(path);
                Outcome::None
            }
            KeyCode::Backspace => {
                path.backspace();
                ui.modal = Modal::UploadPrompt(path);
                Outcome::None
            }
            KeyCode::Enter if !path.value.trim().is_empty() => {
                Outcome::Upload(PathBuf::from(path.value.trim().to_string()))
            }
            _ => {
                ui.modal = Modal::UploadPrompt(path);
                Outcome::None
            }
        },
    }
}

enum FormResult {
    Open,
    Cancel,
    Submit(Command),
}

fn handle_pipeline_form(form: &mut PipelineForm, app: &App, key: KeyEvent) -> FormResult {
    let taxonomy = &app.stores().taxonomy;
    match key.code {
        KeyCode::Esc => FormResult::Cancel,
        KeyCode::Tab | KeyCode::Down => {
            form.field = (form.field + 1) % 3;
            FormResult::Open
        }
        KeyCode::Up => {
            form.field = (form.field + 2) % 3;
            FormResult::Open
        }
        KeyCode::Left if form.field == 2 => {
            if !taxonomy.is_empty() {
                let current = form.category.unwrap_or(0);
                form.category = Some((current + taxonomy.len() - 1) % taxonomy.len());
            }
            FormResult::Open
        }
        KeyCode::Right if form.field == 2 => {
            form.category = Some(form.category.map_or(0, |c| (c + 1) % taxonomy.len().max(1)));
            FormResult::Open
        }
        KeyCode::Char(c) if form.field < 2 => {
            let field = if form.field == 0 {
                &mut form.name
            } else {
                &mut form.description
            };
            field.push(c);
            FormResult::Open
        }
        KeyCode::Backspace if form.field < 2 => {
            let field = if form.field == 0 {
                &mut form.name
            } else {
                &mut form.description
            };
            field.backspace();
            FormResult::Open
        }
        KeyCode::Enter => {
            let category = form
                .category
                .and_then(|index| taxonomy.get(index))
                .map(|tag| tag.id);
            match PipelineDraft::new(form.name.value.clone(), form.description.value.clone(), category)
            {
                Ok(draft) => match form.editing {
                    Some(pipeline) => FormResult::Submit(Command::EditPipeline(pipeline, draft)),
                    None => FormResult::Submit(Command::CreatePipeline(draft)),
                },
                Err(error) => {
                    form.error = Some(error.to_string());
                    FormResult::Open
                }
            }
        }
        _ => FormResult::Open,
    }
}

fn handle_tag_form(form: &mut TagForm, key: KeyEvent) -> FormResult {
    match key.code {
        KeyCode::Esc => FormResult::Cancel,
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            form.field = (form.field + 1) % 2;
            FormResult::Open
        }
        KeyCode::Left if form.field == 1 => {
            form.color = (form.color + COLOR_PRESETS.len() - 1) % COLOR_PRESETS.len();
            FormResult::Open
        }
        KeyCode::Right if form.field == 1 => {
            form.color = (form.color + 1) % COLOR_PRESETS.len();
            FormResult::Open
        }
        KeyCode::Char(c) if form.field == 0 => {
            form.name.push(c);
            FormResult::Open
        }
        KeyCode::Backspace if form.field == 0 => {
            form.name.backspace();
            FormResult::Open
        }
        KeyCode::Enter => {
            match TagDraft::new(form.name.value.clone(), COLOR_PRESETS[form.color]) {
                Ok(draft) => FormResult::Submit(Command::CreateTag(form.pipeline, draft)),
                Err(error) => {
                    form.error = Some(error.to_string());
                    FormResult::Open
                }
            }
        }
        _ => FormResult::Open,
    }
}

fn handle_name_form(form: &mut NameForm, key: KeyEvent) -> Outcome {
    match key.code {
        // The capture is mandatory for a brand-new principal; Esc does not
        // dismiss it.
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            form.field = (form.field + 1) % 2;
            Outcome::None
        }
        KeyCode::Char(c) => {
            if form.field == 0 {
                form.first.push(c);
            } else {
                form.last.push(c);
            }
            Outcome::None
        }
        KeyCode::Backspace => {
            if form.field == 0 {
                form.first.backspace();
            } else {
                form.last.backspace();
            }
            Outcome::None
        }
        KeyCode::Enter if !form.first.value.trim().is_empty() => {
            Outcome::Command(Command::UpdateName {
                first_name: form.first.value.clone(),
                last_name: form.last.value.clone(),
            })
        }
        _ => Outcome::None,
    }
}

