//! TUI rendering and input handling for the HoosStudying client.
//!
//! The crate owns ephemeral interaction state ([`Ui`]: cursors, the compose
//! buffer, the open modal) and turns crossterm key events into core
//! [`hoos_core::Command`]s. Authoritative state stays in [`hoos_core::App`];
//! nothing here mutates a store.

pub mod auth;
mod chat;
mod files;
mod input;
mod modal;
mod sidebar;

pub mod markdown;
pub mod theme;

pub use input::{Outcome, handle_key};
pub use modal::Modal;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use hoos_core::{App, Pane, Severity, View};

use crate::modal::NameForm;
use crate::theme::Palette;

/// Which panel receives non-modal key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Main,
}

/// Ephemeral interaction state, reset on sign-out.
#[derive(Debug)]
pub struct Ui {
    pub focus: Focus,
    pub sidebar_cursor: usize,
    pub landing_cursor: usize,
    pub files_cursor: usize,
    /// The chat input buffer.
    pub compose: String,
    /// Manual transcript scroll, in lines up from the bottom.
    pub scroll: u16,
    pub modal: Modal,
}

impl Ui {
    #[must_use]
    pub fn new() -> Self {
        Self {
            focus: Focus::Sidebar,
            sidebar_cursor: 0,
            landing_cursor: 0,
            files_cursor: 0,
            compose: String::new(),
            scroll: 0,
            modal: Modal::None,
        }
    }

    /// Reset per-pane cursors after navigation.
    pub fn reset_panes(&mut self) {
        self.landing_cursor = 0;
        self.files_cursor = 0;
        self.scroll = 0;
    }

    /// Reconcile with application state once per frame: clamp cursors to
    /// what is actually on screen, and force the one-time name capture.
    pub fn sync(&mut self, app: &App) {
        let rows = sidebar::rows(app).len();
        self.sidebar_cursor = self.sidebar_cursor.min(rows.saturating_sub(1));
        self.landing_cursor = self
            .landing_cursor
            .min(app.stores().conversations.items().len().saturating_sub(1));
        self.files_cursor = self
            .files_cursor
            .min(app.stores().documents.items().len().saturating_sub(1));

        if app.view() == View::PipelineList {
            self.focus = Focus::Sidebar;
        }
        if app.user().needs_name && !self.modal.is_open() {
            self.modal = Modal::NameCapture(NameForm::default());
        }
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

const SIDEBAR_WIDTH: u16 = 34;

/// Draw one frame of the signed-in application.
pub fn draw(frame: &mut Frame, app: &App, ui: &Ui, palette: &Palette) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg_dark)),
        area,
    );

    let [body, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(body);

    sidebar::draw(frame, app, ui, sidebar_area, palette);

    match app.view() {
        View::GeneralChat => chat::draw_general(frame, app, ui, main_area, palette),
        View::PipelineList => chat::draw_browser_placeholder(frame, main_area, palette),
        View::Detail { pane, .. } => match pane {
            Pane::ChatLanding => chat::draw_landing(frame, app, ui, main_area, palette),
            Pane::Conversation(_) => chat::draw_conversation(frame, app, ui, main_area, palette),
            Pane::Files { .. } => files::draw(frame, app, ui, main_area, palette),
        },
    }

    draw_status(frame, app, status, palette);
    modal::draw(frame, app, &ui.modal, palette);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let line = match app.notification() {
        Some(notification) => {
            let style = match notification.severity {
                Severity::Success => Style::default().fg(palette.success),
                Severity::Error => Style::default().fg(palette.error),
            };
            Line::from(Span::styled(format!(" {}", notification.message), style))
        }
        None => Line::from(Span::styled(
            " Tab focus · Enter select/send · Ctrl+F files · Ctrl+H home · Ctrl+Q quit",
            palette.muted(),
        )),
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(palette.bg_panel)),
        area,
    );
}
