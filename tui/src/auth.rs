//! The unauthenticated view: email/password sign-in and sign-up.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::modal::TextField;
use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: TextField,
    pub password: TextField,
    /// 0 = email, 1 = password.
    pub field: usize,
    pub error: Option<String>,
    pub busy: bool,
}

impl AuthForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: AuthMode::SignIn,
            email: TextField::default(),
            password: TextField::default(),
            field: 0,
            error: None,
            busy: false,
        }
    }
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    None,
    Quit,
    Submit,
}

pub fn handle_key(form: &mut AuthForm, key: KeyEvent) -> AuthAction {
    if key.kind != KeyEventKind::Press {
        return AuthAction::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => AuthAction::Quit,
            KeyCode::Char('n') => {
                form.mode = match form.mode {
                    AuthMode::SignIn => AuthMode::SignUp,
                    AuthMode::SignUp => AuthMode::SignIn,
                };
                form.error = None;
                AuthAction::None
            }
            _ => AuthAction::None,
        };
    }
    if form.busy {
        return AuthAction::None;
    }
    match key.code {
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            form.field = (form.field + 1) % 2;
            AuthAction::None
        }
        KeyCode::Char(c) => {
            if form.field == 0 {
                form.email.push(c);
            } else {
                form.password.push(c);
            }
            AuthAction::None
        }
        KeyCode::Backspace => {
            if form.field == 0 {
                form.email.backspace();
            } else {
                form.password.backspace();
            }
            AuthAction::None
        }
        KeyCode::Enter => {
            if form.email.value.trim().is_empty() || form.password.value.is_empty() {
                form.error = Some("Email and password are required".to_string());
                AuthAction::None
            } else {
                AuthAction::Submit
            }
        }
        _ => AuthAction::None,
    }
}

pub fn draw(frame: &mut Frame, form: &AuthForm, palette: &Palette) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg_dark)),
        area,
    );

    let width = 52.min(area.width);
    let height = 10.min(area.height);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, popup);

    let title = match form.mode {
        AuthMode::SignIn => " HoosStudying — Sign in ",
        AuthMode::SignUp => " HoosStudying — Create account ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.primary))
        .title(Span::styled(title, palette.title()))
        .style(Style::default().bg(palette.bg_popup));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let masked: String = form.password.value.chars().map(|_| '•').collect();
    let field = |label: &str, value: String, active: bool| {
        let style = if active {
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        let cursor = if active && !form.busy { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:>10}  "), palette.muted()),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    };

    let mut lines = vec![
        Line::default(),
        field("Email", form.email.value.clone(), form.field == 0),
        field("Password", masked, form.field == 1),
        Line::default(),
    ];
    if form.busy {
        lines.push(Line::from(Span::styled("Signing in…", palette.muted())));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(palette.error),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter submit · Ctrl+N switch sign-in/sign-up · Ctrl+Q quit",
            palette.muted(),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}
