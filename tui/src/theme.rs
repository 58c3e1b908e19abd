//! Color theme and glyphs for the HoosStudying TUI.

use ratatui::style::{Color, Modifier, Style};

/// Base palette constants.
mod colors {
    use super::Color;

    // === Backgrounds ===
    pub const BG_DARK: Color = Color::Rgb(22, 24, 33);
    pub const BG_PANEL: Color = Color::Rgb(30, 33, 44);
    pub const BG_HIGHLIGHT: Color = Color::Rgb(45, 49, 66);
    pub const BG_POPUP: Color = Color::Rgb(38, 41, 56);
    pub const BG_BORDER: Color = Color::Rgb(84, 89, 112);

    // === Foregrounds ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(222, 222, 230);
    pub const TEXT_SECONDARY: Color = Color::Rgb(178, 182, 196);
    pub const TEXT_MUTED: Color = Color::Rgb(120, 124, 140);

    // === Accents ===
    pub const PRIMARY: Color = Color::Rgb(126, 156, 216);
    pub const SUCCESS: Color = Color::Rgb(122, 186, 120);
    pub const ERROR: Color = Color::Rgb(226, 101, 107);
    pub const PENDING: Color = Color::Rgb(150, 146, 130);
    pub const BOT: Color = Color::Rgb(149, 127, 184);
}

/// Resolved theme palette used by every draw function.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_dark: Color,
    pub bg_panel: Color,
    pub bg_highlight: Color,
    pub bg_popup: Color,
    pub bg_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub success: Color,
    pub error: Color,
    /// Dimming for optimistic, not-yet-confirmed messages.
    pub pending: Color,
    pub bot: Color,
    /// Prefer plain ASCII glyphs (configurable for constrained terminals).
    pub ascii_only: bool,
}

impl Palette {
    #[must_use]
    pub fn standard(ascii_only: bool) -> Self {
        Self {
            bg_dark: colors::BG_DARK,
            bg_panel: colors::BG_PANEL,
            bg_highlight: colors::BG_HIGHLIGHT,
            bg_popup: colors::BG_POPUP,
            bg_border: colors::BG_BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            success: colors::SUCCESS,
            error: colors::ERROR,
            pending: colors::PENDING,
            bot: colors::BOT,
            ascii_only,
        }
    }

    #[must_use]
    pub fn text(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    #[must_use]
    pub fn muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    #[must_use]
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .bg(self.bg_highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Marker glyph for tag chips and category headers.
    #[must_use]
    pub fn tag_glyph(&self) -> &'static str {
        if self.ascii_only { "*" } else { "●" }
    }

    /// Expand/collapse markers for category headers.
    #[must_use]
    pub fn fold_glyph(&self, expanded: bool) -> &'static str {
        match (self.ascii_only, expanded) {
            (true, true) => "v",
            (true, false) => ">",
            (false, true) => "▾",
            (false, false) => "▸",
        }
    }
}

/// Parse a `#RRGGBB` tag color, falling back to the muted text color.
#[must_use]
pub fn tag_color(hex: &str, palette: &Palette) -> Color {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return palette.text_muted;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
        _ => palette.text_muted,
    }
}
