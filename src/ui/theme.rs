use crate::config::Theme;
use ratatui::style::{Color, Modifier, Style};

/// Styles used by every screen, derived from the selected theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub base: Style,
    pub title: Style,
    pub correct: Style,
    pub incorrect: Style,
    pub pending: Style,
    pub cursor: Style,
    pub muted: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub gauge: Style,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let (fg, bg, accent) = match theme {
            Theme::Light => (Color::Black, Color::White, Color::Blue),
            Theme::Dark => (Color::White, Color::Black, Color::Cyan),
        };
        let pending = Style::default().fg(fg).add_modifier(Modifier::DIM);

        Self {
            base: Style::default().fg(fg).bg(bg),
            title: bold.fg(accent),
            correct: bold.fg(Color::Green),
            incorrect: bold.fg(Color::Red),
            pending,
            cursor: pending.add_modifier(Modifier::UNDERLINED),
            muted: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            info: Style::default().fg(accent).add_modifier(Modifier::ITALIC),
            warning: bold.fg(Color::Yellow),
            error: bold.fg(Color::Red),
            gauge: Style::default().fg(Color::Magenta).bg(bg),
        }
    }
}
