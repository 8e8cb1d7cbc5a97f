use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

pub const COLOR_ACCENT: Color = Color::Rgb(255, 102, 0);
pub const COLOR_READ: Color = Color::Rgb(0, 255, 0);
pub const COLOR_TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
pub const COLOR_TEXT_SECONDARY: Color = Color::Rgb(166, 173, 200);
pub const COLOR_BORDER: Color = Color::Rgb(108, 112, 134);
pub const COLOR_ERROR: Color = Color::Rgb(243, 139, 168);

pub const MARKER_UNREAD: &str = "◯";
pub const MARKER_READ: &str = "✔";
pub const MARKER_AT_BOTTOM: &str = "✔";
pub const MARKER_MORE_BELOW: &str = "↓";

pub fn panel() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(COLOR_BORDER))
}

pub fn title_style() -> Style {
    Style::default()
        .fg(COLOR_ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn secondary_style() -> Style {
    Style::default().fg(COLOR_TEXT_SECONDARY)
}

pub fn placeholder_style() -> Style {
    Style::default()
        .fg(COLOR_TEXT_SECONDARY)
        .add_modifier(Modifier::ITALIC)
}

pub fn status_style() -> Style {
    Style::default()
        .fg(COLOR_ERROR)
        .add_modifier(Modifier::BOLD)
}

pub fn read_marker_style(read: bool) -> Style {
    if read {
        Style::default().fg(COLOR_READ)
    } else {
        Style::default().fg(COLOR_TEXT_PRIMARY)
    }
}
