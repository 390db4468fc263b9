//! Terminal color theme

use ratatui::style::{Color, Modifier, Style};

use crate::commands::{LineKind, Status};

pub const PRIMARY: Color = Color::Cyan;
pub const SECONDARY: Color = Color::Blue;
pub const SUCCESS: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;
pub const TEXT: Color = Color::White;
pub const DIM: Color = Color::DarkGray;

/// Title style (headers)
pub fn title() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

/// Normal text
pub fn text() -> Style {
    Style::default().fg(TEXT)
}

/// Dimmed/inactive text
pub fn dim() -> Style {
    Style::default().fg(DIM)
}

/// Selected/highlighted item
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn success() -> Style {
    Style::default().fg(SUCCESS)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn error() -> Style {
    Style::default().fg(ERROR)
}

/// Border style
pub fn border() -> Style {
    Style::default().fg(DIM)
}

/// Active border (focused)
pub fn border_active() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

/// Key hint style
pub fn key_hint() -> Style {
    Style::default().fg(SECONDARY)
}

/// Version/info style
pub fn info() -> Style {
    Style::default().fg(SECONDARY)
}

/// Output log line by origin
pub fn log_line(kind: LineKind) -> Style {
    match kind {
        LineKind::Command => info().add_modifier(Modifier::BOLD),
        LineKind::Header => dim(),
        LineKind::Stdout => text(),
        LineKind::Stderr => warning(),
        LineKind::Diagnostic => error(),
        LineKind::Note => success(),
    }
}

/// Status indicator color
pub fn status(status: Status) -> Style {
    match status {
        Status::Idle => dim(),
        Status::Running => info(),
        Status::Succeeded => success(),
        Status::Failed => error().add_modifier(Modifier::BOLD),
    }
}
