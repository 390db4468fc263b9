//! Common layout helpers

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Create a centered box with fixed width and height
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Split area into header, content, and footer
pub fn main_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with status
            Constraint::Min(10),   // Content
            Constraint::Length(1), // Key hints
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Split content into the left column (kernels over actions) and the log
pub fn content_layout(area: Rect, kernel_rows: usize) -> (Rect, Rect, Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Kernels + actions
            Constraint::Percentage(60), // Output log
        ])
        .split(area);

    // Kernel pane grows with the list, up to half the column
    let kernel_height = (kernel_rows as u16)
        .saturating_add(2)
        .min(columns[0].height / 2)
        .max(4);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(kernel_height), Constraint::Min(5)])
        .split(columns[0]);

    (left[0], left[1], columns[1])
}
