//! Modal popups drawn over the main screen

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::Dialog;
use crate::system::BootEntry;
use crate::ui::layout::centered_fixed;
use crate::ui::theme;

const DIALOG_WIDTH: u16 = 70;

/// Draw the dialog at the front of the queue. `scroll` applies to message dialogs.
pub fn draw(frame: &mut Frame, dialog: &Dialog, scroll: u16) {
    match dialog {
        Dialog::Info { title, body } => {
            draw_message(frame, title, body, scroll, theme::border_active())
        }
        Dialog::Error { title, body } => draw_message(frame, title, body, scroll, theme::error()),
        Dialog::Confirm { confirmation, yes } => draw_confirm(frame, &confirmation.prompt, *yes),
        Dialog::ChooseBootEntry { entries, selected } => {
            draw_boot_entries(frame, entries, *selected)
        }
        Dialog::EditInstallLimit {
            current,
            input,
            error,
        } => {
            let mut lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled("Current installonly_limit: ", theme::dim()),
                    Span::styled(current.to_string(), theme::text()),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("New value (1-10): ", theme::text()),
                    Span::styled(format!("{}_", input), theme::title()),
                ]),
                Line::from(""),
            ];
            if let Some(error) = error {
                lines.push(Line::from(Span::styled(error.as_str(), theme::error())));
            } else {
                lines.push(Line::from(""));
            }
            lines.push(hints(&[("Enter", "Save"), ("Esc", "Cancel")]));
            draw_popup(frame, " Install-only limit ", lines, 50, theme::border_active());
        }
    }
}

/// Draw the exit confirmation popup centered on screen
pub fn draw_exit_confirm(frame: &mut Frame, busy: bool) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Are you sure you want to exit?", theme::text())),
    ];
    if busy {
        lines.push(Line::from(Span::styled(
            "A command is still running and will be stopped.",
            theme::warning(),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(hints(&[("Enter/Y", "Yes"), ("Esc/N", "No")]));
    draw_popup(frame, " Exit ", lines, 52, theme::warning());
}

fn draw_message(frame: &mut Frame, title: &str, body: &str, scroll: u16, border: Style) {
    let mut lines = vec![Line::from("")];
    lines.extend(body.lines().map(|l| Line::from(Span::styled(l.to_string(), theme::text()))));
    lines.push(Line::from(""));
    // Keys stay on the border so they remain visible while scrolling
    let footer = hints(&[("↑↓/PgUp/PgDn", "Scroll"), ("Enter", "Close")]);
    let area = popup_area(frame.area(), &lines, DIALOG_WIDTH, 1);
    frame.render_widget(Clear, area);
    let content = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(popup_block(title, border).title_bottom(footer));
    frame.render_widget(content, area);
}

fn draw_confirm(frame: &mut Frame, prompt: &str, yes: bool) {
    let mut lines = vec![Line::from("")];
    lines.extend(prompt.lines().map(|l| Line::from(Span::styled(l.to_string(), theme::text()))));
    lines.push(Line::from(""));

    let button = |label: &'static str, active: bool| {
        Span::styled(
            format!("  {}  ", label),
            if active { theme::selected() } else { theme::dim() },
        )
    };
    lines.push(Line::from(vec![button("Yes", yes), Span::raw("   "), button("No", !yes)]).alignment(Alignment::Center));
    lines.push(Line::from(""));
    lines.push(hints(&[("←→", "Choose"), ("Enter", "Confirm"), ("Esc", "Cancel")]));
    draw_popup(frame, " Confirm ", lines, DIALOG_WIDTH, theme::warning());
}

fn draw_boot_entries(frame: &mut Frame, entries: &[BootEntry], selected: usize) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Choose the new default boot entry:", theme::text())),
        Line::from(""),
    ];
    for (i, entry) in entries.iter().enumerate() {
        let (prefix, style) = if i == selected {
            ("> ", theme::selected())
        } else {
            ("  ", theme::text())
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}: {}", prefix, entry.index, entry.title),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(hints(&[("↑/↓", "Navigate"), ("Enter", "Set default"), ("Esc", "Cancel")]));
    draw_popup(frame, " Set default boot entry ", lines, DIALOG_WIDTH, theme::border_active());
}

fn hints(keys: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, label)) in keys.iter().enumerate() {
        let open = if i == 0 { "[" } else { "  [" };
        spans.push(Span::styled(open, theme::dim()));
        spans.push(Span::styled(key.to_string(), theme::key_hint()));
        spans.push(Span::styled(format!("] {}", label), theme::dim()));
    }
    Line::from(spans).alignment(Alignment::Center)
}

fn draw_popup(frame: &mut Frame, title: &str, lines: Vec<Line>, width: u16, border: Style) {
    let area = popup_area(frame.area(), &lines, width, 0);

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let content = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(popup_block(title, border));
    frame.render_widget(content, area);
}

fn popup_block(title: &str, border: Style) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", title.trim()), theme::title()))
}

/// Centered area sized to `lines`, capped at the screen
fn popup_area(screen: Rect, lines: &[Line], width: u16, extra_rows: u16) -> Rect {
    let width = width.min(screen.width.saturating_sub(4));
    // Borders plus a rough allowance for wrapped lines
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let rows: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    let rows = u16::try_from(rows).unwrap_or(u16::MAX);
    let height = rows
        .saturating_add(2)
        .saturating_add(extra_rows)
        .min(screen.height.saturating_sub(2));
    centered_fixed(width, height, screen)
}
