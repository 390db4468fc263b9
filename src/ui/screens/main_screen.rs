//! Main screen: status header, kernel list, action menu and output log

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus, ACTIONS};
use crate::commands::Status;
use crate::ui::layout::{content_layout, main_layout};
use crate::ui::theme;
use crate::ui::widgets::{LogView, MenuList, Spinner};

pub fn draw(frame: &mut Frame, app: &App) {
    let (header, content, footer) = main_layout(frame.area());
    let (kernels_area, actions_area, log_area) = content_layout(content, app.kernels.items.len());

    draw_header(frame, header, app);
    draw_kernels(frame, kernels_area, app);
    draw_actions(frame, actions_area, app);

    let log = LogView::new(app.runner().output().visible())
        .title(" Output ")
        .scroll_back(app.log_scroll);
    frame.render_widget(log, log_area);

    draw_footer(frame, footer);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border())
        .title(Span::styled(" Fedora Kernel Manager ", theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(2), Constraint::Min(10)])
        .split(inner);

    let status = app.runner().status();
    if status.status() == Status::Running {
        frame.render_widget(Spinner::new(app.spinner_state), chunks[0]);
    }

    let mut spans = vec![
        Span::styled("Status: ", theme::dim()),
        Span::styled(status.label(), theme::status(status.status())),
    ];
    let queued = app.runner().queued();
    if queued > 0 {
        spans.push(Span::styled(format!("  ({} queued)", queued), theme::dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
}

fn draw_kernels(frame: &mut Frame, area: Rect, app: &App) {
    if app.kernels.items.is_empty() {
        let empty = Paragraph::new(Span::styled("No kernels listed", theme::dim())).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if app.focus == Focus::Kernels {
                    theme::border_active()
                } else {
                    theme::border()
                })
                .title(Span::styled(" Installed kernels ", theme::title())),
        );
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<&str> = app.kernels.items.iter().map(|k| k.as_str()).collect();
    let list = MenuList::new(items, app.kernels.cursor)
        .title(" Installed kernels ")
        .checked(&app.kernels.checked)
        .focused(app.focus == Focus::Kernels);
    frame.render_widget(list, area);
}

fn draw_actions(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<&str> = ACTIONS.iter().map(|a| a.label()).collect();
    let disabled = ACTIONS.iter().map(|a| app.action_disabled(*a)).collect();
    let menu = MenuList::new(items, app.selected_action)
        .title(" Actions ")
        .disabled(disabled)
        .focused(app.focus == Focus::Actions);
    frame.render_widget(menu, area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("[", theme::dim()),
        Span::styled("↑↓", theme::key_hint()),
        Span::styled("] Navigate  [", theme::dim()),
        Span::styled("Enter", theme::key_hint()),
        Span::styled("] Select  [", theme::dim()),
        Span::styled("Tab", theme::key_hint()),
        Span::styled("] Switch pane  [", theme::dim()),
        Span::styled("Space", theme::key_hint()),
        Span::styled("] Mark kernel  [", theme::dim()),
        Span::styled("PgUp/PgDn", theme::key_hint()),
        Span::styled("] Scroll  [", theme::dim()),
        Span::styled("q", theme::key_hint()),
        Span::styled("] Quit", theme::dim()),
    ]);

    let footer = Paragraph::new(hints).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}
