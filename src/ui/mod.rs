//! UI rendering module

mod layout;
mod screens;
pub mod theme;
pub mod widgets;

use ratatui::Frame;

use crate::app::App;

/// Main draw function: the main screen, then any popup on top
pub fn draw(frame: &mut Frame, app: &App) {
    screens::main_screen::draw(frame, app);

    if let Some(dialog) = app.dialogs.current() {
        screens::dialogs::draw(frame, dialog, app.dialogs.scroll());
    }

    // Exit confirmation goes above everything else
    if app.show_exit_confirm {
        screens::dialogs::draw_exit_confirm(frame, app.runner().is_busy());
    }
}
