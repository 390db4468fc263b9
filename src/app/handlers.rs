//! Keyboard input handlers for the application

use crossterm::event::KeyCode;

use super::state::*;
use super::workflow::Workflow;
use super::App;
use crate::constants::MAX_INPUT_LENGTH;
use crate::system::validate_install_limit;

/// Lines moved per PageUp/PageDown in the output pane
const LOG_PAGE: usize = 10;

impl App {
    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyCode) {
        // Handle exit confirmation dialog
        if self.show_exit_confirm {
            match key {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.show_exit_confirm = false;
                }
                _ => {}
            }
            return;
        }

        if !self.dialogs.is_empty() {
            self.handle_dialog_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.show_exit_confirm = true;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Kernels => Focus::Actions,
                    Focus::Actions => Focus::Kernels,
                };
            }
            KeyCode::PageUp => {
                self.log_scroll = self.log_scroll.saturating_add(LOG_PAGE);
            }
            KeyCode::PageDown => {
                self.log_scroll = self.log_scroll.saturating_sub(LOG_PAGE);
            }
            KeyCode::End => {
                self.log_scroll = 0;
            }
            KeyCode::Char('r') => self.run_action(Action::RefreshKernels),
            KeyCode::Char('c') => self.run_action(Action::ClearScreen),
            _ => match self.focus {
                Focus::Actions => self.handle_action_menu_key(key),
                Focus::Kernels => self.handle_kernel_list_key(key),
            },
        }
    }

    fn handle_action_menu_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_action = self.selected_action.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_action = (self.selected_action + 1).min(ACTIONS.len() - 1);
            }
            KeyCode::Enter => {
                if let Some(action) = ACTIONS.get(self.selected_action) {
                    self.run_action(*action);
                }
            }
            _ => {}
        }
    }

    fn handle_kernel_list_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.kernels.up(),
            KeyCode::Down | KeyCode::Char('j') => self.kernels.down(),
            KeyCode::Char(' ') => self.kernels.toggle(),
            KeyCode::Enter => self.run_action(Action::KernelDetails),
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyCode) {
        let Some(dialog) = self.dialogs.current_mut() else {
            return;
        };

        match dialog {
            Dialog::Info { .. } | Dialog::Error { .. } => match key {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                    self.dialogs.dismiss();
                }
                KeyCode::Up | KeyCode::Char('k') => self.dialogs.scroll_by(-1),
                KeyCode::Down | KeyCode::Char('j') => self.dialogs.scroll_by(1),
                KeyCode::PageUp => self.dialogs.scroll_by(-(LOG_PAGE as i32)),
                KeyCode::PageDown => self.dialogs.scroll_by(LOG_PAGE as i32),
                _ => {}
            },
            Dialog::Confirm { yes, .. } => match key {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                    *yes = !*yes;
                }
                KeyCode::Char('y') | KeyCode::Char('Y') => self.accept_confirmation(),
                KeyCode::Enter if *yes => self.accept_confirmation(),
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.dialogs.dismiss();
                }
                _ => {}
            },
            Dialog::ChooseBootEntry { entries, selected } => match key {
                KeyCode::Up | KeyCode::Char('k') => {
                    *selected = selected.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    *selected = (*selected + 1).min(entries.len().saturating_sub(1));
                }
                KeyCode::Enter => {
                    let index = entries.get(*selected).map(|e| e.index);
                    self.dialogs.dismiss();
                    if let Some(index) = index {
                        let command = self.context().catalog.set_default_index(index);
                        self.submit(command, Workflow::DefaultEntrySet { index });
                    }
                }
                KeyCode::Esc => {
                    self.dialogs.dismiss();
                }
                _ => {}
            },
            Dialog::EditInstallLimit { input, error, .. } => match key {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    if input.len() < MAX_INPUT_LENGTH {
                        input.push(c);
                        *error = None;
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                    *error = None;
                }
                KeyCode::Enter => match validate_install_limit(input) {
                    Ok(limit) => {
                        self.dialogs.dismiss();
                        let command = self.context().catalog.write_install_limit(limit);
                        self.submit(command, Workflow::InstallLimitWritten { limit });
                    }
                    Err(e) => *error = Some(e.to_string()),
                },
                KeyCode::Esc => {
                    self.dialogs.dismiss();
                }
                _ => {}
            },
        }
    }

    fn accept_confirmation(&mut self) {
        if let Some(Dialog::Confirm { confirmation, .. }) = self.dialogs.dismiss() {
            self.submit(confirmation.command, confirmation.next);
        }
    }
}
