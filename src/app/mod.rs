//! Application state management
//!
//! This module contains the interactive application and is split into:
//! - `state.rs` - State type definitions (actions, kernel list, dialogs)
//! - `workflow.rs` - Typed continuations for every operator action
//! - `handlers.rs` - Keyboard input handlers
//! - `messages.rs` - Command completion handling

mod handlers;
mod messages;
pub mod state;
pub mod workflow;

use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::commands::{Catalog, CommandMessage, CommandRunner, OutputSink, Submission};
use crate::config::AppConfig;
use crate::constants::SPINNER_TICK_MS;

pub use state::{Action, Dialog, DialogQueue, Focus, KernelList, ACTIONS};
pub use workflow::{Context, Effect, Host, LocalHost, Workflow};

/// Main application state
pub struct App {
    pub should_quit: bool,
    pub show_exit_confirm: bool,
    pub spinner_state: usize,
    pub last_tick: Instant,
    pub focus: Focus,
    pub selected_action: usize,
    pub kernels: KernelList,
    pub dialogs: DialogQueue,
    /// Lines scrolled back from the tail; 0 follows new output
    pub log_scroll: usize,
    pub screen_log_path: Option<PathBuf>,
    pub(crate) runner: CommandRunner<Workflow>,
    catalog: Catalog,
    host: Box<dyn Host>,
}

impl App {
    pub fn new(config: &AppConfig, tx: mpsc::Sender<CommandMessage>) -> Self {
        // Set up screen log file
        let log_dir = crate::constants::fkm_data_dir();
        let screen_log_path = match std::fs::create_dir_all(&log_dir) {
            Ok(()) => Some(log_dir.join(crate::constants::SCREEN_LOG_FILE)),
            Err(e) => {
                tracing::warn!("Failed to create {}: {}", log_dir.display(), e);
                None
            }
        };

        let mut output = OutputSink::new(config.output.max_lines);
        if let Some(path) = &screen_log_path {
            output = output.mirror_to(path);
        }

        Self::with_parts(
            CommandRunner::new(tx, output, config.command_timeout()),
            Catalog::new(config),
            Box::new(LocalHost),
            screen_log_path,
        )
    }

    fn with_parts(
        runner: CommandRunner<Workflow>,
        catalog: Catalog,
        host: Box<dyn Host>,
        screen_log_path: Option<PathBuf>,
    ) -> Self {
        Self {
            should_quit: false,
            show_exit_confirm: false,
            spinner_state: 0,
            last_tick: Instant::now(),
            focus: Focus::default(),
            selected_action: 0,
            kernels: KernelList::default(),
            dialogs: DialogQueue::default(),
            log_scroll: 0,
            screen_log_path,
            runner,
            catalog,
            host,
        }
    }

    pub fn runner(&self) -> &CommandRunner<Workflow> {
        &self.runner
    }

    /// Called on each tick to update animations
    pub fn tick(&mut self) {
        if self.last_tick.elapsed().as_millis() >= SPINNER_TICK_MS {
            self.spinner_state = (self.spinner_state + 1) % 10;
            self.last_tick = Instant::now();
        }
    }

    /// Populate the kernel list on startup
    pub fn start_initial_command(&mut self) {
        self.run_action(Action::RefreshKernels);
    }

    /// Selecting `action` in the menu is refused right now
    pub fn action_disabled(&self, action: Action) -> bool {
        action.is_mutating() && self.runner.is_busy()
    }

    /// Start an operator action
    pub fn run_action(&mut self, action: Action) {
        if self.action_disabled(action) {
            self.runner
                .note(&format!("'{}' is unavailable while a command is running.", action.label()));
            return;
        }

        match action {
            Action::ClearScreen => {
                self.runner.clear();
                self.kernels.clear();
                self.log_scroll = 0;
            }
            Action::About => self.dialogs.push(Dialog::Info {
                title: "About".to_string(),
                body: about_text(),
            }),
            _ => {
                let selected = self.kernels.selection();
                let effects = Workflow::start(action, &self.context(), &selected);
                self.apply_effects(effects);
            }
        }
    }

    /// Apply effects returned by a workflow step
    pub(crate) fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Info { title, body } => self.dialogs.push(Dialog::Info { title, body }),
                Effect::Error { title, body } => {
                    self.runner.note(&format!("{}: {}", title, body));
                    self.dialogs.push(Dialog::Error { title, body });
                }
                Effect::Kernels(kernels) => self.kernels.replace(kernels),
                Effect::Run(command, next) => self.submit(command, next),
                Effect::Confirm(confirmation) => self.dialogs.push(Dialog::Confirm {
                    confirmation,
                    yes: false,
                }),
                Effect::ChooseBootEntry(entries) => self.dialogs.push(Dialog::ChooseBootEntry {
                    entries,
                    selected: 0,
                }),
                Effect::EditInstallLimit(current) => {
                    self.dialogs.push(Dialog::EditInstallLimit {
                        current,
                        input: current.value.to_string(),
                        error: None,
                    })
                }
                Effect::Status(message) => self.runner.annotate_status(message),
                Effect::ResetStatus => self.runner.reset_status(),
            }
        }
    }

    pub(crate) fn submit(&mut self, command: crate::commands::Command, next: Workflow) {
        self.log_scroll = 0;
        if let Submission::Queued(ticket) = self.runner.submit(command, next) {
            tracing::info!("Command {:?} waiting for the running one to finish", ticket);
        }
    }

    pub(crate) fn context(&self) -> Context<'_> {
        Context {
            catalog: &self.catalog,
            host: self.host.as_ref(),
        }
    }
}

fn about_text() -> String {
    format!(
        "Fedora Kernel Manager {}\n\n\
         Manage installed kernels, GRUB boot entries and rescue kernels.\n\n\
         {}",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS")
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::path::Path;

    /// Host where every path exists and nothing is readable
    pub struct EverythingExists;

    impl Host for EverythingExists {
        fn exists(&self, _path: &Path) -> bool {
            true
        }

        fn read_to_string(&self, _path: &Path) -> Option<String> {
            None
        }
    }

    pub fn app() -> (App, mpsc::Receiver<CommandMessage>) {
        let (tx, rx) = mpsc::channel(10);
        let config = AppConfig::default();
        let app = App::with_parts(
            CommandRunner::new(tx, OutputSink::new(100), None),
            Catalog::new(&config),
            Box::new(EverythingExists),
            None,
        );
        (app, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::app;
    use super::*;
    use crate::commands::Status;
    use crate::system::KernelPackage;

    #[tokio::test]
    async fn test_clear_screen_resets_view_and_kernels() {
        let (mut app, _rx) = app();
        app.kernels.replace(vec![KernelPackage::new("kernel-a")]);
        app.runner.note("something");
        app.run_action(Action::ClearScreen);
        assert!(app.kernels.items.is_empty());
        assert!(app.runner().output().is_empty());
        assert_eq!(app.runner().status().status(), Status::Idle);
    }

    #[tokio::test]
    async fn test_about_opens_dialog() {
        let (mut app, _rx) = app();
        app.run_action(Action::About);
        assert!(matches!(app.dialogs.current(), Some(Dialog::Info { title, .. }) if title == "About"));
    }

    #[tokio::test]
    async fn test_selection_error_becomes_dialog_and_log_line() {
        let (mut app, _rx) = app();
        app.run_action(Action::KernelDetails);
        assert!(matches!(app.dialogs.current(), Some(Dialog::Error { .. })));
        assert!(!app.runner().is_busy());
        assert!(app
            .runner()
            .output()
            .visible()
            .any(|l| l.text.contains("Select exactly one kernel")));
    }

    #[tokio::test]
    async fn test_mutating_action_refused_while_busy() {
        let (mut app, _rx) = app();
        app.start_initial_command();
        assert!(app.runner().is_busy());
        assert!(app.action_disabled(Action::RegenerateGrub));
        app.run_action(Action::RegenerateGrub);
        assert!(app.dialogs.is_empty());
        assert!(!app.action_disabled(Action::CurrentKernel));
    }
}
