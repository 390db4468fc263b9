//! Command message handling for the application

use super::state::Dialog;
use super::App;
use crate::commands::errors::{ErrorContext, ParsedError};
use crate::commands::CommandMessage;

impl App {
    /// Handle a finished command: report failures, run its continuation,
    /// then start whatever was queued behind it
    pub fn handle_command_message(&mut self, msg: CommandMessage) {
        let Some(done) = self.runner.complete(msg) else {
            return;
        };
        tracing::info!(
            "Command {:?} finished (success: {}): {}",
            done.ticket,
            done.result.success,
            done.command.command_line()
        );

        if done.result.error.is_some() {
            let parsed = ParsedError::from_result(
                &done.result,
                ErrorContext {
                    operation: done.command.error_context(),
                    helper: self.catalog.helper(),
                },
            );
            self.runner.note(&format!(
                "{} {}",
                done.command.error_context(),
                parsed.detail.as_deref().unwrap_or(&parsed.summary)
            ));
            self.dialogs.push(Dialog::Error {
                title: done.command.error_context().to_string(),
                body: parsed.render(),
            });
        }

        let effects = done.continuation.resume(&done.result, &self.context());
        self.apply_effects(effects);

        if let Some(ticket) = self.runner.pump() {
            tracing::debug!("Started queued command {:?}", ticket);
        }
    }
}
