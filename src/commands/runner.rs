//! Command runner: the single writer of the output log and status indicator
//!
//! Lives on the interactive loop. Each accepted command gets its own worker
//! task that only runs the process and sends `CommandMessage::Finished` back;
//! every log and status mutation happens here, on the interactive side.
//!
//! One command runs at a time. Submitting while busy queues the request
//! (FIFO). The caller drains `complete`, runs the returned continuation, then
//! calls `pump` to start the next queued command.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc;

use super::executor::execute;
use super::output::{LineKind, OutputSink};
use super::status::StatusIndicator;
use super::{Command, CommandError, CommandMessage, CommandResult, Ticket};

/// What happened to a submitted command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Started(Ticket),
    Queued(Ticket),
}

/// A finished invocation handed back to the caller exactly once
#[derive(Debug)]
pub struct Completion<K> {
    pub ticket: Ticket,
    pub command: Command,
    pub result: CommandResult,
    pub continuation: K,
}

struct Pending<K> {
    ticket: Ticket,
    command: Command,
    continuation: K,
}

/// Serializing command runner; `K` is the caller's continuation type
pub struct CommandRunner<K> {
    tx: mpsc::Sender<CommandMessage>,
    timeout: Option<Duration>,
    output: OutputSink,
    status: StatusIndicator,
    next_ticket: u64,
    in_flight: Option<Pending<K>>,
    queue: VecDeque<Pending<K>>,
}

impl<K> CommandRunner<K> {
    pub fn new(
        tx: mpsc::Sender<CommandMessage>,
        output: OutputSink,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            tx,
            timeout,
            output,
            status: StatusIndicator::default(),
            next_ticket: 0,
            in_flight: None,
            queue: VecDeque::new(),
        }
    }

    pub fn output(&self) -> &OutputSink {
        &self.output
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    /// A command is in flight; mutating actions should be shown as disabled
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of requests waiting behind the in-flight command
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Append an informational line to the output log
    pub fn note(&mut self, text: &str) {
        self.output.note(text);
    }

    /// Replace the finished-state status message
    pub fn annotate_status(&mut self, message: impl Into<String>) {
        self.status.annotate(message);
    }

    /// Clear the visible log and reset the indicator. Allowed while busy;
    /// the in-flight command keeps the indicator in `Running`.
    pub fn clear(&mut self) {
        self.output.clear_view();
        self.status.reset();
    }

    /// Reset the indicator to idle (no effect while a command runs)
    pub fn reset_status(&mut self) {
        self.status.reset();
    }

    /// Start `command` now, or queue it behind the in-flight one
    pub fn submit(&mut self, command: Command, continuation: K) -> Submission {
        self.next_ticket += 1;
        let pending = Pending {
            ticket: Ticket(self.next_ticket),
            command,
            continuation,
        };
        let ticket = pending.ticket;

        if self.is_busy() {
            tracing::debug!(
                "Queued command {:?} behind the running one: {}",
                ticket,
                pending.command.command_line()
            );
            self.queue.push_back(pending);
            return Submission::Queued(ticket);
        }

        self.launch(pending);
        Submission::Started(ticket)
    }

    /// Start the next queued command if nothing is running
    pub fn pump(&mut self) -> Option<Ticket> {
        if self.is_busy() {
            return None;
        }
        let next = self.queue.pop_front()?;
        let ticket = next.ticket;
        self.launch(next);
        Some(ticket)
    }

    fn launch(&mut self, pending: Pending<K>) {
        // Indicator and command line are updated before any process I/O
        self.status.begin(None);
        self.output.command(&pending.command.command_line());

        let tx = self.tx.clone();
        let ticket = pending.ticket;
        let command = pending.command.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            let program = command.program().to_string();
            let worker = tokio::spawn(async move { execute(&command, timeout).await });
            let result = match worker.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Command worker for {} failed: {}", program, e);
                    CommandResult::failed(CommandError::Launch {
                        program,
                        detail: format!("worker task failed: {}", e),
                    })
                }
            };
            if let Err(e) = tx.send(CommandMessage::Finished { ticket, result }).await {
                tracing::warn!("Failed to deliver command result: {}", e);
            }
        });

        self.in_flight = Some(pending);
    }

    /// Record a worker's result. Returns the completion for the in-flight
    /// command, or None for a ticket that is not in flight.
    pub fn complete(&mut self, msg: CommandMessage) -> Option<Completion<K>> {
        let CommandMessage::Finished { ticket, result } = msg;

        if self.in_flight.as_ref().map(|p| p.ticket) != Some(ticket) {
            tracing::warn!("Ignoring result for {:?}, not in flight", ticket);
            return None;
        }
        let pending = self.in_flight.take()?;

        self.output.stream(LineKind::Stdout, &result.stdout);
        self.output.stream(LineKind::Stderr, &result.stderr);

        if !result.success {
            self.output.diagnostic(&diagnostic_line(&result));
        }
        self.status.finish(result.success, None);

        Some(Completion {
            ticket,
            command: pending.command,
            result,
            continuation: pending.continuation,
        })
    }
}

/// Synthetic log line stating why a command failed
fn diagnostic_line(result: &CommandResult) -> String {
    match (&result.error, result.exit_code) {
        (Some(err @ CommandError::Launch { .. }), _)
        | (Some(err @ CommandError::TimedOut { .. }), _) => format!("Error: {}", err),
        (_, Some(code)) => format!("Command exited with non-zero status: {}", code),
        (_, None) => "Command was terminated by a signal".to_string(),
    }
}
