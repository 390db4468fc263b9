//! Status indicator reflecting the latest command outcome

/// Indicator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Small state machine: idle -> running -> {succeeded, failed} -> idle
#[derive(Debug, Clone)]
pub struct StatusIndicator {
    status: Status,
    message: Option<String>,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            message: None,
        }
    }
}

impl StatusIndicator {
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Text shown next to the indicator
    pub fn label(&self) -> &str {
        match (self.status, self.message()) {
            (_, Some(message)) => message,
            (Status::Idle, None) => "Idle",
            (Status::Running, None) => "Running...",
            (Status::Succeeded, None) => "Completed successfully",
            (Status::Failed, None) => "Failed!",
        }
    }

    /// A command was launched. Allowed from any state.
    pub fn begin(&mut self, message: Option<String>) {
        self.status = Status::Running;
        self.message = message;
    }

    /// The running command finished. Returns false when nothing was running.
    pub fn finish(&mut self, success: bool, message: Option<String>) -> bool {
        if self.status != Status::Running {
            tracing::warn!("Status finish({}) without a running command", success);
            return false;
        }
        self.status = if success {
            Status::Succeeded
        } else {
            Status::Failed
        };
        self.message = message;
        true
    }

    /// Back to idle from a finished state. Ignored while running.
    pub fn reset(&mut self) -> bool {
        if self.status == Status::Running {
            return false;
        }
        self.status = Status::Idle;
        self.message = None;
        true
    }

    /// Replace the message of a finished state, e.g. after a workflow shows its result
    pub fn annotate(&mut self, message: impl Into<String>) {
        if matches!(self.status, Status::Succeeded | Status::Failed) {
            self.message = Some(message.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let status = StatusIndicator::default();
        assert_eq!(status.status(), Status::Idle);
        assert_eq!(status.label(), "Idle");
    }

    #[test]
    fn test_full_cycle() {
        let mut status = StatusIndicator::default();
        status.begin(None);
        assert_eq!(status.status(), Status::Running);
        assert!(status.finish(true, None));
        assert_eq!(status.status(), Status::Succeeded);
        assert_eq!(status.label(), "Completed successfully");
        assert!(status.reset());
        assert_eq!(status.status(), Status::Idle);
    }

    #[test]
    fn test_failure_label() {
        let mut status = StatusIndicator::default();
        status.begin(None);
        status.finish(false, None);
        assert_eq!(status.status(), Status::Failed);
        assert_eq!(status.label(), "Failed!");
    }

    #[test]
    fn test_finish_without_running_is_rejected() {
        let mut status = StatusIndicator::default();
        assert!(!status.finish(true, None));
        assert_eq!(status.status(), Status::Idle);
    }

    #[test]
    fn test_reset_ignored_while_running() {
        let mut status = StatusIndicator::default();
        status.begin(Some("Removing kernels...".into()));
        assert!(!status.reset());
        assert_eq!(status.label(), "Removing kernels...");
    }

    #[test]
    fn test_annotate_only_after_finish() {
        let mut status = StatusIndicator::default();
        status.annotate("ignored");
        assert_eq!(status.label(), "Idle");
        status.begin(None);
        status.finish(true, None);
        status.annotate("Boot entries shown");
        assert_eq!(status.label(), "Boot entries shown");
    }
}
