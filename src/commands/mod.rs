//! Command execution engine
//!
//! - `executor.rs` - launches one external process and captures its output
//! - `runner.rs` - `CommandRunner`: serializes invocations, owns the output log and status
//! - `output.rs` - `OutputSink`, the ordered log of invocations and output
//! - `status.rs` - `StatusIndicator` state machine
//! - `errors.rs` - failure taxonomy and operator-facing categorization
//! - `catalog.rs` - every external command the tool invokes

pub mod catalog;
pub mod errors;
pub mod executor;
pub mod output;
pub mod runner;
pub mod status;

pub use catalog::Catalog;
pub use errors::CommandError;
pub use output::{LineKind, OutputSink};
pub use runner::{CommandRunner, Completion, Submission};
pub use status::{Status, StatusIndicator};

/// Exit status of grep and which when nothing matched
pub const NO_MATCH_EXIT_CODE: i32 = 1;

/// How the external program is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Program followed by its arguments, no shell involved
    Argv(Vec<String>),
    /// A single string interpreted by `sh -c`
    Shell(String),
}

/// One external command, built per invocation and read-only afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    invocation: Invocation,
    error_context: String,
    /// Non-zero exits that mean "nothing found" rather than a failure
    tolerated_exit_codes: Vec<i32>,
}

impl Command {
    /// Program plus arguments
    pub fn argv<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = vec![program.to_string()];
        argv.extend(args.into_iter().map(Into::into));
        Self {
            invocation: Invocation::Argv(argv),
            error_context: "Command failed.".to_string(),
            tolerated_exit_codes: Vec::new(),
        }
    }

    /// Shell string run through `sh -c`
    pub fn shell(script: impl Into<String>) -> Self {
        Self {
            invocation: Invocation::Shell(script.into()),
            error_context: "Command failed.".to_string(),
            tolerated_exit_codes: Vec::new(),
        }
    }

    /// Message shown to the operator when the command fails
    pub fn context(mut self, message: impl Into<String>) -> Self {
        self.error_context = message.into();
        self
    }

    /// Treat exit 1 (grep/which "no match") as an ordinary "not found"
    /// outcome. Any other non-zero exit is still a failure.
    pub fn tolerant(self) -> Self {
        self.tolerate(&[NO_MATCH_EXIT_CODE])
    }

    /// Treat the given non-zero exit codes as "not found"
    pub fn tolerate(mut self, codes: &[i32]) -> Self {
        self.tolerated_exit_codes.extend_from_slice(codes);
        self
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn error_context(&self) -> &str {
        &self.error_context
    }

    pub fn tolerated_exit_codes(&self) -> &[i32] {
        &self.tolerated_exit_codes
    }

    /// Every non-zero exit is a failure
    pub fn strict_exit_code(&self) -> bool {
        self.tolerated_exit_codes.is_empty()
    }

    /// Program name used for diagnostics
    pub fn program(&self) -> &str {
        match &self.invocation {
            Invocation::Argv(argv) => argv.first().map(String::as_str).unwrap_or(""),
            Invocation::Shell(_) => "sh",
        }
    }

    /// Literal command line as written to the output log
    pub fn command_line(&self) -> String {
        match &self.invocation {
            Invocation::Argv(argv) => argv.join(" "),
            Invocation::Shell(script) => script.clone(),
        }
    }
}

/// Outcome of one command, produced exactly once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// None when the process never started or was terminated by a signal
    pub exit_code: Option<i32>,
    /// Populated for launch failures, timeouts, and non-zero exits not tolerated by the command
    pub error: Option<CommandError>,
}

impl CommandResult {
    /// Classify a finished process. Only the `tolerated` exit codes of a
    /// non-zero exit leave `error` unset.
    pub fn from_exit(
        tolerated: &[i32],
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    ) -> Self {
        let success = exit_code == Some(0);
        let benign = exit_code.is_some_and(|code| tolerated.contains(&code));
        let error = if !success && !benign {
            Some(CommandError::Execution {
                exit_code,
                detail: best_detail(&stdout, &stderr, exit_code),
            })
        } else {
            None
        };
        Self {
            success,
            stdout,
            stderr,
            exit_code,
            error,
        }
    }

    /// A result for a command that produced no process output at all
    pub fn failed(error: CommandError) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            error: Some(error),
        }
    }

    /// Trimmed stdout
    pub fn output(&self) -> &str {
        self.stdout.trim()
    }

    /// Succeeded with non-empty stdout
    pub fn has_output(&self) -> bool {
        self.success && !self.output().is_empty()
    }

    /// Best available detail: stderr, then stdout, then the exit code
    pub fn detail(&self) -> String {
        match &self.error {
            Some(CommandError::Launch { detail, .. }) => detail.clone(),
            Some(CommandError::TimedOut { secs }) => format!("timed out after {}s", secs),
            _ => best_detail(&self.stdout, &self.stderr, self.exit_code),
        }
    }
}

fn best_detail(stdout: &str, stderr: &str, exit_code: Option<i32>) -> String {
    let stderr = stderr.trim();
    let stdout = stdout.trim();
    if !stderr.is_empty() {
        stderr.to_string()
    } else if !stdout.is_empty() {
        stdout.to_string()
    } else {
        match exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Identifies one submitted invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

/// Messages sent from worker tasks to the interactive loop
#[derive(Debug, Clone)]
pub enum CommandMessage {
    /// A worker finished its process
    Finished { ticket: Ticket, result: CommandResult },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_command_line() {
        let cmd = Command::argv("rpm", ["-q", "kernel"]);
        assert_eq!(cmd.command_line(), "rpm -q kernel");
        assert_eq!(cmd.program(), "rpm");
        assert!(cmd.strict_exit_code());
    }

    #[test]
    fn test_shell_command_line() {
        let cmd = Command::shell("findmnt -n -o FSTYPE,TARGET / ; which snapper").tolerant();
        assert_eq!(cmd.command_line(), "findmnt -n -o FSTYPE,TARGET / ; which snapper");
        assert_eq!(cmd.program(), "sh");
        assert!(!cmd.strict_exit_code());
    }

    #[test]
    fn test_strict_nonzero_is_failure_regardless_of_stdout() {
        let result = CommandResult::from_exit(&[], Some(1), "lots of output".into(), String::new());
        assert!(!result.success);
        assert!(matches!(
            result.error,
            Some(CommandError::Execution { exit_code: Some(1), .. })
        ));
        assert_eq!(result.detail(), "lots of output");
    }

    #[test]
    fn test_tolerant_nonzero_has_no_error() {
        let result = CommandResult::from_exit(&[1], Some(1), String::new(), String::new());
        assert!(!result.success);
        assert!(result.error.is_none());
        assert_eq!(result.detail(), "exit code 1");
    }

    #[test]
    fn test_tolerant_zero_is_success() {
        let result = CommandResult::from_exit(&[1], Some(0), "installonly_limit=3\n".into(), String::new());
        assert!(result.success);
        assert!(result.has_output());
        assert_eq!(result.output(), "installonly_limit=3");
    }

    #[test]
    fn test_tolerant_command_still_fails_on_other_exit_codes() {
        for code in [2, 126, 127] {
            let result = CommandResult::from_exit(&[1], Some(code), String::new(), "denied".into());
            assert!(!result.success);
            assert!(matches!(
                result.error,
                Some(CommandError::Execution { exit_code: Some(c), .. }) if c == code
            ));
        }
    }

    #[test]
    fn test_tolerate_extends_accepted_codes() {
        let cmd = Command::argv("grep", ["-q", "x", "/f"]).tolerate(&[1, 3]);
        assert_eq!(cmd.tolerated_exit_codes(), &[1, 3]);
        assert!(!cmd.strict_exit_code());
    }

    #[test]
    fn test_killed_process_is_failure_even_when_tolerant() {
        let result = CommandResult::from_exit(&[1], None, String::new(), String::new());
        assert!(!result.success);
        assert!(result.error.is_some());
        assert_eq!(result.detail(), "terminated by signal");
    }

    #[test]
    fn test_detail_prefers_stderr() {
        let result = CommandResult::from_exit(&[], Some(2), "out".into(), "  err  \n".into());
        assert_eq!(result.detail(), "err");
    }
}
