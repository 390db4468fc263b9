//! Command failure taxonomy and categorization
//!
//! `CommandError` is what the engine records inside a `CommandResult`.
//! `ParsedError` turns a failed result into a user-friendly message with an
//! actionable suggestion.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use super::CommandResult;

/// Failure recorded for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Executable missing or unrunnable; no output was captured
    #[error("failed to launch {program}: {detail}")]
    Launch { program: String, detail: String },
    /// Process ran but exited non-zero (strict commands) or was killed
    #[error("command exited with status {}", status_text(.exit_code))]
    Execution {
        exit_code: Option<i32>,
        detail: String,
    },
    /// Bounded timeout elapsed; the child was killed
    #[error("command timed out after {secs}s")]
    TimedOut { secs: u64 },
}

fn status_text(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// Parsed error with user-friendly information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedError {
    /// Short summary (one line)
    pub summary: String,
    /// Longer description if available
    pub detail: Option<String>,
    /// User-friendly suggestion
    pub suggestion: String,
}

/// Context about what operation was running
pub struct ErrorContext<'a> {
    /// Caller-supplied failure message
    pub operation: &'a str,
    /// Configured privilege-escalation helper
    pub helper: &'a str,
}

impl ParsedError {
    /// Categorize a failed result
    pub fn from_result(result: &CommandResult, context: ErrorContext<'_>) -> Self {
        if let Some(CommandError::Launch { program, detail }) = &result.error {
            return parse_launch_error(program, detail, &context);
        }
        if let Some(CommandError::TimedOut { secs }) = &result.error {
            return Self {
                summary: context.operation.to_string(),
                detail: Some(format!("No result after {}s, the process was stopped.", secs)),
                suggestion: "Raise command_timeout_secs in the configuration if the tool needs longer."
                    .to_string(),
            };
        }

        let stderr = result.stderr.as_str();
        if let Some(err) = parse_authorization_error(result.exit_code, stderr, &context) {
            return err;
        }
        if let Some(err) = parse_missing_tool_error(result.exit_code, stderr) {
            return err;
        }
        if let Some(err) = parse_dnf_error(stderr) {
            return err;
        }
        if let Some(err) = parse_permission_error(stderr) {
            return err;
        }

        Self::generic(result, context)
    }

    fn generic(result: &CommandResult, context: ErrorContext<'_>) -> Self {
        let detail = result.detail();
        // Try to extract the first meaningful error line
        let first_error = detail
            .lines()
            .find(|line| line.to_lowercase().contains("error"))
            .or_else(|| detail.lines().find(|line| !line.trim().is_empty()))
            .unwrap_or("Unknown error");

        let detail = first_error
            .trim()
            .trim_start_matches("Error:")
            .trim_start_matches("error:")
            .trim()
            .to_string();

        Self {
            summary: context.operation.to_string(),
            detail: if detail.is_empty() { None } else { Some(detail) },
            suggestion: "Check the output log for details.".to_string(),
        }
    }

    /// Multi-line text for dialogs
    pub fn render(&self) -> String {
        let mut text = self.summary.clone();
        if let Some(detail) = &self.detail {
            text.push_str("\nError: ");
            text.push_str(detail);
        }
        text.push_str("\n\n");
        text.push_str(&self.suggestion);
        text
    }
}

fn parse_launch_error(program: &str, detail: &str, context: &ErrorContext<'_>) -> ParsedError {
    if program == context.helper {
        return ParsedError {
            summary: "Privilege helper not available".to_string(),
            detail: Some(format!("{}: {}", program, detail)),
            suggestion: format!(
                "Install {} (polkit) or set privilege_helper in the configuration.",
                program
            ),
        };
    }
    ParsedError {
        summary: "Command not found or path error".to_string(),
        detail: Some(format!("{}: {}", program, detail)),
        suggestion: format!("Make sure {} is installed and on PATH.", program),
    }
}

fn parse_authorization_error(
    exit_code: Option<i32>,
    stderr: &str,
    context: &ErrorContext<'_>,
) -> Option<ParsedError> {
    let lower = stderr.to_lowercase();
    let declined = lower.contains("request dismissed")
        || lower.contains("not authorized")
        || (exit_code == Some(126) && context.helper == "pkexec");
    if !declined {
        return None;
    }
    Some(ParsedError {
        summary: "Authorization was declined".to_string(),
        detail: Some(format!("{} did not grant elevated rights", context.helper)),
        suggestion: "Run the action again and approve the authentication prompt.".to_string(),
    })
}

fn parse_missing_tool_error(exit_code: Option<i32>, stderr: &str) -> Option<ParsedError> {
    let lower = stderr.to_lowercase();
    if exit_code != Some(127) && !lower.contains("command not found") {
        return None;
    }
    let tool = MISSING_TOOL_RE
        .captures(stderr)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    Some(ParsedError {
        summary: "Required tool is not installed".to_string(),
        detail: tool,
        suggestion: "Install the missing tool with dnf and try again.".to_string(),
    })
}

static MISSING_TOOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)([\w./-]+): (?:command )?not found").unwrap());

static DNF_NO_MATCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"No match for argument:\s*(\S+)").unwrap());

fn parse_dnf_error(stderr: &str) -> Option<ParsedError> {
    if stderr.contains("protected package") {
        return Some(ParsedError {
            summary: "Refused to remove a protected kernel".to_string(),
            detail: stderr
                .lines()
                .find(|l| l.contains("protected"))
                .map(|l| l.trim().to_string()),
            suggestion: "The running kernel cannot be removed. Boot another kernel first."
                .to_string(),
        });
    }
    if let Some(caps) = DNF_NO_MATCH_RE.captures(stderr) {
        return Some(ParsedError {
            summary: "Package not installed".to_string(),
            detail: caps.get(1).map(|m| m.as_str().to_string()),
            suggestion: "Refresh the kernel list and select again.".to_string(),
        });
    }
    None
}

// Permission error pattern
static PERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)permission denied[:\s]*([^\n]*)").unwrap());

fn parse_permission_error(stderr: &str) -> Option<ParsedError> {
    if let Some(caps) = PERM_RE.captures(stderr) {
        let path = caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        return Some(ParsedError {
            summary: "Permission denied".to_string(),
            detail: path,
            suggestion: "This action needs root. Check the privilege helper configuration."
                .to_string(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(operation: &str) -> ErrorContext<'_> {
        ErrorContext {
            operation,
            helper: "pkexec",
        }
    }

    fn failed(exit_code: i32, stderr: &str) -> CommandResult {
        CommandResult::from_exit(&[], Some(exit_code), String::new(), stderr.to_string())
    }

    #[test]
    fn test_pkexec_dismissed() {
        let result = failed(126, "Error executing command as another user: Request dismissed");
        let err = ParsedError::from_result(&result, ctx("Failed to remove kernels."));
        assert_eq!(err.summary, "Authorization was declined");
    }

    #[test]
    fn test_helper_missing_is_launch_failure() {
        let result = CommandResult::failed(CommandError::Launch {
            program: "pkexec".into(),
            detail: "No such file or directory (os error 2)".into(),
        });
        let err = ParsedError::from_result(&result, ctx("Failed to regenerate GRUB."));
        assert_eq!(err.summary, "Privilege helper not available");
        assert!(err.detail.unwrap().contains("pkexec"));
    }

    #[test]
    fn test_other_launch_failure() {
        let result = CommandResult::failed(CommandError::Launch {
            program: "grubby".into(),
            detail: "No such file or directory (os error 2)".into(),
        });
        let err = ParsedError::from_result(&result, ctx("Failed."));
        assert_eq!(err.summary, "Command not found or path error");
    }

    #[test]
    fn test_missing_tool_exit_127() {
        let result = failed(127, "sh: line 1: lscpu: command not found");
        let err = ParsedError::from_result(&result, ctx("Failed to read system info."));
        assert_eq!(err.summary, "Required tool is not installed");
        assert_eq!(err.detail.as_deref(), Some("lscpu"));
    }

    #[test]
    fn test_dnf_protected_package() {
        let stderr = "Error:\n Problem: The operation would result in removing the following protected packages: kernel-core";
        let err = ParsedError::from_result(&failed(1, stderr), ctx("Failed to remove kernels."));
        assert_eq!(err.summary, "Refused to remove a protected kernel");
    }

    #[test]
    fn test_dnf_no_match() {
        let stderr = "No match for argument: kernel-1.0\nError: No packages marked for removal.";
        let err = ParsedError::from_result(&failed(1, stderr), ctx("Failed to remove kernels."));
        assert_eq!(err.summary, "Package not installed");
        assert_eq!(err.detail.as_deref(), Some("kernel-1.0"));
    }

    #[test]
    fn test_permission_denied() {
        let stderr = "rm: cannot remove '/boot/x': Permission denied";
        let err = ParsedError::from_result(&failed(1, stderr), ctx("Failed."));
        assert_eq!(err.summary, "Permission denied");
    }

    #[test]
    fn test_generic_keeps_context_and_detail() {
        let err = ParsedError::from_result(&failed(3, "something odd\n"), ctx("Failed to list kernels."));
        assert_eq!(err.summary, "Failed to list kernels.");
        assert_eq!(err.detail.as_deref(), Some("something odd"));
        assert!(err.render().starts_with("Failed to list kernels.\nError: something odd"));
    }

    #[test]
    fn test_generic_falls_back_to_exit_code() {
        let err = ParsedError::from_result(&failed(4, ""), ctx("Failed."));
        assert_eq!(err.detail.as_deref(), Some("exit code 4"));
    }
}
