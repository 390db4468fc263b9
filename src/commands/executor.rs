//! Async process execution with captured output

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as Process;

use super::{Command, CommandError, CommandResult, Invocation};

/// Run one command to completion and classify the outcome.
///
/// Never fails: launch errors and timeouts are folded into the result.
pub async fn execute(cmd: &Command, timeout: Option<Duration>) -> CommandResult {
    tracing::info!("Running command: {}", cmd.command_line());

    let mut process = match cmd.invocation() {
        Invocation::Argv(argv) => {
            let Some((program, args)) = argv.split_first() else {
                return CommandResult::failed(CommandError::Launch {
                    program: String::new(),
                    detail: "empty argument vector".to_string(),
                });
            };
            let mut p = Process::new(program);
            p.args(args);
            p
        }
        Invocation::Shell(script) => {
            let mut p = Process::new("sh");
            p.arg("-c").arg(script);
            p
        }
    };
    process
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match process.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!("Failed to spawn {}: {}", cmd.program(), e);
            return CommandResult::failed(CommandError::Launch {
                program: cmd.program().to_string(),
                detail: e.to_string(),
            });
        }
    };

    let waited = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(waited) => waited,
            // Dropping the future drops the child, which kills it
            Err(_) => {
                tracing::warn!(
                    "Command timed out after {}s: {}",
                    whole_seconds(limit),
                    cmd.command_line()
                );
                return CommandResult::failed(CommandError::TimedOut {
                    secs: whole_seconds(limit),
                });
            }
        },
        None => child.wait_with_output().await,
    };

    let output = match waited {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("Failed to wait for {}: {}", cmd.program(), e);
            return CommandResult::failed(CommandError::Launch {
                program: cmd.program().to_string(),
                detail: e.to_string(),
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let result = CommandResult::from_exit(
        cmd.tolerated_exit_codes(),
        output.status.code(),
        stdout,
        stderr,
    );

    tracing::info!(
        "Command completed with success={} exit_code={:?}",
        result.success,
        result.exit_code
    );
    result
}

/// Seconds shown for a timeout, rounded up so sub-second limits never read as 0s
fn whole_seconds(limit: Duration) -> u64 {
    limit.as_millis().div_ceil(1000) as u64
}
