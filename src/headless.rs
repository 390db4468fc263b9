//! Non-interactive queries for scripting (`fkm kernels --json`, ...)
//!
//! Runs the same commands through the same `CommandRunner` as the TUI and
//! prints the parsed result as text or JSON.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::commands::errors::{ErrorContext, ParsedError};
use crate::commands::{Catalog, Command, CommandMessage, CommandResult, CommandRunner, OutputSink};
use crate::config::AppConfig;
use crate::constants::COMMAND_CHANNEL_SIZE;
use crate::system::rescue::RescueArtifact;
use crate::system::{
    parse_boot_entries, parse_kernel_inventory, removable_rescue_files, BootEntry, InstallLimit,
    KernelPackage,
};

/// Read-only query selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Kernels,
    BootEntries,
    Rescue,
    Limit,
}

/// Removable rescue artifacts for the running kernel
#[derive(Debug, Serialize)]
pub struct RescueReport {
    pub current_release: String,
    pub removable: Vec<RescueArtifact>,
}

/// Serial command session without a terminal
struct Session {
    runner: CommandRunner<()>,
    rx: mpsc::Receiver<CommandMessage>,
    helper: String,
}

impl Session {
    fn new(config: &AppConfig) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        Self {
            runner: CommandRunner::new(tx, OutputSink::new(config.output.max_lines), config.command_timeout()),
            rx,
            helper: config.privilege_helper.clone(),
        }
    }

    /// Run one command to completion. Failures carrying an error become `Err`.
    async fn run(&mut self, command: Command) -> Result<CommandResult> {
        self.runner.submit(command, ());
        loop {
            let msg = self
                .rx
                .recv()
                .await
                .context("Command worker stopped without reporting a result")?;
            let Some(done) = self.runner.complete(msg) else {
                continue;
            };

            if done.result.error.is_some() {
                let parsed = ParsedError::from_result(
                    &done.result,
                    ErrorContext {
                        operation: done.command.error_context(),
                        helper: &self.helper,
                    },
                );
                bail!("{}", parsed.render());
            }
            return Ok(done.result);
        }
    }
}

/// Run `query` and print its result to stdout
pub async fn run(query: Query, json: bool, config: &AppConfig) -> Result<()> {
    let catalog = Catalog::new(config);
    let mut session = Session::new(config);

    let rendered = match query {
        Query::Kernels => {
            let result = session.run(catalog.list_kernels()).await?;
            render_kernels(&parse_kernel_inventory(result.output()), json)?
        }
        Query::BootEntries => {
            let result = session.run(catalog.boot_info()).await?;
            render_boot_entries(&parse_boot_entries(result.output()), json)?
        }
        Query::Rescue => {
            let release = session.run(catalog.current_kernel()).await?;
            let listing = session.run(catalog.list_rescue_files()).await?;
            let report = rescue_report(release.output(), listing.output());
            render_rescue(&report, json)?
        }
        Query::Limit => {
            let result = session.run(catalog.read_install_limit()).await?;
            let output = if result.success { result.output() } else { "" };
            render_limit(&InstallLimit::from_config_output(output), json)?
        }
    };

    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

fn rescue_report(release: &str, listing: &str) -> RescueReport {
    let paths: Vec<&str> = listing.lines().collect();
    RescueReport {
        current_release: release.trim().to_string(),
        removable: removable_rescue_files(release, &paths)
            .iter()
            .map(|p| RescueArtifact::parse(p))
            .collect(),
    }
}

fn render_kernels(kernels: &[KernelPackage], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(kernels).context("Failed to serialize kernels");
    }
    Ok(kernels
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn render_boot_entries(entries: &[BootEntry], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(entries).context("Failed to serialize boot entries");
    }
    Ok(entries
        .iter()
        .map(|e| format!("{}\t{}", e.index, e.title))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn render_rescue(report: &RescueReport, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(report).context("Failed to serialize rescue report");
    }
    Ok(report
        .removable
        .iter()
        .map(|a| a.path.clone())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn render_limit(limit: &InstallLimit, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(limit).context("Failed to serialize limit");
    }
    Ok(limit.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_returns_output() {
        let mut session = Session::new(&AppConfig::default());
        let result = session.run(Command::argv("echo", ["kernel-a"])).await.unwrap();
        assert_eq!(result.output(), "kernel-a");
    }

    #[tokio::test]
    async fn test_session_strict_failure_is_err() {
        let mut session = Session::new(&AppConfig::default());
        let err = session
            .run(Command::shell("echo broken 1>&2; exit 1").context("Failed to list installed kernels."))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to list installed kernels."));
        assert!(message.contains("broken"));
    }

    #[tokio::test]
    async fn test_session_tolerant_failure_is_ok() {
        let mut session = Session::new(&AppConfig::default());
        let result = session.run(Command::shell("exit 1").tolerant()).await.unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_session_tolerant_command_fails_on_helper_error() {
        let mut session = Session::new(&AppConfig::default());
        let err = session
            .run(
                Command::shell("echo 'Request dismissed' 1>&2; exit 126")
                    .context("Failed to read installonly_limit from the dnf configuration.")
                    .tolerant(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Authorization was declined"));
    }

    #[test]
    fn test_rescue_report_keeps_running_kernel() {
        let listing = "/boot/vmlinuz-rescue-6.8.5-201.fc39.x86_64\n/boot/initramfs-rescue-6.7.0-100.fc39.x86_64.img\n";
        let report = rescue_report("6.8.5-201.fc39.x86_64\n", listing);
        assert_eq!(report.current_release, "6.8.5-201.fc39.x86_64");
        assert_eq!(report.removable.len(), 1);
        assert_eq!(
            render_rescue(&report, false).unwrap(),
            "/boot/initramfs-rescue-6.7.0-100.fc39.x86_64.img"
        );

        let json: serde_json::Value =
            serde_json::from_str(&render_rescue(&report, true).unwrap()).unwrap();
        assert_eq!(json["removable"][0]["kind"], "initramfs");
        assert_eq!(json["removable"][0]["version"], "6.7.0-100.fc39.x86_64");
    }

    #[test]
    fn test_boot_entries_text_and_json() {
        let entries = parse_boot_entries("index=0\ntitle=A\nindex=1\ntitle=B\n");
        assert_eq!(render_boot_entries(&entries, false).unwrap(), "0\tA\n1\tB");
        let json: serde_json::Value =
            serde_json::from_str(&render_boot_entries(&entries, true).unwrap()).unwrap();
        assert_eq!(json[1]["index"], 1);
        assert_eq!(json[1]["title"], "B");
    }

    #[test]
    fn test_limit_json_reports_source() {
        let json = render_limit(&InstallLimit::default(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["value"], 3);
        assert_eq!(value["source"], "default");
    }

    #[test]
    fn test_kernels_text() {
        let kernels = parse_kernel_inventory("kernel-a\n\nkernel-b\n");
        assert_eq!(render_kernels(&kernels, false).unwrap(), "kernel-a\nkernel-b");
    }
}
