//! Operator workflows as typed continuations
//!
//! Every action is a small state machine. Each state is the continuation
//! attached to one `CommandRunner` submission; `resume` receives the
//! finished result and returns the effects the app applies next (dialogs,
//! kernel list updates, or the next command with its continuation).

use std::path::Path;

use super::state::Action;
use crate::commands::{Catalog, Command, CommandResult};
use crate::system::{
    self, parse_boot_entries, parse_kernel_inventory, removable_rescue_files, BootEntry,
    InstallLimit, KernelPackage, SnapshotEnvironment, SystemInfo,
};

/// Filesystem reads a workflow needs between commands
pub trait Host {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Option<String>;
}

/// The machine this process runs on
pub struct LocalHost;

impl Host for LocalHost {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// What a continuation needs besides the result
pub struct Context<'a> {
    pub catalog: &'a Catalog,
    pub host: &'a dyn Host,
}

/// A yes/no question guarding a command
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub prompt: String,
    pub command: Command,
    pub next: Workflow,
}

/// Outcome of a workflow step for the app to apply
#[derive(Debug, Clone)]
pub enum Effect {
    Info { title: String, body: String },
    Error { title: String, body: String },
    Kernels(Vec<KernelPackage>),
    Run(Command, Workflow),
    Confirm(Confirmation),
    ChooseBootEntry(Vec<BootEntry>),
    EditInstallLimit(InstallLimit),
    /// Replace the finished-state status message
    Status(String),
    /// A benign non-zero exit; put the indicator back to idle
    ResetStatus,
}

fn info(title: &str, body: impl Into<String>) -> Effect {
    Effect::Info {
        title: title.to_string(),
        body: body.into(),
    }
}

fn error(title: &str, body: impl Into<String>) -> Effect {
    Effect::Error {
        title: title.to_string(),
        body: body.into(),
    }
}

fn bullet_list<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Continuation attached to a submitted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workflow {
    RefreshKernels,
    ShowCurrentKernel,
    DefaultKernelSet { kernel: KernelPackage },
    KernelsRemoved { count: usize },
    PreviewOldKernels,
    ConfirmOldKernelRemoval,
    KernelDetails,
    RescueRelease,
    RescueInstalled,
    ShowRescueFiles,
    RescueCleanupRelease,
    RescueCleanupCandidates { release: String },
    RescueFilesRemoved { count: usize },
    GrubRegenerated,
    ShowGrubSettings,
    ShowBootEntries,
    ChooseBootEntry,
    DefaultEntrySet { index: u32 },
    SystemInfo,
    ReadInstallLimit,
    InstallLimitWritten { limit: u32 },
    SnapshotCheck,
    SnapshotCreated,
}

impl Workflow {
    /// Effects that begin `action`. `selected` is the kernel selection.
    pub fn start(action: Action, ctx: &Context<'_>, selected: &[KernelPackage]) -> Vec<Effect> {
        let catalog = ctx.catalog;
        let run = |command: Command, next: Workflow| vec![Effect::Run(command, next)];

        match action {
            Action::RefreshKernels => run(catalog.list_kernels(), Workflow::RefreshKernels),
            Action::CurrentKernel => run(catalog.current_kernel(), Workflow::ShowCurrentKernel),
            Action::SetDefaultKernel => match selected {
                [kernel] => {
                    let image = kernel.image_path(&catalog.config().paths.boot_dir);
                    vec![Effect::Confirm(Confirmation {
                        prompt: format!("Set {} as the default kernel?", kernel),
                        command: catalog.set_default_kernel(&image),
                        next: Workflow::DefaultKernelSet {
                            kernel: kernel.clone(),
                        },
                    })]
                }
                _ => vec![error(
                    "Set default kernel",
                    "Select exactly one kernel to make it the default.",
                )],
            },
            Action::RemoveSelected => {
                if selected.is_empty() {
                    return vec![error("Remove kernels", "Select at least one kernel to remove.")];
                }
                vec![Effect::Confirm(Confirmation {
                    prompt: format!(
                        "Remove the following kernels?\n{}",
                        bullet_list(selected)
                    ),
                    command: catalog.remove_kernels(selected),
                    next: Workflow::KernelsRemoved {
                        count: selected.len(),
                    },
                })]
            }
            Action::PreviewOldKernels => {
                run(catalog.list_old_kernels(), Workflow::PreviewOldKernels)
            }
            Action::RemoveOldKernels => {
                run(catalog.list_old_kernels(), Workflow::ConfirmOldKernelRemoval)
            }
            Action::KernelDetails => match selected {
                [kernel] => run(catalog.kernel_details(kernel), Workflow::KernelDetails),
                _ => vec![error(
                    "Kernel details",
                    "Select exactly one kernel to show its details.",
                )],
            },
            Action::UpdateRescue => run(catalog.current_kernel(), Workflow::RescueRelease),
            Action::ShowRescueFiles => {
                run(catalog.show_rescue_files(), Workflow::ShowRescueFiles)
            }
            Action::RemoveOldRescue => vec![Effect::Confirm(Confirmation {
                prompt: "Remove rescue files that do not belong to the running kernel?"
                    .to_string(),
                command: catalog.current_kernel(),
                next: Workflow::RescueCleanupRelease,
            })],
            Action::RegenerateGrub => vec![Effect::Confirm(Confirmation {
                prompt: format!(
                    "Regenerate {}?",
                    catalog.config().paths.grub_cfg.display()
                ),
                command: catalog.regenerate_grub(),
                next: Workflow::GrubRegenerated,
            })],
            Action::GrubSettings => run(catalog.boot_info(), Workflow::ShowGrubSettings),
            Action::BootEntries => run(catalog.boot_info(), Workflow::ShowBootEntries),
            Action::SetDefaultEntry => run(catalog.boot_info(), Workflow::ChooseBootEntry),
            Action::SystemInfo => run(catalog.system_info(), Workflow::SystemInfo),
            Action::InstallLimit => run(catalog.read_install_limit(), Workflow::ReadInstallLimit),
            Action::Snapshot => run(catalog.snapshot_environment(), Workflow::SnapshotCheck),
            // Handled by the app without running anything
            Action::ClearScreen | Action::About => Vec::new(),
        }
    }

    /// Continue after the command this workflow was attached to has finished
    pub fn resume(self, result: &CommandResult, ctx: &Context<'_>) -> Vec<Effect> {
        let catalog = ctx.catalog;

        // Launch failures and timeouts have already been reported
        if result.error.is_some() {
            return Vec::new();
        }
        // Tolerant reads: a non-zero exit is an answer, not a failure
        let benign = !result.success;
        let output = if result.success { result.output() } else { "" };

        match self {
            Workflow::RefreshKernels => {
                let kernels = parse_kernel_inventory(output);
                let status = format!("{} installed kernel(s)", kernels.len());
                vec![Effect::Kernels(kernels), Effect::Status(status)]
            }
            Workflow::ShowCurrentKernel => vec![info("Current kernel", output)],
            Workflow::DefaultKernelSet { kernel } => vec![
                info(
                    "Set default kernel",
                    format!("{} is now the default kernel.", kernel),
                ),
                Effect::Run(catalog.list_kernels(), Workflow::RefreshKernels),
            ],
            Workflow::KernelsRemoved { count } => vec![
                info("Remove kernels", format!("Removed {} kernel(s).", count)),
                Effect::Run(catalog.list_kernels(), Workflow::RefreshKernels),
            ],
            Workflow::PreviewOldKernels => {
                let old = parse_kernel_inventory(output);
                if old.is_empty() {
                    return vec![info("Old kernels", "No old kernels to remove.")];
                }
                vec![info(
                    "Old kernels",
                    format!("These kernels can be removed:\n{}", bullet_list(&old)),
                )]
            }
            Workflow::ConfirmOldKernelRemoval => {
                let old = parse_kernel_inventory(output);
                if old.is_empty() {
                    return vec![info("Remove old kernels", "No old kernels to remove.")];
                }
                vec![Effect::Confirm(Confirmation {
                    prompt: format!("Remove these old kernels?\n{}", bullet_list(&old)),
                    command: catalog.remove_kernels(&old),
                    next: Workflow::KernelsRemoved { count: old.len() },
                })]
            }
            Workflow::KernelDetails => vec![info("Kernel details", output)],
            Workflow::RescueRelease => {
                if output.is_empty() {
                    return vec![error("Update rescue kernel", "Could not determine the running kernel.")];
                }
                let vmlinuz =
                    system::rescue_source_image(&catalog.config().paths.modules_dir, output);
                if !ctx.host.exists(&vmlinuz) {
                    return vec![error(
                        "Update rescue kernel",
                        format!("Kernel image not found: {}", vmlinuz.display()),
                    )];
                }
                vec![Effect::Run(
                    catalog.install_rescue(output, &vmlinuz),
                    Workflow::RescueInstalled,
                )]
            }
            Workflow::RescueInstalled => vec![info(
                "Update rescue kernel",
                "The rescue kernel was regenerated from the running kernel.",
            )],
            Workflow::ShowRescueFiles => {
                let mut effects = Vec::new();
                if benign {
                    effects.push(Effect::ResetStatus);
                }
                if output.is_empty() {
                    effects.push(info(
                        "Rescue files",
                        format!(
                            "No rescue files found in {}.",
                            catalog.config().paths.boot_dir.display()
                        ),
                    ));
                } else {
                    effects.push(info("Rescue files", output));
                }
                effects
            }
            Workflow::RescueCleanupRelease => {
                if output.is_empty() {
                    return vec![error("Remove old rescue files", "Could not determine the running kernel.")];
                }
                vec![Effect::Run(
                    catalog.list_rescue_files(),
                    Workflow::RescueCleanupCandidates {
                        release: output.to_string(),
                    },
                )]
            }
            Workflow::RescueCleanupCandidates { release } => {
                let paths: Vec<&str> = output.lines().collect();
                let removable = removable_rescue_files(&release, &paths);
                if removable.is_empty() {
                    return vec![info(
                        "Remove old rescue files",
                        "No old rescue files to remove.",
                    )];
                }
                vec![Effect::Confirm(Confirmation {
                    prompt: format!(
                        "Delete these rescue files?\n{}",
                        bullet_list(&removable)
                    ),
                    command: catalog.remove_rescue_files(&removable),
                    next: Workflow::RescueFilesRemoved {
                        count: removable.len(),
                    },
                })]
            }
            Workflow::RescueFilesRemoved { count } => vec![info(
                "Remove old rescue files",
                format!("Removed {} rescue file(s).", count),
            )],
            Workflow::GrubRegenerated => vec![info(
                "Regenerate GRUB",
                "The GRUB configuration was regenerated.",
            )],
            Workflow::ShowGrubSettings => vec![info("GRUB settings", output)],
            Workflow::ShowBootEntries => {
                let entries = parse_boot_entries(output);
                if entries.is_empty() {
                    return vec![info("Boot entries", "No boot entries found.")];
                }
                let body = entries
                    .iter()
                    .map(|e| format!("{}: {}", e.index, e.title))
                    .collect::<Vec<_>>()
                    .join("\n");
                vec![info("Boot entries", body)]
            }
            Workflow::ChooseBootEntry => {
                let entries = parse_boot_entries(output);
                if entries.is_empty() {
                    return vec![info("Set default boot entry", "No boot entries found.")];
                }
                vec![Effect::ChooseBootEntry(entries)]
            }
            Workflow::DefaultEntrySet { index } => vec![info(
                "Set default boot entry",
                format!("Boot entry {} is now the default.", index),
            )],
            Workflow::SystemInfo => {
                let os_release = ctx.host.read_to_string(&catalog.config().paths.os_release);
                let summary = SystemInfo::parse(output, os_release.as_deref());
                vec![info("System information", summary.lines().join("\n"))]
            }
            Workflow::ReadInstallLimit => {
                let mut effects = Vec::new();
                if benign {
                    effects.push(Effect::ResetStatus);
                }
                effects.push(Effect::EditInstallLimit(InstallLimit::from_config_output(
                    output,
                )));
                effects
            }
            Workflow::InstallLimitWritten { limit } => vec![info(
                "Install-only limit",
                format!("installonly_limit set to {}.", limit),
            )],
            Workflow::SnapshotCheck => {
                // `which` exits 1 when snapper is missing; the listing is still usable
                let env = SnapshotEnvironment::parse(result.output());
                if let Some(reason) = env.blocker() {
                    return vec![Effect::ResetStatus, info("Btrfs snapshot", reason)];
                }
                vec![Effect::Confirm(Confirmation {
                    prompt: "Create a Btrfs snapshot now?".to_string(),
                    command: catalog.create_snapshot(),
                    next: Workflow::SnapshotCreated,
                })]
            }
            Workflow::SnapshotCreated => {
                vec![info("Btrfs snapshot", "The snapshot was created.")]
            }
        }
    }
}
