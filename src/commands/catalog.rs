//! Every external command the tool invokes
//!
//! Privileged commands are prefixed with the configured privilege helper, so
//! a declined authorization or a missing helper surfaces as an ordinary
//! failed `CommandResult`.

use std::path::Path;

use super::Command;
use crate::config::AppConfig;
use crate::constants::{INSTALLONLY_LIMIT_KEY, KERNEL_PACKAGE};
use crate::system::inventory::KernelPackage;

/// Builds commands from the effective configuration
#[derive(Debug, Clone)]
pub struct Catalog {
    config: AppConfig,
}

impl Catalog {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn helper(&self) -> &str {
        &self.config.privilege_helper
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn privileged<I, S>(&self, program: &str, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv: Vec<String> = vec![program.to_string()];
        argv.extend(args.into_iter().map(Into::into));
        Command::argv(self.helper(), argv)
    }

    /// Installed kernel packages, one token per line
    pub fn list_kernels(&self) -> Command {
        Command::argv("rpm", ["-q", KERNEL_PACKAGE]).context("Failed to list installed kernels.")
    }

    /// Release of the running kernel
    pub fn current_kernel(&self) -> Command {
        Command::argv("uname", ["-r"]).context("Failed to query the running kernel.")
    }

    /// Full package information for one kernel
    pub fn kernel_details(&self, kernel: &KernelPackage) -> Command {
        Command::argv("rpm", ["-qi", kernel.as_str()])
            .context(format!("Failed to get details for {}.", kernel))
    }

    /// Make the given kernel image the default boot entry
    pub fn set_default_kernel(&self, image: &Path) -> Command {
        self.privileged("grubby", ["--set-default".to_string(), path_arg(image)])
            .context("Failed to set the default kernel.")
    }

    /// Remove kernel packages
    pub fn remove_kernels(&self, kernels: &[KernelPackage]) -> Command {
        let mut args = vec!["remove".to_string(), "-y".to_string()];
        args.extend(kernels.iter().map(|k| k.as_str().to_string()));
        self.privileged("dnf", args).context("Failed to remove kernels.")
    }

    /// Install-only packages beyond the newest, i.e. removable old kernels
    pub fn list_old_kernels(&self) -> Command {
        Command::argv(
            "dnf",
            ["repoquery", "--installonly", "--latest-limit=-1", "-q"],
        )
        .context("Failed to list removable old kernels.")
    }

    /// Raw bootloader dump of every entry
    pub fn boot_info(&self) -> Command {
        self.privileged("grubby", ["--info", "ALL"])
            .context("Failed to read GRUB entries. Root privileges may be required.")
    }

    /// Set the default boot entry by its index
    pub fn set_default_index(&self, index: u32) -> Command {
        self.privileged("grubby", ["--set-default-index".to_string(), index.to_string()])
            .context(format!("Failed to set the default boot entry to index {}.", index))
    }

    /// Read the `installonly_limit=` line; a missing key exits non-zero
    pub fn read_install_limit(&self) -> Command {
        self.privileged(
            "grep",
            [
                format!("^{}", INSTALLONLY_LIMIT_KEY),
                path_arg(&self.config.paths.dnf_conf),
            ],
        )
        .context("Failed to read installonly_limit from the dnf configuration.")
        .tolerant()
    }

    /// Replace the `installonly_limit` line (with or without spaces around
    /// `=`) or append it when absent
    pub fn write_install_limit(&self, limit: u32) -> Command {
        let conf = shell_quote(&path_arg(&self.config.paths.dnf_conf));
        let key = INSTALLONLY_LIMIT_KEY;
        let line = format!("^{key}[[:space:]]*=");
        let script = format!(
            "if grep -q '{line}' {conf}; then sed -i 's/{line}.*/{key}={limit}/' {conf}; else echo '{key}={limit}' >> {conf}; fi"
        );
        self.privileged("sh", ["-c".to_string(), script])
            .context(format!("Failed to set installonly_limit to {}.", limit))
    }

    /// Root filesystem type and snapper location; snapper may be absent
    pub fn snapshot_environment(&self) -> Command {
        Command::shell("findmnt -n -o FSTYPE,TARGET / ; which snapper")
            .context("Failed to check the Btrfs/Snapper environment.")
            .tolerant()
    }

    /// Pre-operation snapshot of the root subvolume
    pub fn create_snapshot(&self) -> Command {
        self.privileged(
            "snapper",
            [
                "--no-dbus",
                "create",
                "--description",
                self.config.snapshot.description.as_str(),
                "--type",
                "pre",
            ],
        )
        .context("Failed to create a Btrfs snapshot.")
    }

    /// Long listing of rescue artifacts for display
    pub fn show_rescue_files(&self) -> Command {
        let boot = shell_quote(&path_arg(&self.config.paths.boot_dir));
        Command::shell(format!(
            "ls -l {}/ | grep -E 'vmlinuz-rescue|initramfs-rescue'",
            boot
        ))
        .context("Failed to list rescue files.")
        .tolerant()
    }

    /// Full paths of rescue artifacts, one per line
    pub fn list_rescue_files(&self) -> Command {
        let boot = shell_quote(&path_arg(&self.config.paths.boot_dir));
        Command::shell(format!(
            "find {} -maxdepth 1 -type f \\( -name 'vmlinuz-rescue-*' -o -name 'initramfs-rescue-*.img' \\) 2>/dev/null",
            boot
        ))
        .context("Failed to list rescue files.")
    }

    /// Delete the given rescue artifacts
    pub fn remove_rescue_files(&self, paths: &[String]) -> Command {
        let mut args = vec!["-f".to_string()];
        args.extend(paths.iter().cloned());
        self.privileged("rm", args)
            .context("Failed to remove old rescue files.")
    }

    /// Regenerate the rescue kernel from the running kernel
    pub fn install_rescue(&self, release: &str, vmlinuz: &Path) -> Command {
        self.privileged(
            "kernel-install",
            ["add".to_string(), release.to_string(), path_arg(vmlinuz)],
        )
        .context("Failed to update the rescue kernel.")
    }

    /// Regenerate the bootloader configuration
    pub fn regenerate_grub(&self) -> Command {
        self.privileged("grub2-mkconfig", ["-o".to_string(), path_arg(&self.config.paths.grub_cfg)])
            .context("Failed to regenerate the GRUB configuration.")
    }

    /// CPU, architecture and memory lines
    pub fn system_info(&self) -> Command {
        Command::shell(
            "lscpu | grep 'Model name' ; lscpu | grep 'Architecture' ; free -b | grep Mem:",
        )
        .context("Failed to read system information.")
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Single-quote a value for `sh`
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::executor::execute;
    use crate::commands::Invocation;

    fn catalog() -> Catalog {
        Catalog::new(&AppConfig::default())
    }

    fn argv(cmd: &Command) -> Vec<String> {
        match cmd.invocation() {
            Invocation::Argv(argv) => argv.clone(),
            Invocation::Shell(s) => panic!("expected argv, got shell {}", s),
        }
    }

    #[test]
    fn test_read_only_queries_are_not_privileged() {
        let c = catalog();
        assert_eq!(c.list_kernels().command_line(), "rpm -q kernel");
        assert_eq!(c.current_kernel().command_line(), "uname -r");
        assert_eq!(
            c.list_old_kernels().command_line(),
            "dnf repoquery --installonly --latest-limit=-1 -q"
        );
    }

    #[test]
    fn test_privileged_commands_use_helper() {
        let c = catalog();
        assert_eq!(
            argv(&c.boot_info()),
            vec!["pkexec", "grubby", "--info", "ALL"]
        );
        assert_eq!(
            argv(&c.set_default_index(2)),
            vec!["pkexec", "grubby", "--set-default-index", "2"]
        );
        assert_eq!(
            c.regenerate_grub().command_line(),
            "pkexec grub2-mkconfig -o /boot/grub2/grub.cfg"
        );
    }

    #[test]
    fn test_custom_helper() {
        let config = AppConfig {
            privilege_helper: "sudo".into(),
            ..AppConfig::default()
        };
        let c = Catalog::new(&config);
        assert_eq!(c.boot_info().program(), "sudo");
    }

    #[test]
    fn test_remove_kernels_passes_tokens() {
        let kernels = vec![
            KernelPackage::new("kernel-6.7.0-100.fc39.x86_64"),
            KernelPackage::new("kernel-6.6.1-50.fc39.x86_64"),
        ];
        assert_eq!(
            catalog().remove_kernels(&kernels).command_line(),
            "pkexec dnf remove -y kernel-6.7.0-100.fc39.x86_64 kernel-6.6.1-50.fc39.x86_64"
        );
    }

    #[test]
    fn test_install_limit_read_is_tolerant() {
        let cmd = catalog().read_install_limit();
        assert_eq!(cmd.tolerated_exit_codes(), &[1]);
        assert_eq!(
            argv(&cmd),
            vec!["pkexec", "grep", "^installonly_limit", "/etc/dnf/dnf.conf"]
        );
    }

    #[test]
    fn test_install_limit_write_replaces_or_appends() {
        let cmd = catalog().write_install_limit(4);
        assert!(cmd.strict_exit_code());
        let args = argv(&cmd);
        assert_eq!(&args[..3], &["pkexec", "sh", "-c"]);
        assert!(args[3].contains(
            "sed -i 's/^installonly_limit[[:space:]]*=.*/installonly_limit=4/' '/etc/dnf/dnf.conf'"
        ));
        assert!(args[3].contains("echo 'installonly_limit=4' >> '/etc/dnf/dnf.conf'"));
    }

    #[test]
    fn test_snapshot_commands() {
        let c = catalog();
        assert!(!c.snapshot_environment().strict_exit_code());
        assert_eq!(
            c.create_snapshot().command_line(),
            "pkexec snapper --no-dbus create --description Before_Kernel_Operation --type pre"
        );
    }

    #[test]
    fn test_rescue_commands() {
        let c = catalog();
        assert!(c.list_rescue_files().command_line().starts_with("find '/boot' -maxdepth 1"));
        assert_eq!(
            c.remove_rescue_files(&["/boot/vmlinuz-rescue-1".to_string()]).command_line(),
            "pkexec rm -f /boot/vmlinuz-rescue-1"
        );
        assert_eq!(
            c.install_rescue("6.8.5", Path::new("/lib/modules/6.8.5/vmlinuz")).command_line(),
            "pkexec kernel-install add 6.8.5 /lib/modules/6.8.5/vmlinuz"
        );
    }

    /// Catalog whose privileged commands run unprivileged against `conf`
    fn catalog_for_conf(conf: &Path) -> Catalog {
        let mut config = AppConfig::default();
        config.privilege_helper = "env".to_string();
        config.paths.dnf_conf = conf.to_path_buf();
        Catalog::new(&config)
    }

    async fn write_limit(initial: &str, limit: u32) -> String {
        let conf = std::env::temp_dir().join(format!(
            "fkm-dnf-{}-{}.conf",
            std::process::id(),
            initial.len()
        ));
        std::fs::write(&conf, initial).unwrap();
        let result = execute(&catalog_for_conf(&conf).write_install_limit(limit), None).await;
        let content = std::fs::read_to_string(&conf).unwrap();
        let _ = std::fs::remove_file(&conf);
        assert!(result.success, "write failed: {}", result.detail());
        content
    }

    #[tokio::test]
    async fn test_install_limit_write_replaces_spaced_key() {
        let content = write_limit("[main]\ninstallonly_limit = 5\ngpgcheck=True\n", 4).await;
        assert_eq!(content, "[main]\ninstallonly_limit=4\ngpgcheck=True\n");
    }

    #[tokio::test]
    async fn test_install_limit_write_appends_missing_key() {
        let content = write_limit("[main]\n", 2).await;
        assert_eq!(content, "[main]\ninstallonly_limit=2\n");
    }

    #[tokio::test]
    async fn test_install_limit_write_then_read_round_trips() {
        let conf = std::env::temp_dir().join(format!("fkm-dnf-rw-{}.conf", std::process::id()));
        std::fs::write(&conf, "[main]\ninstallonly_limit= 7\n").unwrap();
        let catalog = catalog_for_conf(&conf);
        let written = execute(&catalog.write_install_limit(6), None).await;
        let read = execute(&catalog.read_install_limit(), None).await;
        let _ = std::fs::remove_file(&conf);
        assert!(written.success);
        assert_eq!(
            crate::system::InstallLimit::from_config_output(read.output()).value,
            6
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/etc/dnf/dnf.conf"), "'/etc/dnf/dnf.conf'");
        assert_eq!(shell_quote("a'b"), r"'a'\''b'");
    }
}
