//! Application-wide constants

use std::path::PathBuf;

/// Default maximum lines retained in the in-memory output log
pub const DEFAULT_OUTPUT_LINES: usize = 5000;

/// Default command timeout in seconds (30 minutes, dnf transactions can be slow)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 1800;

/// Event poll timeout in milliseconds
pub const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Spinner animation interval in milliseconds
pub const SPINNER_TICK_MS: u128 = 100;

/// Channel buffer size for command messages
pub const COMMAND_CHANNEL_SIZE: usize = 100;

/// Maximum length for user text input
pub const MAX_INPUT_LENGTH: usize = 4;

/// Privilege-escalation helper used for mutating commands
pub const DEFAULT_PRIVILEGE_HELPER: &str = "pkexec";

/// Package name queried for installed kernels
pub const KERNEL_PACKAGE: &str = "kernel";

/// Prefix stripped from a kernel package token to obtain its image version
pub const KERNEL_PACKAGE_PREFIX: &str = "kernel-";

/// Key holding the install-only retention limit in the dnf configuration
pub const INSTALLONLY_LIMIT_KEY: &str = "installonly_limit";

/// dnf's built-in install-only limit when the key is absent
pub const DEFAULT_INSTALLONLY_LIMIT: u32 = 3;

/// Accepted range for a new install-only limit
pub const INSTALLONLY_LIMIT_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Default filesystem locations
pub const DEFAULT_BOOT_DIR: &str = "/boot";
pub const DEFAULT_MODULES_DIR: &str = "/lib/modules";
pub const DEFAULT_DNF_CONF: &str = "/etc/dnf/dnf.conf";
pub const DEFAULT_GRUB_CFG: &str = "/boot/grub2/grub.cfg";
pub const DEFAULT_OS_RELEASE: &str = "/etc/os-release";

/// Snapper description for pre-operation snapshots
pub const DEFAULT_SNAPSHOT_DESCRIPTION: &str = "Before_Kernel_Operation";

/// Screen log filename (mirror of the output pane)
pub const SCREEN_LOG_FILE: &str = "screen.log";

/// Tracing log filename prefix
pub const TRACE_LOG_FILE: &str = "fkm.log";

/// Data directory for logs
pub fn fkm_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".local/share/fkm"))
        .unwrap_or_else(|| PathBuf::from("/tmp/fkm"))
}
