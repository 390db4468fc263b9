//! Interpreters for the text output of the external system tools

pub mod boot_entries;
pub mod dnf;
pub mod info;
pub mod inventory;
pub mod rescue;
pub mod snapshot;

pub use boot_entries::{parse_boot_entries, BootEntry};
pub use dnf::{validate_install_limit, InstallLimit, LimitError};
pub use info::SystemInfo;
pub use inventory::{parse_kernel_inventory, KernelPackage};
pub use rescue::removable_rescue_files;
pub use snapshot::SnapshotEnvironment;

use std::path::{Path, PathBuf};

/// Image the rescue kernel is generated from: `<modules_dir>/<release>/vmlinuz`
pub fn rescue_source_image(modules_dir: &Path, release: &str) -> PathBuf {
    modules_dir.join(release.trim()).join("vmlinuz")
}
