//! Installed kernel inventory

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::KERNEL_PACKAGE_PREFIX;

/// Opaque package token as printed by the package manager
/// (e.g. `kernel-6.8.5-201.fc39.x86_64`). Compared by string equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct KernelPackage(String);

impl KernelPackage {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Image path under `boot_dir` for this package: `vmlinuz-<token without "kernel-">`
    pub fn image_path(&self, boot_dir: &Path) -> PathBuf {
        let version = self
            .0
            .strip_prefix(KERNEL_PACKAGE_PREFIX)
            .unwrap_or(&self.0);
        boot_dir.join(format!("vmlinuz-{}", version))
    }
}

impl fmt::Display for KernelPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split package-manager output into package tokens: one per line, trimmed,
/// blank lines dropped. Tokens are not validated.
pub fn parse_kernel_inventory(output: &str) -> Vec<KernelPackage> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(KernelPackage::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_dropped() {
        let output = "kernel-6.8.5-201.fc39.x86_64\n\nkernel-6.7.0-100.fc39.x86_64\n";
        assert_eq!(
            parse_kernel_inventory(output),
            vec![
                KernelPackage::new("kernel-6.8.5-201.fc39.x86_64"),
                KernelPackage::new("kernel-6.7.0-100.fc39.x86_64"),
            ]
        );
    }

    #[test]
    fn test_lines_are_trimmed() {
        let output = "  kernel-a  \r\n\t\n kernel-b";
        let tokens: Vec<String> = parse_kernel_inventory(output)
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(tokens, vec!["kernel-a", "kernel-b"]);
    }

    #[test]
    fn test_malformed_tokens_pass_through() {
        let output = "package kernel is not installed\n";
        assert_eq!(
            parse_kernel_inventory(output),
            vec![KernelPackage::new("package kernel is not installed")]
        );
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_kernel_inventory("").is_empty());
        assert!(parse_kernel_inventory("\n\n  \n").is_empty());
    }

    #[test]
    fn test_image_path_strips_package_prefix() {
        let kernel = KernelPackage::new("kernel-6.8.5-201.fc39.x86_64");
        assert_eq!(
            kernel.image_path(Path::new("/boot")),
            PathBuf::from("/boot/vmlinuz-6.8.5-201.fc39.x86_64")
        );
    }

    #[test]
    fn test_image_path_without_prefix() {
        let kernel = KernelPackage::new("6.8.5-201.fc39.x86_64");
        assert_eq!(
            kernel.image_path(Path::new("/boot")),
            PathBuf::from("/boot/vmlinuz-6.8.5-201.fc39.x86_64")
        );
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![KernelPackage::new("kernel-a")]).unwrap();
        assert_eq!(json, r#"["kernel-a"]"#);
    }
}
