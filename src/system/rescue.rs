//! Rescue kernel artifacts in the boot directory
//!
//! Two filename shapes are recognized:
//! - `vmlinuz-rescue-<version>`
//! - `initramfs-rescue-<version>.img`
//!
//! Anything else has no version and is never selected for deletion.

use serde::Serialize;
use std::path::Path;

const VMLINUZ_PREFIX: &str = "vmlinuz-rescue-";
const INITRAMFS_PREFIX: &str = "initramfs-rescue-";
const INITRAMFS_SUFFIX: &str = ".img";

/// Which half of a rescue pair a file is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RescueKind {
    Vmlinuz,
    Initramfs,
}

/// A candidate file and what could be parsed from its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RescueArtifact {
    pub path: String,
    pub kind: Option<RescueKind>,
    pub version: Option<String>,
}

impl RescueArtifact {
    pub fn parse(path: &str) -> Self {
        let filename = Path::new(path)
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();

        let parsed = if let Some(rest) = filename.strip_prefix(VMLINUZ_PREFIX) {
            Some((RescueKind::Vmlinuz, rest))
        } else if let Some(rest) = filename.strip_prefix(INITRAMFS_PREFIX) {
            rest.strip_suffix(INITRAMFS_SUFFIX)
                .map(|version| (RescueKind::Initramfs, version))
        } else {
            None
        };

        match parsed {
            Some((kind, version)) if !version.trim().is_empty() => Self {
                path: path.to_string(),
                kind: Some(kind),
                version: Some(version.trim().to_string()),
            },
            _ => Self {
                path: path.to_string(),
                kind: None,
                version: None,
            },
        }
    }

    /// Deletable when its version is known and differs from the running kernel
    pub fn is_removable(&self, current_release: &str) -> bool {
        match &self.version {
            Some(version) => version != current_release.trim(),
            None => false,
        }
    }
}

/// Rescue files eligible for deletion, in input order.
///
/// Files of the running kernel and files whose version cannot be parsed are
/// always kept. Both sides of the comparison are trimmed.
pub fn removable_rescue_files<S: AsRef<str>>(current_release: &str, paths: &[S]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(RescueArtifact::parse)
        .filter(|artifact| artifact.is_removable(current_release))
        .map(|artifact| artifact.path)
        .collect()
}
