//! Btrfs / snapper readiness check

/// Parsed output of `findmnt -n -o FSTYPE,TARGET / ; which snapper`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotEnvironment {
    pub btrfs_root: bool,
    pub snapper_path: Option<String>,
}

impl SnapshotEnvironment {
    pub fn parse(output: &str) -> Self {
        let mut env = Self::default();

        for line in output.lines().map(str::trim) {
            let mut fields = line.split_whitespace();
            if let (Some(fstype), Some("/"), None) = (fields.next(), fields.next(), fields.next()) {
                env.btrfs_root |= fstype == "btrfs";
                continue;
            }
            // `which` prints an absolute path on success and a diagnostic otherwise
            if line.starts_with('/') && line.ends_with("/snapper") {
                env.snapper_path = Some(line.to_string());
            }
        }

        env
    }

    pub fn snapper_installed(&self) -> bool {
        self.snapper_path.is_some()
    }

    /// Operator-facing reason a snapshot cannot be taken
    pub fn blocker(&self) -> Option<&'static str> {
        if !self.btrfs_root {
            Some("The root filesystem is not Btrfs. A Btrfs snapshot cannot be created.")
        } else if !self.snapper_installed() {
            Some("Snapper is not installed. A Btrfs snapshot cannot be created.")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btrfs_with_snapper() {
        let env = SnapshotEnvironment::parse("btrfs  /\n/usr/bin/snapper\n");
        assert!(env.btrfs_root);
        assert_eq!(env.snapper_path.as_deref(), Some("/usr/bin/snapper"));
        assert_eq!(env.blocker(), None);
    }

    #[test]
    fn test_ext4_root() {
        let env = SnapshotEnvironment::parse("ext4 /\n/usr/bin/snapper\n");
        assert!(!env.btrfs_root);
        assert!(env.blocker().unwrap().contains("not Btrfs"));
    }

    #[test]
    fn test_snapper_missing() {
        let output = "btrfs /\nwhich: no snapper in (/usr/local/bin:/usr/bin)\n";
        let env = SnapshotEnvironment::parse(output);
        assert!(env.btrfs_root);
        assert!(!env.snapper_installed());
        assert!(env.blocker().unwrap().contains("Snapper"));
    }

    #[test]
    fn test_btrfs_elsewhere_does_not_count() {
        let env = SnapshotEnvironment::parse("btrfs /home\n/usr/sbin/snapper\n");
        assert!(!env.btrfs_root);
        assert!(env.snapper_installed());
    }

    #[test]
    fn test_empty_output() {
        let env = SnapshotEnvironment::parse("");
        assert_eq!(env, SnapshotEnvironment::default());
        assert!(env.blocker().is_some());
    }
}
