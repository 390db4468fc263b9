//! Host summary for the system information dialog

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Summary assembled from `lscpu`, `free -b` and os-release
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    pub os_name: Option<String>,
    pub cpu_model: Option<String>,
    pub architecture: Option<String>,
    pub total_ram_gib: Option<f64>,
    raw: Vec<String>,
}

impl SystemInfo {
    /// Parse the command output; `os_release` is the file contents if readable
    pub fn parse(output: &str, os_release: Option<&str>) -> Self {
        let raw: Vec<String> = output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();

        Self {
            os_name: os_release.and_then(pretty_name),
            cpu_model: field(output, "Model name:"),
            architecture: field(output, "Architecture:"),
            total_ram_gib: total_ram_gib(output),
            raw,
        }
    }

    /// Display lines; the raw output when nothing was recognized
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(os) = &self.os_name {
            lines.push(format!("Operating system: {}", os));
        }
        if let Some(cpu) = &self.cpu_model {
            lines.push(format!("CPU: {}", cpu));
        }
        if let Some(arch) = &self.architecture {
            lines.push(format!("Architecture: {}", arch));
        }
        if let Some(ram) = self.total_ram_gib {
            lines.push(format!("Total memory (RAM): {:.2} GiB", ram));
        }

        if lines.is_empty() {
            self.raw.clone()
        } else {
            lines
        }
    }
}

fn field(output: &str, label: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let value = line.split_once(label)?.1.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn total_ram_gib(output: &str) -> Option<f64> {
    let line = output.lines().find(|l| l.trim_start().starts_with("Mem:"))?;
    let bytes: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some((bytes as f64 / BYTES_PER_GIB * 100.0).round() / 100.0)
}

fn pretty_name(os_release: &str) -> Option<String> {
    os_release.lines().find_map(|line| {
        let value = line.trim().strip_prefix("PRETTY_NAME=")?;
        let value = value.trim().trim_matches('"').trim_matches('\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}
