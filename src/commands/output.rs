//! Ordered log of command invocations and their captured output
//!
//! Lines are only ever appended. The in-memory copy is bounded; the optional
//! screen log file mirror receives every line.

use regex::Regex;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

/// Regex to match ANSI escape codes.
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap());

/// Strip ANSI escape codes from a string
fn strip_ansi_codes(s: &str) -> String {
    ANSI_RE.replace_all(s, "").to_string()
}

/// What produced a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `$ <command line>` written before launch
    Command,
    /// Stream header (`STDOUT:` / `STDERR:`)
    Header,
    Stdout,
    Stderr,
    /// Synthetic line describing a failure
    Diagnostic,
    /// Informational note from the tool itself
    Note,
}

/// One line of the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub kind: LineKind,
    pub text: String,
}

/// Append-only output log
pub struct OutputSink {
    lines: VecDeque<LogLine>,
    capacity: usize,
    /// Lines appended since creation, including those evicted from memory
    appended: u64,
    /// Position of the last clear; the view starts here
    view_start: u64,
    mirror: Option<File>,
}

impl OutputSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            appended: 0,
            view_start: 0,
            mirror: None,
        }
    }

    /// Mirror every appended line into a file (truncated on open)
    pub fn mirror_to(mut self, path: &Path) -> Self {
        match File::create(path) {
            Ok(mut file) => {
                let _ = writeln!(
                    file,
                    "=== fkm screen log ({}) ===\n",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                );
                let _ = file.flush();
                self.mirror = Some(file);
            }
            Err(e) => tracing::warn!("Failed to create screen log file: {}", e),
        }
        self
    }

    /// Append one line
    pub fn push(&mut self, kind: LineKind, text: &str) {
        let text = strip_ansi_codes(text);
        if let Some(ref mut file) = self.mirror {
            let written = writeln!(file, "{}", text).and_then(|_| file.flush());
            if let Err(e) = written {
                tracing::warn!("Failed to write screen log: {}", e);
                self.mirror = None;
            }
        }
        self.lines.push_back(LogLine { kind, text });
        self.appended += 1;
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Append a multi-line block, one entry per line
    pub fn push_block(&mut self, kind: LineKind, block: &str) {
        for line in block.lines() {
            self.push(kind, line);
        }
    }

    /// Record the literal command line of an invocation
    pub fn command(&mut self, command_line: &str) {
        self.push(LineKind::Command, "");
        self.push(LineKind::Command, &format!("$ {}", command_line));
    }

    /// Record captured output of one stream, tagged with its header
    pub fn stream(&mut self, kind: LineKind, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }
        let header = match kind {
            LineKind::Stderr => "STDERR:",
            _ => "STDOUT:",
        };
        self.push(LineKind::Header, header);
        self.push_block(kind, content);
    }

    pub fn diagnostic(&mut self, text: &str) {
        self.push_block(LineKind::Diagnostic, text);
    }

    pub fn note(&mut self, text: &str) {
        self.push_block(LineKind::Note, text);
    }

    /// Hide everything appended so far from the view. The log itself is kept.
    pub fn clear_view(&mut self) {
        self.view_start = self.appended;
    }

    /// Lines visible since the last clear, oldest first
    pub fn visible(&self) -> impl Iterator<Item = &LogLine> {
        let first_in_memory = self.appended - self.lines.len() as u64;
        let skip = self.view_start.saturating_sub(first_in_memory) as usize;
        self.lines.iter().skip(skip)
    }

    /// Every line still held in memory, ignoring clears
    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.visible().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sink: &OutputSink) -> Vec<String> {
        sink.visible().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn test_command_then_streams_in_order() {
        let mut sink = OutputSink::new(100);
        sink.command("rpm -q kernel");
        sink.stream(LineKind::Stdout, "kernel-a\nkernel-b\n");
        sink.stream(LineKind::Stderr, "warn\n");
        assert_eq!(
            texts(&sink),
            vec!["", "$ rpm -q kernel", "STDOUT:", "kernel-a", "kernel-b", "STDERR:", "warn"]
        );
    }

    #[test]
    fn test_empty_stream_is_skipped() {
        let mut sink = OutputSink::new(100);
        sink.stream(LineKind::Stdout, "  \n");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_ansi_codes_are_stripped() {
        let mut sink = OutputSink::new(100);
        sink.note("\x1b[1;32mdone\x1b[0m");
        assert_eq!(texts(&sink), vec!["done"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut sink = OutputSink::new(2);
        sink.note("a");
        sink.note("b");
        sink.note("c");
        assert_eq!(texts(&sink), vec!["b", "c"]);
    }

    #[test]
    fn test_clear_view_keeps_log() {
        let mut sink = OutputSink::new(10);
        sink.note("before");
        sink.clear_view();
        assert!(sink.is_empty());
        sink.note("after");
        assert_eq!(texts(&sink), vec!["after"]);
        assert_eq!(sink.lines().count(), 2);
    }

    #[test]
    fn test_clear_view_after_eviction() {
        let mut sink = OutputSink::new(2);
        sink.note("a");
        sink.note("b");
        sink.clear_view();
        sink.note("c");
        sink.note("d");
        sink.note("e");
        assert_eq!(texts(&sink), vec!["d", "e"]);
    }

    #[test]
    fn test_mirror_receives_lines() {
        let path = std::env::temp_dir().join(format!("fkm-screen-{}.log", std::process::id()));
        {
            let mut sink = OutputSink::new(10).mirror_to(&path);
            sink.command("uname -r");
        }
        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(content.starts_with("=== fkm screen log ("));
        assert!(content.contains("$ uname -r"));
    }
}
