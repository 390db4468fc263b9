//! Application state types and enums

use std::collections::VecDeque;

use super::workflow::Confirmation;
use crate::system::{BootEntry, InstallLimit, KernelPackage};

/// Operator actions, in menu order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RefreshKernels,
    CurrentKernel,
    SetDefaultKernel,
    RemoveSelected,
    PreviewOldKernels,
    RemoveOldKernels,
    KernelDetails,
    UpdateRescue,
    ShowRescueFiles,
    RemoveOldRescue,
    RegenerateGrub,
    GrubSettings,
    BootEntries,
    SetDefaultEntry,
    SystemInfo,
    InstallLimit,
    Snapshot,
    ClearScreen,
    About,
}

/// Action menu items
pub const ACTIONS: &[Action] = &[
    Action::RefreshKernels,
    Action::CurrentKernel,
    Action::SetDefaultKernel,
    Action::RemoveSelected,
    Action::PreviewOldKernels,
    Action::RemoveOldKernels,
    Action::KernelDetails,
    Action::UpdateRescue,
    Action::ShowRescueFiles,
    Action::RemoveOldRescue,
    Action::RegenerateGrub,
    Action::GrubSettings,
    Action::BootEntries,
    Action::SetDefaultEntry,
    Action::SystemInfo,
    Action::InstallLimit,
    Action::Snapshot,
    Action::ClearScreen,
    Action::About,
];

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::RefreshKernels => "Refresh kernel list",
            Action::CurrentKernel => "Show current kernel",
            Action::SetDefaultKernel => "Set selected kernel as default",
            Action::RemoveSelected => "Remove selected kernels",
            Action::PreviewOldKernels => "Preview old kernels",
            Action::RemoveOldKernels => "Remove old kernels",
            Action::KernelDetails => "Selected kernel details",
            Action::UpdateRescue => "Update rescue kernel",
            Action::ShowRescueFiles => "Show rescue files",
            Action::RemoveOldRescue => "Remove old rescue files",
            Action::RegenerateGrub => "Regenerate GRUB config",
            Action::GrubSettings => "Show GRUB settings",
            Action::BootEntries => "Show boot entries",
            Action::SetDefaultEntry => "Set default boot entry",
            Action::SystemInfo => "System information",
            Action::InstallLimit => "DNF install-only limit",
            Action::Snapshot => "Create Btrfs snapshot",
            Action::ClearScreen => "Clear screen",
            Action::About => "About",
        }
    }

    /// Changes system state; disabled while a command is running
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Action::SetDefaultKernel
                | Action::RemoveSelected
                | Action::RemoveOldKernels
                | Action::UpdateRescue
                | Action::RemoveOldRescue
                | Action::RegenerateGrub
                | Action::SetDefaultEntry
                | Action::InstallLimit
                | Action::Snapshot
        )
    }
}

/// Which pane receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Kernels,
    #[default]
    Actions,
}

/// Installed kernels with a multi-selection
#[derive(Debug, Clone, Default)]
pub struct KernelList {
    pub items: Vec<KernelPackage>,
    pub checked: Vec<bool>,
    pub cursor: usize,
}

impl KernelList {
    /// Replace the list; previous selections are dropped
    pub fn replace(&mut self, items: Vec<KernelPackage>) {
        self.checked = vec![false; items.len()];
        self.items = items;
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn toggle(&mut self) {
        if let Some(flag) = self.checked.get_mut(self.cursor) {
            *flag = !*flag;
        }
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Checked kernels, or the one under the cursor when none are checked
    pub fn selection(&self) -> Vec<KernelPackage> {
        let checked: Vec<KernelPackage> = self
            .items
            .iter()
            .zip(&self.checked)
            .filter(|(_, c)| **c)
            .map(|(k, _)| k.clone())
            .collect();
        if !checked.is_empty() {
            return checked;
        }
        self.items.get(self.cursor).cloned().into_iter().collect()
    }
}

/// Modal dialogs, shown one at a time from the front of the queue
#[derive(Debug, Clone)]
pub enum Dialog {
    Info {
        title: String,
        body: String,
    },
    Error {
        title: String,
        body: String,
    },
    Confirm {
        confirmation: Confirmation,
        yes: bool,
    },
    ChooseBootEntry {
        entries: Vec<BootEntry>,
        selected: usize,
    },
    EditInstallLimit {
        current: InstallLimit,
        input: String,
        error: Option<String>,
    },
}

impl Dialog {
    /// Text of a message dialog, which may be longer than the screen
    pub fn message_body(&self) -> Option<&str> {
        match self {
            Dialog::Info { body, .. } | Dialog::Error { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Pending dialogs in arrival order
#[derive(Debug, Default)]
pub struct DialogQueue {
    dialogs: VecDeque<Dialog>,
    /// Lines scrolled in the front message dialog
    scroll: u16,
}

impl DialogQueue {
    pub fn push(&mut self, dialog: Dialog) {
        self.dialogs.push_back(dialog);
    }

    pub fn current(&self) -> Option<&Dialog> {
        self.dialogs.front()
    }

    pub fn current_mut(&mut self) -> Option<&mut Dialog> {
        self.dialogs.front_mut()
    }

    pub fn dismiss(&mut self) -> Option<Dialog> {
        self.scroll = 0;
        self.dialogs.pop_front()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Scroll the front message dialog; stops at its last line
    pub fn scroll_by(&mut self, delta: i32) {
        let lines = self
            .current()
            .and_then(Dialog::message_body)
            .map(|body| body.lines().count())
            .unwrap_or(0);
        let max = u16::try_from(lines.saturating_sub(1)).unwrap_or(u16::MAX);
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(max));
        self.scroll = u16::try_from(next).unwrap_or(max);
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernels(names: &[&str]) -> Vec<KernelPackage> {
        names.iter().map(|n| KernelPackage::new(*n)).collect()
    }

    #[test]
    fn test_message_scroll_is_clamped_and_reset() {
        let mut queue = DialogQueue::default();
        queue.push(Dialog::Info {
            title: "GRUB settings".into(),
            body: (0..5).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n"),
        });
        queue.push(Dialog::Info {
            title: "Next".into(),
            body: "short".into(),
        });
        queue.scroll_by(-3);
        assert_eq!(queue.scroll(), 0);
        queue.scroll_by(10);
        assert_eq!(queue.scroll(), 4);
        queue.dismiss();
        assert_eq!(queue.scroll(), 0);
        queue.scroll_by(1);
        assert_eq!(queue.scroll(), 0);
    }

    #[test]
    fn test_every_action_listed_once() {
        assert_eq!(ACTIONS.len(), 19);
        for (i, a) in ACTIONS.iter().enumerate() {
            assert!(!ACTIONS[i + 1..].contains(a), "{:?} listed twice", a);
        }
    }

    #[test]
    fn test_read_only_actions_not_mutating() {
        assert!(!Action::RefreshKernels.is_mutating());
        assert!(!Action::BootEntries.is_mutating());
        assert!(Action::RemoveSelected.is_mutating());
        assert!(Action::Snapshot.is_mutating());
    }

    #[test]
    fn test_selection_defaults_to_cursor() {
        let mut list = KernelList::default();
        list.replace(kernels(&["kernel-a", "kernel-b"]));
        list.down();
        assert_eq!(list.selection(), kernels(&["kernel-b"]));
    }

    #[test]
    fn test_checked_selection() {
        let mut list = KernelList::default();
        list.replace(kernels(&["kernel-a", "kernel-b", "kernel-c"]));
        list.toggle();
        list.down();
        list.down();
        list.toggle();
        assert_eq!(list.selection(), kernels(&["kernel-a", "kernel-c"]));
    }

    #[test]
    fn test_replace_clamps_cursor_and_clears_checks() {
        let mut list = KernelList::default();
        list.replace(kernels(&["a", "b", "c"]));
        list.down();
        list.down();
        list.toggle();
        list.replace(kernels(&["a"]));
        assert_eq!(list.cursor, 0);
        assert_eq!(list.checked, vec![false]);
        list.clear();
        assert!(list.selection().is_empty());
    }

    #[test]
    fn test_dialog_queue_fifo() {
        let mut queue = DialogQueue::default();
        queue.push(Dialog::Info {
            title: "one".into(),
            body: String::new(),
        });
        queue.push(Dialog::Info {
            title: "two".into(),
            body: String::new(),
        });
        assert!(matches!(queue.current(), Some(Dialog::Info { title, .. }) if title == "one"));
        queue.dismiss();
        assert!(matches!(queue.current(), Some(Dialog::Info { title, .. }) if title == "two"));
        queue.dismiss();
        assert!(queue.is_empty());
    }
}
