//! Boot entries from the bootloader's `--info ALL` dump
//!
//! The dump is a flat run of `key=value` lines. Each entry starts at an
//! `index=` line; its `title=` line names it:
//!
//! ```text
//! index=0
//! kernel="/boot/vmlinuz-6.8.5-201.fc39.x86_64"
//! title=Fedora Linux (6.8.5-201.fc39.x86_64) 39
//! index=1
//! ...
//! ```

use serde::Serialize;

/// One selectable bootloader entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootEntry {
    pub index: u32,
    pub title: String,
}

/// Entry being collected while scanning
struct Pending {
    index: u32,
    title: String,
}

impl Pending {
    fn into_entry(self) -> Option<BootEntry> {
        (!self.title.is_empty()).then_some(BootEntry {
            index: self.index,
            title: self.title,
        })
    }
}

/// Parse entries in dump order. Entries without a title are dropped, as are
/// runs whose `index=` value is not a non-negative integer. Duplicate
/// indices are kept.
pub fn parse_boot_entries(dump: &str) -> Vec<BootEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<Pending> = None;

    for line in dump.lines() {
        if let Some(value) = line.strip_prefix("index=") {
            entries.extend(pending.take().and_then(Pending::into_entry));
            pending = match value.trim().parse() {
                Ok(index) => Some(Pending {
                    index,
                    title: String::new(),
                }),
                Err(_) => {
                    tracing::debug!("Skipping boot entry with index {:?}", value);
                    None
                }
            };
        } else if let Some(value) = line.strip_prefix("title=") {
            // Titles outside an index run have nothing to attach to
            if let Some(p) = pending.as_mut() {
                p.title = value.trim().to_string();
            }
        }
    }
    entries.extend(pending.and_then(Pending::into_entry));

    entries
}
