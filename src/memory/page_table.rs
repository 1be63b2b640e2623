use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::common::types::{FrameIndex, PageNumber, Pid};
use crate::memory::errors::{MemoryError, MemoryResult};

/// Per-backing-source page table: page number to frame index, with `None`
/// as the explicit "unmapped" value.
#[derive(Debug)]
pub struct PageTable {
    pub backing: PathBuf,

    /// A spooled table owns a temporary backing file that is removed when
    /// the table itself is torn down.
    pub spooled: bool,

    entries: Vec<Option<FrameIndex>>,
}

impl PageTable {
    fn new(backing: PathBuf, spooled: bool) -> Self {
        Self {
            backing,
            spooled,
            entries: Vec::new(),
        }
    }

    /// Resolves a page number. Past the populated range is unmapped, not an
    /// error.
    pub fn entry(&self, page: PageNumber) -> Option<FrameIndex> {
        self.entries.get(page).copied().flatten()
    }

    pub fn map(&mut self, page: PageNumber, frame: FrameIndex) {
        if page >= self.entries.len() {
            self.entries.resize(page + 1, None);
        }
        self.entries[page] = Some(frame);
    }

    fn unmap_frame(&mut self, frame: FrameIndex) {
        for entry in self.entries.iter_mut() {
            if *entry == Some(frame) {
                *entry = None;
            }
        }
    }

    pub fn mapped_frames(&self) -> impl Iterator<Item = FrameIndex> + '_ {
        self.entries.iter().filter_map(|entry| *entry)
    }
}

struct TableSlot {
    table: PageTable,
    refs: usize,
}

/// One page table per distinct backing identity. Processes running the same
/// script share a table; the slot is reclaimed when the last referencing
/// process is torn down.
pub struct PageTableRegistry {
    slots: Vec<Option<TableSlot>>,
    by_pid: HashMap<Pid, usize>,
}

impl PageTableRegistry {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_pid: HashMap::new(),
        }
    }

    /// Attaches a page table to `pid`, sharing an existing table when
    /// another live process already pages the same backing source.
    pub fn create(&mut self, pid: Pid, backing: &Path, spooled: bool) -> MemoryResult<()> {
        if self.by_pid.contains_key(&pid) {
            return Err(MemoryError::DuplicatePageTable { pid });
        }

        let existing = self.slots.iter().enumerate().find_map(|(index, slot)| match slot {
            Some(slot) if slot.table.backing == backing => Some(index),
            _ => None,
        });

        let index = match existing {
            Some(index) => {
                if let Some(slot) = self.slots[index].as_mut() {
                    slot.refs += 1;
                }
                index
            }
            None => {
                let slot = TableSlot {
                    table: PageTable::new(backing.to_path_buf(), spooled),
                    refs: 1,
                };
                match self.slots.iter().position(|s| s.is_none()) {
                    Some(free) => {
                        self.slots[free] = Some(slot);
                        free
                    }
                    None => {
                        self.slots.push(Some(slot));
                        self.slots.len() - 1
                    }
                }
            }
        };

        self.by_pid.insert(pid, index);
        Ok(())
    }

    /// Detaches `pid` from its table. Returns the table itself when the last
    /// reference went away, so the caller can release its frames (and spool
    /// file). No-op for a pid without a table.
    pub fn destroy(&mut self, pid: Pid) -> Option<PageTable> {
        let index = self.by_pid.remove(&pid)?;

        let emptied = {
            let slot = self.slots[index].as_mut()?;
            slot.refs -= 1;
            slot.refs == 0
        };

        if emptied {
            self.slots[index].take().map(|slot| slot.table)
        } else {
            None
        }
    }

    pub fn get(&self, pid: Pid) -> Option<&PageTable> {
        let index = *self.by_pid.get(&pid)?;
        self.slots[index].as_ref().map(|slot| &slot.table)
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut PageTable> {
        let index = *self.by_pid.get(&pid)?;
        self.slots[index].as_mut().map(|slot| &mut slot.table)
    }

    /// Clears every entry, in every live table, that points at `frame`.
    /// Mandatory after eviction so no table references a reclaimed frame.
    pub fn clear_mappings_to(&mut self, frame: FrameIndex) {
        for slot in self.slots.iter_mut().flatten() {
            slot.table.unmap_frame(frame);
        }
    }

    pub fn any_mapping_to(&self, frame: FrameIndex) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|slot| slot.table.mapped_frames().any(|mapped| mapped == frame))
    }

    /// Whether two pids reference the same page table instance.
    pub fn shared(&self, a: Pid, b: Pid) -> bool {
        match (self.by_pid.get(&a), self.by_pid.get(&b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn table_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

impl Default for PageTableRegistry {
    fn default() -> Self {
        Self::new()
    }
}
