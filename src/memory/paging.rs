use std::fs;
use std::path::{Path, PathBuf};

use crate::backing;
use crate::common::types::{FrameIndex, PageNumber, Pid};
use crate::config::KernelConfig;
use crate::debugger::DebugLevel;
use crate::kdebug;
use crate::memory::errors::{MemoryError, MemoryResult};
use crate::memory::frame::FramePool;
use crate::memory::page_table::PageTableRegistry;

/// Demand-paging engine: frame pool + page tables + the fault path tying
/// them to the backing store.
pub struct MemoryManager {
    pool: FramePool,
    tables: PageTableRegistry,
    page_size: usize,
}

impl MemoryManager {
    pub fn new(config: &KernelConfig) -> Self {
        Self {
            pool: FramePool::new(config.num_frames(), config.page_size),
            tables: PageTableRegistry::new(),
            page_size: config.page_size,
        }
    }

    pub fn create_page_table(&mut self, pid: Pid, backing: &Path, spooled: bool) -> MemoryResult<()> {
        self.tables.create(pid, backing, spooled)
    }

    /// Detaches `pid` from its page table. When the last reference goes
    /// away the table's frames are released back to the pool and a spooled
    /// backing file is removed.
    pub fn destroy_page_table(&mut self, pid: Pid) {
        if let Some(table) = self.tables.destroy(pid) {
            for frame in table.mapped_frames() {
                self.pool.release(frame);
            }
            if table.spooled {
                let _ = fs::remove_file(&table.backing);
            }
        }
    }

    /// Frame currently backing `instruction_offset`, or `None` on a miss
    /// (no page table, or page unmapped / out of range).
    pub fn lookup(&self, pid: Pid, instruction_offset: usize) -> Option<FrameIndex> {
        let page = instruction_offset / self.page_size;
        self.tables.get(pid).and_then(|table| table.entry(page))
    }

    /// Makes the page holding `instruction_offset` resident.
    ///
    /// A hit just refreshes the frame's access time. A miss allocates a
    /// frame (evicting the LRU victim when the pool is exhausted, retried
    /// once), records the mapping, then populates every slot of the page
    /// from the backing store. A short final page leaves trailing slots
    /// empty.
    pub fn ensure_page_loaded(&mut self, pid: Pid, instruction_offset: usize) -> MemoryResult<()> {
        let page = instruction_offset / self.page_size;

        if let Some(frame) = self.lookup(pid, instruction_offset) {
            self.pool.touch(frame);
            return Ok(());
        }

        let backing = match self.tables.get(pid) {
            Some(table) => table.backing.clone(),
            None => return Err(MemoryError::UnresolvedPageFault { pid, page }),
        };

        kdebug!(DebugLevel::Info, "page fault: pid {} page {}", pid, page);

        let frame = match self.pool.allocate() {
            Ok(frame) => frame,
            Err(MemoryError::OutOfMemory) => {
                self.evict_one()?;
                self.pool.allocate().map_err(|_| MemoryError::PagingInvariantViolated {
                    reason: "no free frame after eviction".to_string(),
                })?
            }
            Err(other) => return Err(other),
        };

        if let Some(table) = self.tables.get_mut(pid) {
            table.map(page, frame);
        }

        let lines = self.read_page(&backing, page)?;
        self.pool.fill(frame, lines);
        Ok(())
    }

    fn read_page(&self, backing: &PathBuf, page: PageNumber) -> MemoryResult<Vec<Option<String>>> {
        let start = page * self.page_size;
        let mut lines = Vec::with_capacity(self.page_size);

        for slot in 0..self.page_size {
            lines.push(backing::read_line(backing, start + slot)?);
        }

        Ok(lines)
    }

    /// Evicts the least-recently-used frame and returns its index.
    ///
    /// The victim's remaining contents are logged before being discarded,
    /// and every page table entry pointing at the frame is cleared in the
    /// same pass. Only the allocation-miss path triggers this.
    pub fn evict_one(&mut self) -> MemoryResult<FrameIndex> {
        let victim = self
            .pool
            .victim()
            .ok_or_else(|| MemoryError::PagingInvariantViolated {
                reason: "eviction requested with no occupied frame".to_string(),
            })?;

        kdebug!(DebugLevel::Info, "evicting frame {}", victim);
        for line in self.pool.release(victim).into_iter().flatten() {
            kdebug!(DebugLevel::Info, "evicted: {}", line);
        }

        self.tables.clear_mappings_to(victim);
        Ok(victim)
    }

    /// Instruction text at `instruction_offset` through the mapped frame.
    ///
    /// Callers fault-handle first; an unmapped page here is a logic error.
    /// An empty slot inside a mapped (short) page reads as an empty line.
    pub fn get_line(&mut self, pid: Pid, instruction_offset: usize) -> MemoryResult<String> {
        let page = instruction_offset / self.page_size;
        let frame = self
            .lookup(pid, instruction_offset)
            .ok_or(MemoryError::UnresolvedPageFault { pid, page })?;

        self.pool.touch(frame);
        let slot = instruction_offset % self.page_size;
        Ok(self.pool.line(frame, slot).unwrap_or("").to_string())
    }

    pub fn pool(&self) -> &FramePool {
        &self.pool
    }

    pub fn tables(&self) -> &PageTableRegistry {
        &self.tables
    }
}
