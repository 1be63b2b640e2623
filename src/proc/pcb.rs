use std::path::PathBuf;

use crate::common::types::Pid;
use crate::proc::errors::{ProcError, ProcResult};

/// Process control block.
#[derive(Debug)]
pub struct Pcb {
    pub pid: Pid,

    /// Backing identity of the process's page table.
    pub backing: PathBuf,

    /// 0-based offset of the next instruction; monotonically increasing
    /// while the process runs.
    pub cursor: usize,

    pub line_count: usize,

    /// Priority metric for SJF/AGING. Starts at the total line count and is
    /// decremented (floor 0) by aging.
    pub job_length_score: usize,
}

impl Pcb {
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.line_count
    }
}

/// Fixed-capacity table of live processes, indexed by pid. Pids are the
/// slot indices and are reused after teardown.
pub struct PcbTable {
    slots: Vec<Option<Pcb>>,
}

impl PcbTable {
    pub fn new(max_processes: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(max_processes, || None);
        Self { slots }
    }

    /// First free pid, without claiming it.
    pub fn find_free_pid(&self) -> ProcResult<Pid> {
        self.slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(ProcError::OutOfPids)
    }

    pub fn create(&mut self, pid: Pid, backing: PathBuf, line_count: usize) -> ProcResult<()> {
        if self.slots[pid].is_some() {
            return Err(ProcError::DuplicatePcb { pid });
        }

        self.slots[pid] = Some(Pcb {
            pid,
            backing,
            cursor: 0,
            line_count,
            job_length_score: line_count,
        });
        Ok(())
    }

    pub fn get(&self, pid: Pid) -> ProcResult<&Pcb> {
        self.slots
            .get(pid)
            .and_then(|slot| slot.as_ref())
            .ok_or(ProcError::NoSuchProcess { pid })
    }

    pub fn get_mut(&mut self, pid: Pid) -> ProcResult<&mut Pcb> {
        self.slots
            .get_mut(pid)
            .and_then(|slot| slot.as_mut())
            .ok_or(ProcError::NoSuchProcess { pid })
    }

    pub fn free(&mut self, pid: Pid) {
        if pid < self.slots.len() {
            self.slots[pid] = None;
        }
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &Pcb> {
        self.slots.iter().flatten()
    }
}
