/// Fixed capacities of the simulated machine.
///
/// The defaults mirror the reference configuration: an 18-line frame store
/// split into 3-line pages, and at most 5 live processes. Tests inject
/// smaller values to exercise eviction without long scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Maximum number of live processes (pids are reused after teardown).
    pub max_processes: usize,

    /// Total instruction-line slots of simulated physical memory.
    pub frame_store_size: usize,

    /// Instruction lines per page (and per frame).
    pub page_size: usize,
}

impl KernelConfig {
    pub fn num_frames(&self) -> usize {
        self.frame_store_size / self.page_size
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_processes: 5,
            frame_store_size: 18,
            page_size: 3,
        }
    }
}
