use std::fmt;

use crate::backing::errors::BackingError;
use crate::common::types::{PageNumber, Pid};

#[derive(Debug)]
pub enum MemoryError {
    /// No free frame. Internal to the fault path: the caller evicts and
    /// retries, so this never reaches the scheduler on its own.
    OutOfMemory,

    DuplicatePageTable { pid: Pid },

    /// `get_line` hit an unmapped page. The scheduler always fault-handles
    /// first, so seeing this is a logic error, not a recoverable fault.
    UnresolvedPageFault { pid: Pid, page: PageNumber },

    /// Eviction freed a frame but allocation still failed. Fatal: capacities
    /// are fixed, so this indicates an internal inconsistency.
    PagingInvariantViolated { reason: String },

    Backing(BackingError),
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::OutOfMemory => {
                write!(f, "memory error: no free frame available")
            }

            MemoryError::DuplicatePageTable { pid } => {
                write!(f, "memory error: process {} already has a page table", pid)
            }

            MemoryError::UnresolvedPageFault { pid, page } => {
                write!(
                    f,
                    "memory error: unresolved page fault (pid {}, page {})",
                    pid, page
                )
            }

            MemoryError::PagingInvariantViolated { reason } => {
                write!(f, "memory error: paging invariant violated ({})", reason)
            }

            MemoryError::Backing(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MemoryError {}

impl From<BackingError> for MemoryError {
    fn from(e: BackingError) -> Self {
        MemoryError::Backing(e)
    }
}

pub type MemoryResult<T> = Result<T, MemoryError>;
