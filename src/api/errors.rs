use crate::backing::errors::BackingError;
use crate::memory::errors::MemoryError;
use crate::proc::errors::ProcError;
use crate::sched::errors::SchedError;

#[derive(Debug)]
pub enum KernelError {
    Backing(BackingError),
    Memory(MemoryError),
    Process(ProcError),
    Sched(SchedError),
}

impl std::fmt::Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Backing(e) => write!(f, "{e}"),
            KernelError::Memory(e) => write!(f, "{e}"),
            KernelError::Process(e) => write!(f, "{e}"),
            KernelError::Sched(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for KernelError {}

impl From<BackingError> for KernelError {
    fn from(e: BackingError) -> Self {
        KernelError::Backing(e)
    }
}

impl From<MemoryError> for KernelError {
    fn from(e: MemoryError) -> Self {
        KernelError::Memory(e)
    }
}

impl From<ProcError> for KernelError {
    fn from(e: ProcError) -> Self {
        KernelError::Process(e)
    }
}

impl From<SchedError> for KernelError {
    fn from(e: SchedError) -> Self {
        KernelError::Sched(e)
    }
}

pub type KernelResult<T> = Result<T, KernelError>;
