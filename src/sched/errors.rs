use std::fmt;

use crate::memory::errors::MemoryError;
use crate::proc::errors::ProcError;

#[derive(Debug)]
pub enum SchedError {
    InvalidPolicy { name: String },

    Memory(MemoryError),

    Process(ProcError),
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::InvalidPolicy { name } => {
                write!(f, "scheduler error: invalid policy '{}'", name)
            }

            SchedError::Memory(e) => write!(f, "{}", e),

            SchedError::Process(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SchedError {}

impl From<MemoryError> for SchedError {
    fn from(e: MemoryError) -> Self {
        SchedError::Memory(e)
    }
}

impl From<ProcError> for SchedError {
    fn from(e: ProcError) -> Self {
        SchedError::Process(e)
    }
}

pub type SchedResult<T> = Result<T, SchedError>;
