use std::fmt;

use crate::common::types::Pid;

#[derive(Debug)]
pub enum ProcError {
    OutOfPids,

    DuplicatePcb { pid: Pid },

    NoSuchProcess { pid: Pid },
}

impl fmt::Display for ProcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcError::OutOfPids => {
                write!(f, "process error: out of process identifiers")
            }

            ProcError::DuplicatePcb { pid } => {
                write!(f, "process error: pid {} already has a PCB", pid)
            }

            ProcError::NoSuchProcess { pid } => {
                write!(f, "process error: no process with pid {}", pid)
            }
        }
    }
}

impl std::error::Error for ProcError {}

pub type ProcResult<T> = Result<T, ProcError>;
