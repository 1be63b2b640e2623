/// Process identifier. Small, reused after a process is torn down.
pub type Pid = usize;

/// Index into the frame pool.
pub type FrameIndex = usize;

/// Page number within a process's instruction stream.
pub type PageNumber = usize;
