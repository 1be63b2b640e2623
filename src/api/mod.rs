pub mod errors;
pub mod kernel;

pub use errors::{KernelError, KernelResult};
pub use kernel::Kernel;
