pub mod errors;
pub mod pcb;
pub mod ready_queue;

pub use pcb::{Pcb, PcbTable};
pub use ready_queue::ReadyQueue;
