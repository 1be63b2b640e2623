pub mod debugger;

pub use debugger::{DebugLevel, get_debug_level, set_debug_level};
