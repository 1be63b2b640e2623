pub mod errors;
pub mod store;

pub use store::{count_lines, read_interactive_line, read_line, spool_stdin};
