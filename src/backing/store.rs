use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::backing::errors::{BackingError, BackingResult};

fn open(path: &Path) -> BackingResult<File> {
    File::open(path).map_err(|_| BackingError::SourceUnavailable {
        name: path.display().to_string(),
    })
}

fn io_error(e: io::Error) -> BackingError {
    BackingError::Io {
        message: e.to_string(),
    }
}

/// Counts the lines of a text source, terminated or not, until end of stream.
pub fn count_lines(path: &Path) -> BackingResult<usize> {
    let file = open(path)?;
    let mut count = 0;

    for line in BufReader::new(file).lines() {
        line.map_err(io_error)?;
        count += 1;
    }

    Ok(count)
}

/// Reads line `line_number` (0-based) of a text source, or `None` past the end.
///
/// The source is opened fresh and skipped forward on every call. O(n) per
/// read is accepted: the accessor stays stateless so a page can be re-read
/// after its frame was evicted.
pub fn read_line(path: &Path, line_number: usize) -> BackingResult<Option<String>> {
    let file = open(path)?;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_error)?;
        if index == line_number {
            return Ok(Some(line));
        }
    }

    Ok(None)
}

/// Reads the next line from standard input, or `None` at end of stream.
///
/// Only defined in batch mode: loading "the current script" from a terminal
/// has no meaning, so an interactive stdin is rejected.
pub fn read_interactive_line() -> BackingResult<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(BackingError::InteractiveModeUnsupported);
    }

    let mut buffer = String::new();
    let read = stdin.lock().read_line(&mut buffer).map_err(io_error)?;
    if read == 0 {
        return Ok(None);
    }

    while buffer.ends_with('\n') || buffer.ends_with('\r') {
        buffer.pop();
    }
    Ok(Some(buffer))
}

/// Drains the rest of batch stdin into a temporary spool file so the stream
/// becomes a re-readable backing source for demand paging. Returns the spool
/// path and the number of lines captured. The spool is deleted when the last
/// page table referencing it is destroyed.
pub fn spool_stdin() -> BackingResult<(PathBuf, usize)> {
    if io::stdin().is_terminal() {
        return Err(BackingError::InteractiveModeUnsupported);
    }

    let path = env::temp_dir().join(format!("osmium_spool_{}.script", rand::random::<u64>()));
    let mut file = File::create(&path).map_err(io_error)?;
    let mut count = 0;

    while let Some(line) = read_interactive_line()? {
        writeln!(file, "{}", line).map_err(io_error)?;
        count += 1;
    }

    Ok((path, count))
}
