use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Writes a throwaway script file, one instruction per line.
pub fn write_script<S: AsRef<str>>(lines: &[S]) -> PathBuf {
    let path = env::temp_dir().join(format!("osmium_test_{}.script", rand::random::<u64>()));
    let mut file = File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line.as_ref()).unwrap();
    }
    path
}

/// `prefix1`, `prefix2`, ... `prefixN`.
pub fn numbered_lines(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{}{}", prefix, i)).collect()
}
