use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use osmium::api::kernel::Kernel;
use osmium::common::types::Pid;
use osmium::config::KernelConfig;
use osmium::sched::scheduler::Interpreter;

use super::scripts::write_script;

pub struct TestKernel {
    pub kernel: Kernel,
}

impl TestKernel {
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    pub fn with_config(config: KernelConfig) -> Self {
        Self {
            kernel: Kernel::new(config),
        }
    }

    /// Writes a script and admits it, without enqueueing.
    pub fn admit<S: AsRef<str>>(&self, lines: &[S]) -> Result<Pid, anyhow::Error> {
        let path = write_script(lines);
        Ok(self.kernel.admit_from_file(path)?)
    }

    /// Writes a script, admits it, and puts it at the tail of the ready
    /// queue.
    pub fn admit_and_enqueue<S: AsRef<str>>(&self, lines: &[S]) -> Result<Pid, anyhow::Error> {
        let pid = self.admit(lines)?;
        self.kernel.enqueue(pid)?;
        Ok(pid)
    }

    pub fn admit_path(&self, path: &PathBuf) -> Result<Pid, anyhow::Error> {
        Ok(self.kernel.admit_from_file(path)?)
    }

    pub fn run(&self, policy: &str, interp: &mut dyn Interpreter) -> Result<i32, anyhow::Error> {
        Ok(self.kernel.run(policy, interp)?)
    }
}

/// Interpreter that records every forwarded line. Clones share the record,
/// so one instance per worker thread still yields a single transcript.
#[derive(Clone, Default)]
pub struct Recorder {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taken(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Interpreter for Recorder {
    fn execute_line(&mut self, line: &str) -> i32 {
        self.lines.lock().unwrap().push(line.to_string());
        0
    }
}
