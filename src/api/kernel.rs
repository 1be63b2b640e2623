use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use crate::api::errors::KernelResult;
use crate::backing;
use crate::common::types::Pid;
use crate::config::KernelConfig;
use crate::memory::errors::MemoryError;
use crate::memory::paging::MemoryManager;
use crate::proc::pcb::PcbTable;
use crate::proc::ready_queue::ReadyQueue;
use crate::sched::errors::SchedError;
use crate::sched::scheduler::{Interpreter, Policy, Scheduler};

/// Paging and process state behind the one coarse lock that serializes all
/// paging/PCB mutation across execution threads.
pub struct KernelCore {
    pub mem: MemoryManager,
    pub pcbs: PcbTable,
}

impl KernelCore {
    fn new(config: &KernelConfig) -> Self {
        Self {
            mem: MemoryManager::new(config),
            pcbs: PcbTable::new(config.max_processes),
        }
    }
}

/// Top-level simulator state: the kernel core, the shared ready queue, and
/// the deferred-shutdown flag. Clones share the same underlying state, so a
/// worker thread can drive the scheduler against the queue its admitting
/// thread fills.
#[derive(Clone)]
pub struct Kernel {
    config: KernelConfig,
    core: Arc<Mutex<KernelCore>>,
    ready: Arc<ReadyQueue>,
    shutdown: Arc<Mutex<bool>>,
}

impl Kernel {
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            core: Arc::new(Mutex::new(KernelCore::new(&config))),
            ready: Arc::new(ReadyQueue::new()),
            shutdown: Arc::new(Mutex::new(false)),
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn core(&self) -> MutexGuard<'_, KernelCore> {
        self.core.lock().unwrap()
    }

    pub fn ready(&self) -> &ReadyQueue {
        &self.ready
    }

    /// Admits a process backed by a script file: allocates a pid, builds or
    /// shares the page table, counts the script's lines, creates the PCB.
    ///
    /// A failed admission leaves no trace: all fallible lookups run before
    /// the first mutation.
    pub fn admit_from_file(&self, path: impl AsRef<Path>) -> KernelResult<Pid> {
        self.admit(path.as_ref(), false)
    }

    /// Admits the remainder of batch stdin as a process, spooling it to a
    /// temporary backing file so its pages can be re-read after eviction.
    /// Rejected with `InteractiveModeUnsupported` on a terminal.
    pub fn admit_from_stdin(&self) -> KernelResult<Pid> {
        let (path, _line_count) = backing::spool_stdin()?;
        self.admit(&path, true)
    }

    fn admit(&self, path: &Path, spooled: bool) -> KernelResult<Pid> {
        let line_count = backing::count_lines(path)?;

        let mut core = self.core.lock().unwrap();
        let pid = core.pcbs.find_free_pid()?;
        core.mem.create_page_table(pid, path, spooled)?;

        if let Err(e) = core.pcbs.create(pid, path.to_path_buf(), line_count) {
            core.mem.destroy_page_table(pid);
            return Err(e.into());
        }

        Ok(pid)
    }

    /// Appends a live process to the tail of the ready queue.
    pub fn enqueue(&self, pid: Pid) -> KernelResult<()> {
        self.core.lock().unwrap().pcbs.get(pid)?;
        self.ready.push(pid);
        Ok(())
    }

    /// Inserts a live process at the head of the ready queue, ahead of
    /// everything already admitted.
    pub fn enqueue_priority(&self, pid: Pid) -> KernelResult<()> {
        self.core.lock().unwrap().pcbs.get(pid)?;
        self.ready.prepend(pid);
        Ok(())
    }

    /// Runs the scheduler under a policy selected by name. An unknown name
    /// is rejected before anything is dequeued.
    pub fn run(&self, policy_name: &str, interp: &mut dyn Interpreter) -> KernelResult<i32> {
        let policy: Policy = policy_name.parse()?;
        self.run_policy(policy, interp)
    }

    pub fn run_policy(&self, policy: Policy, interp: &mut dyn Interpreter) -> KernelResult<i32> {
        let scheduler = Scheduler::new(&self.core, &self.ready);
        Ok(scheduler.run(policy, interp)?)
    }

    /// Drives the scheduler from one worker thread per interpreter, all
    /// contending for the shared ready queue. Workers are joined before
    /// this returns, so a shutdown requested mid-run is seen only at the
    /// command boundary that follows.
    pub fn run_workers(
        &self,
        policy_name: &str,
        interps: Vec<Box<dyn Interpreter + Send>>,
    ) -> KernelResult<i32> {
        let policy: Policy = policy_name.parse()?;

        let mut run_status = 0;
        let mut failure: Option<SchedError> = None;

        thread::scope(|scope| {
            let handles: Vec<_> = interps
                .into_iter()
                .map(|mut interp| {
                    scope.spawn(move || {
                        let scheduler = Scheduler::new(&self.core, &self.ready);
                        scheduler.run(policy, interp.as_mut())
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(Ok(status)) => {
                        if status != 0 {
                            run_status = status;
                        }
                    }
                    Ok(Err(e)) => failure = Some(e),
                    Err(_) => {
                        failure = Some(SchedError::Memory(MemoryError::PagingInvariantViolated {
                            reason: "worker thread panicked".to_string(),
                        }))
                    }
                }
            }
        });

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(run_status),
        }
    }

    /// Flags a deferred shutdown. The driver honors it at the next command
    /// boundary, after any in-flight scheduling run has completed and its
    /// workers have rejoined.
    pub fn request_shutdown(&self) {
        *self.shutdown.lock().unwrap() = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        *self.shutdown.lock().unwrap()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}
