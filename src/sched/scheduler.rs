use std::cell::Cell;
use std::str::FromStr;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::api::kernel::KernelCore;
use crate::common::types::Pid;
use crate::proc::ready_queue::ReadyQueue;
use crate::sched::errors::{SchedError, SchedResult};

/// Delay between round-robin instructions, kept from the reference model so
/// preemption points are observable.
const RR_INSTRUCTION_DELAY: Duration = Duration::from_micros(1);

thread_local! {
    /// Process currently running on this thread, `None` when idle. Makes
    /// `run` a no-op when a scheduled instruction re-enters the scheduler.
    static CURRENT_PID: Cell<Option<Pid>> = const { Cell::new(None) };
}

/// External collaborator that executes one instruction line. 0 is success;
/// a nonzero status is recorded as the run's return code without stopping
/// the run.
pub trait Interpreter {
    fn execute_line(&mut self, line: &str) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fcfs,
    Sjf,
    Rr,
    Rr30,
    Aging,
}

impl FromStr for Policy {
    type Err = SchedError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "FCFS" => Ok(Policy::Fcfs),
            "SJF" => Ok(Policy::Sjf),
            "RR" => Ok(Policy::Rr),
            "RR30" => Ok(Policy::Rr30),
            "AGING" => Ok(Policy::Aging),
            _ => Err(SchedError::InvalidPolicy {
                name: name.to_string(),
            }),
        }
    }
}

impl Policy {
    pub fn quantum(&self) -> Option<usize> {
        match self {
            Policy::Rr => Some(2),
            Policy::Rr30 => Some(30),
            _ => None,
        }
    }
}

/// Drives one ready queue against the shared kernel core, forwarding each
/// resolved instruction to the interpreter. The core lock is held per
/// instruction resolution and released while the line executes.
pub struct Scheduler<'a> {
    core: &'a Mutex<KernelCore>,
    ready: &'a ReadyQueue,
}

impl<'a> Scheduler<'a> {
    pub fn new(core: &'a Mutex<KernelCore>, ready: &'a ReadyQueue) -> Self {
        Self { core, ready }
    }

    /// Consumes the ready queue under `policy`. Returns the aggregated
    /// interpreter status: the last nonzero per-line status, or 0.
    ///
    /// No-op when a process is already running on this thread (a scheduled
    /// instruction admitted new work and re-entered the scheduler).
    pub fn run(&self, policy: Policy, interp: &mut dyn Interpreter) -> SchedResult<i32> {
        if CURRENT_PID.with(|current| current.get()).is_some() {
            return Ok(0);
        }

        let result = self.dispatch(policy, interp);
        CURRENT_PID.with(|current| current.set(None));
        result
    }

    fn dispatch(&self, policy: Policy, interp: &mut dyn Interpreter) -> SchedResult<i32> {
        match policy {
            Policy::Fcfs => self.sequential(interp),
            Policy::Sjf => {
                self.reorder_sjf()?;
                self.sequential(interp)
            }
            Policy::Rr | Policy::Rr30 => {
                let quantum = policy.quantum().unwrap_or(2);
                self.round_robin(quantum, interp)
            }
            Policy::Aging => self.aging(interp),
        }
    }

    /// Runs each popped process to completion in queue order.
    fn sequential(&self, interp: &mut dyn Interpreter) -> SchedResult<i32> {
        let mut run_status = 0;

        while let Some(pid) = self.ready.pop() {
            CURRENT_PID.with(|current| current.set(Some(pid)));

            while let Some(status) = self.step(pid, interp)? {
                if status != 0 {
                    run_status = status;
                }
            }

            self.release(pid);
        }

        Ok(run_status)
    }

    /// Runs each popped process for up to `quantum` instructions, re-pushing
    /// it at the tail when instructions remain.
    fn round_robin(&self, quantum: usize, interp: &mut dyn Interpreter) -> SchedResult<i32> {
        let mut run_status = 0;

        while let Some(pid) = self.ready.pop() {
            CURRENT_PID.with(|current| current.set(Some(pid)));
            let mut timer = quantum;
            let mut exhausted = false;

            while timer > 0 {
                match self.step(pid, interp)? {
                    Some(status) => {
                        if status != 0 {
                            run_status = status;
                        }
                        timer -= 1;
                        thread::sleep(RR_INSTRUCTION_DELAY);
                    }
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }

            if exhausted || self.finished(pid)? {
                self.release(pid);
            } else {
                self.ready.push(pid);
            }
        }

        Ok(run_status)
    }

    /// One instruction per iteration for the head process, aging everyone
    /// else after each instruction. The head is peeked, not popped, so it
    /// stays visible in the queue while it runs; it is popped only once its
    /// stream is exhausted.
    fn aging(&self, interp: &mut dyn Interpreter) -> SchedResult<i32> {
        let mut run_status = 0;

        self.reorder_sjf()?;

        while let Some(pid) = self.ready.peek() {
            CURRENT_PID.with(|current| current.set(Some(pid)));

            if let Some(status) = self.step(pid, interp)? {
                if status != 0 {
                    run_status = status;
                }
            }

            if self.finished(pid)? {
                self.ready.pop();
                self.release(pid);
            }

            self.reorder_aging(pid)?;
        }

        Ok(run_status)
    }

    /// Resolves and executes the next instruction of `pid`. `None` when the
    /// stream is already exhausted. Faults are handled synchronously before
    /// the line is read.
    fn step(&self, pid: Pid, interp: &mut dyn Interpreter) -> SchedResult<Option<i32>> {
        let line = {
            let mut core = self.core.lock().unwrap();

            let (cursor, line_count) = {
                let pcb = core.pcbs.get(pid)?;
                (pcb.cursor, pcb.line_count)
            };
            if cursor >= line_count {
                None
            } else {
                core.mem.ensure_page_loaded(pid, cursor)?;
                let line = core.mem.get_line(pid, cursor)?;
                core.pcbs.get_mut(pid)?.cursor += 1;
                Some(line)
            }
        };

        match line {
            Some(line) => Ok(Some(interp.execute_line(&line))),
            None => Ok(None),
        }
    }

    fn finished(&self, pid: Pid) -> SchedResult<bool> {
        let core = self.core.lock().unwrap();
        Ok(core.pcbs.get(pid)?.is_finished())
    }

    /// Frees a completed process: page table reference (and frames, when it
    /// was the last reference) plus the PCB.
    fn release(&self, pid: Pid) {
        let mut core = self.core.lock().unwrap();
        core.mem.destroy_page_table(pid);
        core.pcbs.free(pid);
    }

    /// One full-queue reorder, ascending by job length score. Stable, so
    /// equal scores keep their relative order.
    fn reorder_sjf(&self) -> SchedResult<()> {
        if self.ready.len() <= 1 {
            return Ok(());
        }

        let mut jobs: Vec<(Pid, usize)> = Vec::new();
        while let Some(pid) = self.ready.pop() {
            let score = self.core.lock().unwrap().pcbs.get(pid)?.job_length_score;
            jobs.push((pid, score));
        }

        jobs.sort_by_key(|&(_, score)| score);
        for (pid, _) in jobs {
            self.ready.push(pid);
        }
        Ok(())
    }

    /// Ages every queued process except the one that just ran (scores floor
    /// at 0), then reorders ascending by score.
    fn reorder_aging(&self, running: Pid) -> SchedResult<()> {
        if self.ready.len() <= 1 {
            return Ok(());
        }

        let mut jobs: Vec<(Pid, usize)> = Vec::new();
        while let Some(pid) = self.ready.pop() {
            let mut core = self.core.lock().unwrap();
            let pcb = core.pcbs.get_mut(pid)?;
            if pid != running && pcb.job_length_score > 0 {
                pcb.job_length_score -= 1;
            }
            jobs.push((pid, pcb.job_length_score));
        }

        jobs.sort_by_key(|&(_, score)| score);
        for (pid, _) in jobs {
            self.ready.push(pid);
        }
        Ok(())
    }
}
