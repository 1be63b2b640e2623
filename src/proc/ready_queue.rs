use std::collections::VecDeque;
use std::sync::Mutex;

use crate::common::types::Pid;

/// FIFO of pending pids with priority-prepend.
///
/// One lock covers every operation, size queries included. Callers get no
/// atomicity across calls: peek-then-pop is not an atomic pair. A pid
/// appears at most once at any time.
pub struct ReadyQueue {
    inner: Mutex<VecDeque<Pid>>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Appends at the tail.
    pub fn push(&self, pid: Pid) {
        let mut queue = self.inner.lock().unwrap();
        debug_assert!(!queue.contains(&pid), "pid {} already queued", pid);
        queue.push_back(pid);
    }

    /// Inserts at the head, ahead of everything already queued.
    pub fn prepend(&self, pid: Pid) {
        let mut queue = self.inner.lock().unwrap();
        debug_assert!(!queue.contains(&pid), "pid {} already queued", pid);
        queue.push_front(pid);
    }

    pub fn pop(&self) -> Option<Pid> {
        self.inner.lock().unwrap().pop_front()
    }

    /// Head pid without removing it. The aging policy relies on this to
    /// keep the running process visible in the queue while it executes.
    pub fn peek(&self) -> Option<Pid> {
        self.inner.lock().unwrap().front().copied()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new()
    }
}
