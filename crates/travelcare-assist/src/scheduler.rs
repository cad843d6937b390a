//! Deferred job queue on a virtual clock.
//!
//! Jobs run in submission order. A job's due time is never earlier than the
//! one queued before it, so a short delay scheduled after a long one waits
//! for it. The clock only moves when the owner advances it, which keeps
//! simulated latency deterministic under test.

use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug)]
struct Scheduled<J> {
    due: Duration,
    job: J,
}

/// FIFO of deferred jobs keyed by virtual time since creation.
#[derive(Debug)]
pub struct Scheduler<J> {
    now: Duration,
    queue: VecDeque<Scheduled<J>>,
}

impl<J> Default for Scheduler<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J> Scheduler<J> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            queue: VecDeque::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queue `job` to run `delay` from now. Returns its due time.
    pub fn schedule(&mut self, delay: Duration, job: J) -> Duration {
        let requested = self.now + delay;
        let due = match self.queue.back() {
            Some(last) => requested.max(last.due),
            None => requested,
        };
        self.queue.push_back(Scheduled { due, job });
        due
    }

    /// Time until the next job is due, or `None` when idle.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.queue.front().map(|s| s.due.saturating_sub(self.now))
    }

    /// Pop the next job if it is due at or before `deadline`.
    ///
    /// The clock moves to the job's due time so that anything it schedules
    /// is measured from the moment it fired.
    pub fn next_ready(&mut self, deadline: Duration) -> Option<J> {
        let due = self.queue.front().map(|s| s.due)?;
        if due > deadline {
            return None;
        }
        let scheduled = self.queue.pop_front()?;
        self.now = self.now.max(scheduled.due);
        Some(scheduled.job)
    }

    /// Move the clock to `deadline` once every due job has been taken.
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Drop every pending job.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
