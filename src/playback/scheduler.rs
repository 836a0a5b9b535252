//! Virtual-clock timer scheduler
//!
//! All sequencer progress is timer-driven, and every timer lives here:
//! one scheduling point, one cancellation point. The clock only moves
//! when [`Scheduler::advance`] is called, which keeps playback fully
//! deterministic under test. A cancelled handle never fires.

use std::time::Duration;

/// Opaque id of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Pending {
    handle: TimerHandle,
    deadline: Duration,
}

/// Cancellable one-shot timers over a virtual clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot timer `delay` from the current virtual time
    pub fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            deadline: self.now + delay,
        });
        handle
    }

    /// Remove a pending timer; returns whether it was still pending
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Advance the clock and collect fired timers in deadline order
    pub fn advance(&mut self, delta: Duration) -> Vec<TimerHandle> {
        self.now += delta;
        let now = self.now;
        let (mut fired, keep): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.deadline <= now);
        self.pending = keep;
        fired.sort_by_key(|p| (p.deadline, p.handle.0));
        fired.into_iter().map(|p| p.handle).collect()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
