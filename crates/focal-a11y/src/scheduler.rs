//! Deferred Work
//!
//! Virtual-clock scheduler standing in for `requestAnimationFrame` and
//! `setTimeout`. Tasks are plain values; whoever drains the scheduler runs
//! them. Nothing is ever cancelled: a task that outlived its purpose must
//! check for that itself when it runs.

use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Timer<T> {
    seq: u64,
    due_ms: u64,
    task: T,
}

/// Frame queue plus timer list on a manually advanced clock
#[derive(Debug)]
pub struct Scheduler<T> {
    frame: VecDeque<T>,
    timers: Vec<Timer<T>>,
    current_time: u64,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            frame: VecDeque::new(),
            timers: Vec::new(),
            current_time: 0,
            next_seq: 0,
        }
    }

    /// Queue a task for the next frame
    pub fn request_frame(&mut self, task: T) {
        self.frame.push_back(task);
    }

    /// Queue a task to run once `delay` has elapsed
    pub fn set_timeout(&mut self, delay: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            seq,
            due_ms: self.current_time + delay.as_millis() as u64,
            task,
        });
    }

    /// Drain tasks queued for the next frame
    ///
    /// Tasks queued while the returned batch runs belong to the frame
    /// after this one.
    pub fn next_frame(&mut self) -> Vec<T> {
        self.frame.drain(..).collect()
    }

    /// Advance the clock and return due timers, earliest first
    pub fn advance(&mut self, delta: Duration) -> Vec<T> {
        self.current_time += delta.as_millis() as u64;
        let now = self.current_time;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.due_ms <= now);
        self.timers = pending;

        due.sort_by_key(|t| (t.due_ms, t.seq));
        due.into_iter().map(|t| t.task).collect()
    }

    /// Milliseconds since the scheduler was created
    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Time until the earliest timer fires
    pub fn time_until_next(&self) -> Option<Duration> {
        self.timers
            .iter()
            .map(|t| Duration::from_millis(t.due_ms.saturating_sub(self.current_time)))
            .min()
    }

    pub fn pending_frame(&self) -> usize {
        self.frame.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Check if there's pending work
    pub fn has_pending_work(&self) -> bool {
        !self.frame.is_empty() || !self.timers.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
