//! Focus Runtime
//!
//! Owns the scheduler, trap registry and announcer for one document and
//! runs deferred work against it.

use std::time::Duration;

use focal_dom::NodeId;

use crate::focus::restore_if_connected;
use crate::host::RegionHost;
use crate::live_region::{AnnouncerConfig, LiveAnnouncer};
use crate::scheduler::Scheduler;
use crate::trap::TrapRegistry;

/// Work queued for a later frame or timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Focus `target` if it is still attached
    RestoreFocus { target: NodeId },
    /// Blank the live region unless a newer announcement replaced this one
    ClearAnnouncement { region: NodeId, generation: u64 },
}

/// Per-document focus services
///
/// Fields are public so callers can lend out disjoint parts at once, e.g.
/// `&mut runtime.scheduler` to a modal while `runtime.traps` is borrowed.
#[derive(Debug)]
pub struct FocusRuntime {
    pub scheduler: Scheduler<Deferred>,
    pub traps: TrapRegistry,
    pub announcer: LiveAnnouncer,
}

impl Default for FocusRuntime {
    fn default() -> Self {
        Self::new(AnnouncerConfig::default())
    }
}

impl FocusRuntime {
    pub fn new(config: AnnouncerConfig) -> Self {
        Self {
            scheduler: Scheduler::new(),
            traps: TrapRegistry::new(),
            announcer: LiveAnnouncer::new(config),
        }
    }

    /// Announce with the configured politeness
    pub fn announce<H: RegionHost>(&mut self, host: &mut H, message: &str) -> bool {
        self.announcer.announce_polite(host, &mut self.scheduler, message)
    }

    /// Run everything queued for the next frame; returns the task count
    pub fn run_frame<H: RegionHost>(&mut self, host: &mut H) -> usize {
        let tasks = self.scheduler.next_frame();
        let count = tasks.len();
        for task in tasks {
            self.run(host, task);
        }
        count
    }

    /// Move the clock forward and run the timers that came due
    pub fn advance<H: RegionHost>(&mut self, host: &mut H, delta: Duration) -> usize {
        let tasks = self.scheduler.advance(delta);
        let count = tasks.len();
        for task in tasks {
            self.run(host, task);
        }
        count
    }

    /// Run frames and timers until nothing is pending
    pub fn settle<H: RegionHost>(&mut self, host: &mut H) -> usize {
        let mut count = self.run_frame(host);
        while let Some(wait) = self.scheduler.time_until_next() {
            count += self.advance(host, wait);
            count += self.run_frame(host);
        }
        count
    }

    fn run<H: RegionHost>(&mut self, host: &mut H, task: Deferred) {
        tracing::trace!("running {:?}", task);
        match task {
            Deferred::RestoreFocus { target } => {
                restore_if_connected(host, target);
            }
            Deferred::ClearAnnouncement { region, generation } => {
                self.announcer.clear_if_current(host, region, generation);
            }
        }
    }
}
