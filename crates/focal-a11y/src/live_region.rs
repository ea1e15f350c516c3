//! Live Region Announcements
//!
//! Writes short messages into a visually hidden `role=status` node and
//! clears them again after a delay, so assistive technology re-announces a
//! message even when it repeats. A newer message overwrites an older one;
//! there is no queue.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Deserialize;

use focal_dom::NodeId;

use crate::A11yError;
use crate::aria::{AriaRole, LiveRegionMode};
use crate::host::RegionHost;
use crate::runtime::Deferred;
use crate::scheduler::Scheduler;

/// Inline style that keeps the region out of the visual layout
pub const SR_ONLY_STYLE: &str = "position: absolute; width: 1px; height: 1px; padding: 0; \
    margin: -1px; overflow: hidden; clip: rect(0, 0, 0, 0); white-space: nowrap; border: 0;";

/// Announcer configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    /// Delay before the region text is cleared
    pub clear_delay_ms: u64,
    /// Default politeness for `announce_polite`-style calls
    pub politeness: LiveRegionMode,
    pub atomic: bool,
    /// Announcements kept for inspection
    pub history_limit: usize,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            clear_delay_ms: 1000,
            politeness: LiveRegionMode::Polite,
            atomic: true,
            history_limit: 50,
        }
    }
}

impl AnnouncerConfig {
    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }
}

/// A message that was written to the region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub politeness: LiveRegionMode,
    pub atomic: bool,
    /// Scheduler time when it was written
    pub at_ms: u64,
}

/// Live region writer
#[derive(Debug, Default)]
pub struct LiveAnnouncer {
    config: AnnouncerConfig,
    region: Option<NodeId>,
    generation: u64,
    history: VecDeque<Announcement>,
}

impl LiveAnnouncer {
    pub fn new(config: AnnouncerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AnnouncerConfig {
        &self.config
    }

    /// Region node, once created or attached
    pub fn region(&self) -> Option<NodeId> {
        self.region
    }

    /// Use an element the page already renders as the region
    pub fn attach(&mut self, region: NodeId) {
        self.region = Some(region);
    }

    /// Return the region, creating it under `<body>` if missing or detached
    pub fn ensure_region<H: RegionHost>(&mut self, host: &mut H) -> Result<NodeId, A11yError> {
        if let Some(region) = self.region.filter(|&r| host.is_connected(r)) {
            return Ok(region);
        }

        let body = host.body();
        let region = host.append_element(body, "div", &[
            ("role", AriaRole::Status.as_str()),
            ("aria-live", self.config.politeness.as_str()),
            ("aria-atomic", if self.config.atomic { "true" } else { "false" }),
            ("class", "sr-only"),
            ("style", SR_ONLY_STYLE),
        ])?;
        tracing::debug!("live region created: {:?}", region);
        self.region = Some(region);
        Ok(region)
    }

    /// Announce `message` with the configured politeness
    pub fn announce_polite<H: RegionHost>(
        &mut self,
        host: &mut H,
        scheduler: &mut Scheduler<Deferred>,
        message: &str,
    ) -> bool {
        let (politeness, atomic) = (self.config.politeness, self.config.atomic);
        self.announce(host, scheduler, message, politeness, atomic)
    }

    /// Write `message` to the region and schedule it to be cleared
    ///
    /// Empty messages are ignored. Returns whether the message was written.
    pub fn announce<H: RegionHost>(
        &mut self,
        host: &mut H,
        scheduler: &mut Scheduler<Deferred>,
        message: &str,
        politeness: LiveRegionMode,
        atomic: bool,
    ) -> bool {
        if message.is_empty() {
            return false;
        }

        let region = match self.write(host, message, politeness, atomic) {
            Ok(region) => region,
            Err(e) => {
                tracing::warn!("announcement dropped: {}", e);
                return false;
            }
        };

        self.generation += 1;
        scheduler.set_timeout(
            self.config.clear_delay(),
            Deferred::ClearAnnouncement { region, generation: self.generation },
        );

        self.history.push_back(Announcement {
            message: message.to_string(),
            politeness,
            atomic,
            at_ms: scheduler.current_time(),
        });
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
        tracing::info!("announced ({}): {}", politeness.as_str(), message);
        true
    }

    fn write<H: RegionHost>(
        &mut self,
        host: &mut H,
        message: &str,
        politeness: LiveRegionMode,
        atomic: bool,
    ) -> Result<NodeId, A11yError> {
        let region = self.ensure_region(host)?;
        host.set_attribute(region, "aria-live", politeness.as_str())?;
        host.set_attribute(region, "aria-atomic", if atomic { "true" } else { "false" })?;

        // Unchanged text is not re-read; blank it first
        if !host.text_content(region).is_empty() {
            host.set_text_content(region, "")?;
        }
        host.set_text_content(region, message)?;
        Ok(region)
    }

    /// Clear the region if `generation` is still the latest announcement
    pub fn clear_if_current<H: RegionHost>(
        &mut self,
        host: &mut H,
        region: NodeId,
        generation: u64,
    ) -> bool {
        if generation != self.generation || self.region != Some(region) {
            tracing::trace!("stale clear for generation {} skipped", generation);
            return false;
        }
        if !host.is_connected(region) {
            return false;
        }
        match host.set_text_content(region, "") {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to clear live region: {}", e);
                false
            }
        }
    }

    /// Remove a region this announcer created or was given
    pub fn teardown<H: RegionHost>(&mut self, host: &mut H) {
        if let Some(region) = self.region.take() {
            if let Err(e) = host.remove(region) {
                tracing::warn!("failed to remove live region: {}", e);
            }
        }
    }

    /// Recent announcements, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Announcement> {
        self.history.iter()
    }

    pub fn last_announcement(&self) -> Option<&Announcement> {
        self.history.back()
    }
}
